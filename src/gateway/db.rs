//! Read/write access to the persisted `core.jobs` / `core.job_skills`
//! tables backing `GET /data`, `PATCH /jobs/{id}/progress`, and
//! `DELETE /jobs/{id}`. The loader is the only writer of new job rows;
//! the gateway only ever reads, patches `progress`, or deletes.

use super::models::JobItem;
use sqlx::PgPool;

pub async fn list_jobs(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<JobItem>, sqlx::Error> {
    let mut jobs: Vec<JobItem> = sqlx::query_as(
        r#"
        SELECT job_id, title, company_name, location, job_url, date_posted, date_scraped, progress
        FROM core.jobs
        ORDER BY job_id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    for job in &mut jobs {
        let skills: Vec<(String,)> = sqlx::query_as(
            "SELECT skill FROM core.job_skills WHERE job_id = $1 ORDER BY job_skill_id",
        )
        .bind(job.job_id)
        .fetch_all(pool)
        .await?;
        job.skills = skills.into_iter().map(|(skill,)| skill).collect();
    }

    Ok(jobs)
}

pub async fn job_exists(pool: &PgPool, job_id: i64) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT job_id FROM core.jobs WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn update_progress(pool: &PgPool, job_id: i64, progress: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE core.jobs SET progress = $1 WHERE job_id = $2")
        .bind(progress)
        .bind(job_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_job(pool: &PgPool, job_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM core.job_skills WHERE job_id = $1")
        .bind(job_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM core.jobs WHERE job_id = $1")
        .bind(job_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
