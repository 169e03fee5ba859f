//! Loader-side persistence: idempotency-key prefetch and bulk commit,
//! both against `core.jobs` / `core.job_skills`.

use super::models::NewJob;
use sqlx::PgPool;
use std::collections::HashSet;

/// Loads the set of `(lower(title), lower(company_name))` pairs already
/// present, so the pipeline can skip duplicates without a query per row.
pub async fn fetch_existing_keys(pool: &PgPool) -> Result<HashSet<(String, String)>, sqlx::Error> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT lower(title), lower(company_name) FROM core.jobs",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

/// Inserts every new job and its skills in one transaction, rolling
/// back entirely on any error.
pub async fn bulk_insert(pool: &PgPool, jobs: &[NewJob]) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;

    for job in jobs {
        let job_id: i64 = sqlx::query_scalar(
            "INSERT INTO core.jobs (title, company_name, location, job_url, date_posted, date_scraped, progress)
             VALUES ($1, $2, $3, $4, $5, now(), 'Haven''t Applied')
             RETURNING job_id",
        )
        .bind(&job.title)
        .bind(&job.company_name)
        .bind(&job.location)
        .bind(&job.job_url)
        .bind(job.date_posted)
        .fetch_one(&mut *tx)
        .await?;

        for skill in &job.skills {
            sqlx::query("INSERT INTO core.job_skills (job_id, skill) VALUES ($1, $2)")
                .bind(job_id)
                .bind(skill)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(jobs.len())
}
