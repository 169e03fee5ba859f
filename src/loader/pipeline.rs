//! The loader worker's per-job pipeline: consume `loading_requested`,
//! dedup against the database, bulk-commit, and report banded progress.

use super::db;
use super::models::ScrapedListing;
use super::parsing::{idempotency_key, prepare_listing};
use crate::broker::{EventConsumer, EventProducer, EventType, JobEvent, JobEventBuilder, Source, connect_with_retry, topics};
use crate::config::Config;
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

const INITIAL_FAILURE_PCT: f64 = 90.0;
const PREPARING_PCT: f64 = 91.0;
const PRE_COMMIT_PCT: f64 = 98.0;
const SUCCESS_PCT: f64 = 100.0;

#[derive(Debug, Error)]
enum LoaderError {
    #[error("IOError - {0}")]
    Io(String),

    #[error("DatabaseError - {0}")]
    Database(String),
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let broker_url = config.broker.kafka_broker_url.clone();

    let producer = connect_with_retry("loader-producer", || {
        let broker_url = broker_url.clone();
        async move { crate::broker::kafka::KafkaEventProducer::connect(&broker_url) }
    })
    .await?;
    let producer: Arc<dyn EventProducer> = Arc::new(producer);

    let mut consumer = connect_with_retry("loader-consumer", || {
        let broker_url = broker_url.clone();
        async move {
            crate::broker::kafka::KafkaEventConsumer::connect(
                &broker_url,
                topics::LOADER_GROUP,
                &[topics::DATA_PROCESSING],
            )
        }
    })
    .await?;

    loop {
        let message = match consumer.recv().await {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(%err, "loader consume failed, continuing");
                continue;
            }
        };

        let event: JobEvent = match message.decode() {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%err, "failed to decode loading_requested message, skipping");
                continue;
            }
        };

        if !is_valid_loading_request(&event) {
            tracing::debug!(job_id = %event.job_id, "ignoring message that isn't a valid loading_requested event");
            continue;
        }

        process_job(producer.clone(), &config, event).await;
    }
}

fn is_valid_loading_request(event: &JobEvent) -> bool {
    event.event_type == EventType::LoadingRequested
        && event.source == Source::Scraper
        && !event.job_id.is_empty()
}

async fn process_job(producer: Arc<dyn EventProducer>, config: &Config, event: JobEvent) {
    let job_id = event.job_id.clone();
    let default_path = config.scraper.data_dir.join(format!("{job_id}_jobs.json"));
    let data_path = event
        .data_path
        .map(std::path::PathBuf::from)
        .unwrap_or(default_path);

    if let Err(err) = run_job(&producer, &config.database.database_url, &job_id, &data_path).await {
        tracing::error!(job_id, %err, "loader job failed");
        publish(&producer, topics::SYSTEM_NOTIFICATIONS, JobEventBuilder::new(&job_id, EventType::JobFailed, Source::Loader).error_details(err.to_string()).build()).await;
        publish(
            &producer,
            topics::JOB_STATUS_UPDATES,
            JobEventBuilder::new(&job_id, EventType::LoadingProgress, Source::Loader)
                .percentage(INITIAL_FAILURE_PCT)
                .description(format!("Failed: {err}"))
                .build(),
        )
        .await;
    }
}

async fn run_job(
    producer: &Arc<dyn EventProducer>,
    database_url: &str,
    job_id: &str,
    data_path: &Path,
) -> Result<(), LoaderError> {
    let contents = std::fs::read_to_string(data_path).map_err(|e| LoaderError::Io(e.to_string()))?;
    let listings: Vec<ScrapedListing> =
        serde_json::from_str(&contents).map_err(|e| LoaderError::Io(format!("not a JSON array: {e}")))?;

    if listings.is_empty() {
        publish(
            producer,
            topics::JOB_STATUS_UPDATES,
            JobEventBuilder::new(job_id, EventType::LoadingComplete, Source::Loader)
                .percentage(SUCCESS_PCT)
                .description("Successfully loaded 0 new jobs (empty file)")
                .build(),
        )
        .await;
        delete_file(producer, job_id, data_path).await;
        return Ok(());
    }

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| LoaderError::Database(e.to_string()))?;

    let mut existing = db::fetch_existing_keys(&pool)
        .await
        .map_err(|e| LoaderError::Database(e.to_string()))?;

    publish(
        producer,
        topics::JOB_STATUS_UPDATES,
        JobEventBuilder::new(job_id, EventType::LoadingProgress, Source::Loader)
            .percentage(PREPARING_PCT)
            .description(format!("Preparing to load {} potential jobs...", listings.len()))
            .build(),
    )
    .await;

    let mut new_jobs = Vec::new();
    let mut duplicates = 0usize;

    for listing in &listings {
        let Some(new_job) = prepare_listing(listing) else {
            continue;
        };
        let key = idempotency_key(&new_job.title, &new_job.company_name);
        if existing.contains(&key) {
            duplicates += 1;
            continue;
        }
        existing.insert(key);
        new_jobs.push(new_job);
    }

    let description = if duplicates > 0 {
        format!(
            "Identified {duplicates} duplicates. Preparing to commit {} new jobs...",
            new_jobs.len()
        )
    } else {
        format!("Preparing to commit {} new jobs...", new_jobs.len())
    };
    publish(
        producer,
        topics::JOB_STATUS_UPDATES,
        JobEventBuilder::new(job_id, EventType::LoadingProgress, Source::Loader)
            .percentage(PRE_COMMIT_PCT)
            .description(description)
            .build(),
    )
    .await;

    let committed = db::bulk_insert(&pool, &new_jobs)
        .await
        .map_err(|e| LoaderError::Database(e.to_string()))?;

    publish(
        producer,
        topics::JOB_STATUS_UPDATES,
        JobEventBuilder::new(job_id, EventType::LoadingComplete, Source::Loader)
            .percentage(SUCCESS_PCT)
            .description(format!("Successfully loaded {committed} new jobs into the database."))
            .build(),
    )
    .await;

    delete_file(producer, job_id, data_path).await;
    Ok(())
}

async fn delete_file(producer: &Arc<dyn EventProducer>, job_id: &str, data_path: &Path) {
    if let Err(err) = std::fs::remove_file(data_path) {
        tracing::warn!(job_id, path = %data_path.display(), %err, "failed to delete job data file");
        publish(
            producer,
            topics::SYSTEM_NOTIFICATIONS,
            JobEventBuilder::new(job_id, EventType::SystemWarning, Source::Loader)
                .description(format!("Failed to delete data file: {err}"))
                .build(),
        )
        .await;
    }
}

async fn publish(producer: &Arc<dyn EventProducer>, topic: &str, event: JobEvent) {
    if let Err(err) = producer.publish(topic, &event).await {
        tracing::error!(topic, job_id = %event.job_id, %err, "failed to publish event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loading_requested(job_id: &str, source: Source) -> JobEvent {
        JobEventBuilder::new(job_id, EventType::LoadingRequested, source).build()
    }

    #[test]
    fn valid_loading_request_from_scraper_is_accepted() {
        assert!(is_valid_loading_request(&loading_requested("job-1", Source::Scraper)));
    }

    #[test]
    fn loading_request_from_non_scraper_source_is_rejected() {
        assert!(!is_valid_loading_request(&loading_requested("job-1", Source::Loader)));
    }

    #[test]
    fn loading_request_with_empty_job_id_is_rejected() {
        assert!(!is_valid_loading_request(&loading_requested("", Source::Scraper)));
    }

    #[test]
    fn non_loading_requested_event_type_is_rejected() {
        let event = JobEventBuilder::new("job-1", EventType::JobStarted, Source::Scraper).build();
        assert!(!is_valid_loading_request(&event));
    }
}
