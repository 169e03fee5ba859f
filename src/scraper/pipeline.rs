//! The scraper worker's per-job pipeline: consume `job_requested`,
//! scrape, optionally extract skills, write the per-job data file, and
//! hand off to the loader.

use super::http::{HttpClient, HttpConfig};
use super::models::JobListing;
use super::site;
use super::skills::{self, SkillExtractor};
use super::validation::{self, ScraperError};
use crate::broker::{EventConsumer, EventProducer, EventType, JobEvent, JobEventBuilder, ScrapeParameters, Source, connect_with_retry, topics};
use crate::config::Config;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const MIN_PERCENTAGE: f64 = 5.0;
const MAX_PERCENTAGE: f64 = 90.0;

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let broker_url = config.broker.kafka_broker_url.clone();

    let producer = connect_with_retry("scraper-producer", || {
        let broker_url = broker_url.clone();
        async move { crate::broker::kafka::KafkaEventProducer::connect(&broker_url) }
    })
    .await?;
    let producer: Arc<dyn EventProducer> = Arc::new(producer);

    let mut consumer = connect_with_retry("scraper-consumer", || {
        let broker_url = broker_url.clone();
        async move {
            crate::broker::kafka::KafkaEventConsumer::connect(
                &broker_url,
                topics::SCRAPER_GROUP,
                &[topics::SCRAPING_JOBS],
            )
        }
    })
    .await?;

    let data_dir = config.scraper.data_dir.clone();

    loop {
        let message = match consumer.recv().await {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(%err, "scraper consume failed, continuing");
                continue;
            }
        };

        let event: JobEvent = match message.decode() {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%err, "failed to decode job_requested message, skipping");
                continue;
            }
        };

        if event.event_type != EventType::JobRequested {
            tracing::debug!(event_type = event.event_type.as_str(), "ignoring non job_requested event");
            continue;
        }

        process_job(producer.clone(), &data_dir, event).await;
    }
}

async fn process_job(producer: Arc<dyn EventProducer>, data_dir: &std::path::Path, event: JobEvent) {
    let job_id = event.job_id.clone();

    let Some(parameters) = event.parameters else {
        tracing::warn!(job_id, "job_requested event missing parameters, skipping");
        return;
    };

    if let Err(err) = run_job(&producer, data_dir, &job_id, &parameters).await {
        tracing::error!(job_id, %err, "scraper job failed");
        publish(&producer, topics::SYSTEM_NOTIFICATIONS, JobEventBuilder::new(&job_id, EventType::JobFailed, Source::Scraper).error_details(err.to_string()).build()).await;
        publish(
            &producer,
            topics::JOB_STATUS_UPDATES,
            JobEventBuilder::new(&job_id, EventType::JobProgress, Source::Scraper)
                .percentage(0.0)
                .description(format!("Failed: {err}"))
                .build(),
        )
        .await;
    }
}

async fn run_job(
    producer: &Arc<dyn EventProducer>,
    data_dir: &std::path::Path,
    job_id: &str,
    parameters: &ScrapeParameters,
) -> Result<(), ScraperError> {
    validation::validate_parameters(parameters)?;

    let extractor = SkillExtractor::new(&parameters.google_api_key);
    if extractor.is_none() && !parameters.google_api_key.is_empty() {
        tracing::warn!(job_id, "skill extraction disabled: extractor init failed");
    }

    publish(
        producer,
        topics::JOB_STATUS_UPDATES,
        JobEventBuilder::new(job_id, EventType::JobStarted, Source::Scraper)
            .description("Initializing")
            .build(),
    )
    .await;

    let http = HttpClient::new(HttpConfig::default()).map_err(|e| ScraperError::Runtime(e.to_string()))?;
    let titles = validation::split_job_titles(&parameters.job_titles);

    let mut listings: Vec<JobListing> = Vec::new();
    let mut jobs_scraped: u32 = 0;

    'titles: for title in &titles {
        let mut page = 0usize;
        loop {
            let url = site::search_url(title, &parameters.location, parameters.time_filter.as_deref(), page);
            let body = match http.get_text(&url).await {
                Ok(body) => body,
                Err(err) => {
                    tracing::warn!(job_id, title, page, %err, "page fetch failed, moving to next title");
                    break;
                }
            };

            let cards = site::parse_search_results(&body);
            if cards.is_empty() {
                break;
            }

            for card in cards {
                sleep_random(1.5, 5.0).await;

                let description = match http.get_text(&card.url).await {
                    Ok(detail_html) => site::parse_detail_description(&detail_html),
                    Err(err) => {
                        tracing::warn!(job_id, url = card.url, %err, "detail fetch failed, skipping listing");
                        None
                    }
                };

                let extracted_skills = match &description {
                    Some(text) => skills::extract_or_degrade(extractor.as_ref(), text).await,
                    None => Vec::new(),
                };

                listings.push(JobListing {
                    search_query: title.clone(),
                    title: card.title,
                    company: card.company,
                    location: card.location,
                    date_posted: card.date_posted,
                    url: card.url,
                    description,
                    extracted_skills,
                });

                jobs_scraped += 1;
                let percentage = scaled_percentage(jobs_scraped, parameters.max_jobs);
                publish(
                    producer,
                    topics::JOB_STATUS_UPDATES,
                    JobEventBuilder::new(job_id, EventType::JobProgress, Source::Scraper)
                        .percentage(percentage)
                        .description(format!(
                            "Processing job {}/{}: {}",
                            jobs_scraped, parameters.max_jobs, listings.last().unwrap().title
                        ))
                        .build(),
                )
                .await;

                if jobs_scraped >= parameters.max_jobs {
                    break 'titles;
                }
            }

            page += 1;
            sleep_random(3.0, 7.0).await;
        }
    }

    let data_path = write_result_file(data_dir, job_id, &listings)
        .map_err(|e| ScraperError::Io(e.to_string()))?;

    publish(
        producer,
        topics::DATA_PROCESSING,
        JobEventBuilder::new(job_id, EventType::LoadingRequested, Source::Scraper)
            .data_path(data_path)
            .build(),
    )
    .await;

    Ok(())
}

fn write_result_file(data_dir: &std::path::Path, job_id: &str, listings: &[JobListing]) -> std::io::Result<String> {
    std::fs::create_dir_all(data_dir)?;
    let path: PathBuf = data_dir.join(format!("{job_id}_jobs.json"));
    let json = serde_json::to_string_pretty(listings)?;
    std::fs::write(&path, json)?;
    Ok(path.to_string_lossy().into_owned())
}

async fn sleep_random(min_secs: f64, max_secs: f64) {
    let secs = rand::thread_rng().gen_range(min_secs..max_secs);
    tokio::time::sleep(Duration::from_secs_f64(secs)).await;
}

async fn publish(producer: &Arc<dyn EventProducer>, topic: &str, event: JobEvent) {
    if let Err(err) = producer.publish(topic, &event).await {
        tracing::error!(topic, job_id = %event.job_id, %err, "failed to publish event");
    }
}

/// Linearly scales `jobs_scraped / max_jobs` into `[5, 90]`, the band the
/// scraper alone owns; it never emits 100.
fn scaled_percentage(jobs_scraped: u32, max_jobs: u32) -> f64 {
    let fraction = jobs_scraped as f64 / max_jobs as f64;
    (MIN_PERCENTAGE + fraction * (MAX_PERCENTAGE - MIN_PERCENTAGE)).min(MAX_PERCENTAGE)
}
