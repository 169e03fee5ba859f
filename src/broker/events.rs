//! Wire format for the broker-topic protocol.
//!
//! Every event on every topic is one flat JSON object sharing this shape;
//! which fields are populated depends on `event_type`.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    JobRequested,
    JobStarted,
    JobProgress,
    LoadingRequested,
    LoadingProgress,
    LoadingComplete,
    JobFailed,
    SystemWarning,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::JobRequested => "job_requested",
            EventType::JobStarted => "job_started",
            EventType::JobProgress => "job_progress",
            EventType::LoadingRequested => "loading_requested",
            EventType::LoadingProgress => "loading_progress",
            EventType::LoadingComplete => "loading_complete",
            EventType::JobFailed => "job_failed",
            EventType::SystemWarning => "system_warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Gateway,
    Scraper,
    Loader,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Gateway => "gateway",
            Source::Scraper => "scraper",
            Source::Loader => "loader",
        }
    }

    pub fn upper(&self) -> &'static str {
        match self {
            Source::Gateway => "GATEWAY",
            Source::Scraper => "SCRAPER",
            Source::Loader => "LOADER",
        }
    }
}

/// Scraping parameters carried on the initial `job_requested` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeParameters {
    #[serde(rename = "GOOGLE_API_KEY", default, skip_serializing_if = "String::is_empty")]
    pub google_api_key: String,
    pub job_titles: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_filter: Option<String>,
    pub max_jobs: u32,
}

/// A single event on the broker, matching the wire contract exactly:
/// mandatory `job_id`/`event_type`/`source`/`timestamp`, optional everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub job_id: String,
    pub event_type: EventType,
    pub source: Source,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ScrapeParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,
}

/// Seconds since epoch as a float, matching the original wire format.
pub fn now_ts() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

pub struct JobEventBuilder {
    job_id: String,
    event_type: EventType,
    source: Source,
    parameters: Option<ScrapeParameters>,
    percentage: Option<f64>,
    description: Option<String>,
    error_details: Option<String>,
    data_path: Option<String>,
}

impl JobEventBuilder {
    pub fn new(job_id: impl Into<String>, event_type: EventType, source: Source) -> Self {
        Self {
            job_id: job_id.into(),
            event_type,
            source,
            parameters: None,
            percentage: None,
            description: None,
            error_details: None,
            data_path: None,
        }
    }

    pub fn parameters(mut self, parameters: ScrapeParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some((percentage * 100.0).round() / 100.0);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn error_details(mut self, error_details: impl Into<String>) -> Self {
        self.error_details = Some(error_details.into());
        self
    }

    pub fn data_path(mut self, data_path: impl Into<String>) -> Self {
        self.data_path = Some(data_path.into());
        self
    }

    pub fn build(self) -> JobEvent {
        JobEvent {
            job_id: self.job_id,
            event_type: self.event_type,
            source: self.source,
            timestamp: now_ts(),
            parameters: self.parameters,
            percentage: self.percentage,
            description: self.description,
            error_details: self.error_details,
            data_path: self.data_path,
        }
    }
}
