//! The gateway's in-memory job-status map and its update algorithm.
//!
//! This is the core state machine described in §4.1: every event the
//! background broker consumer receives is folded into the map entry for
//! its `job_id` under a single lock, producing a snapshot that is then
//! broadcast to push-channel clients.

use super::models::{JobStatusEntry, JobStatusKind, StatusSnapshot};
use crate::broker::{EventType, JobEvent};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct StatusMap {
    inner: Mutex<HashMap<String, JobStatusEntry>>,
}

impl Default for StatusMap {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusMap {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Records the initial `requested` entry created by `POST
    /// /trigger-job-pipeline`.
    pub fn record_requested(&self, job_id: &str, now: f64) {
        let mut map = self.inner.lock().expect("status map lock poisoned");
        map.insert(job_id.to_string(), JobStatusEntry::new_requested(now));
    }

    pub fn get(&self, job_id: &str) -> Option<JobStatusEntry> {
        let map = self.inner.lock().expect("status map lock poisoned");
        map.get(job_id).cloned()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let map = self.inner.lock().expect("status map lock poisoned");
        map.clone()
    }

    /// Applies one broker event to the map per the per-topic update table
    /// in §4.1, returning the post-update entry if the map actually
    /// changed (callers broadcast only on `Some`).
    pub fn apply_event(&self, topic: &str, event: &JobEvent) -> Option<JobStatusEntry> {
        let mut map = self.inner.lock().expect("status map lock poisoned");

        let known_on_topic = matches!(
            (topic, event.event_type),
            (
                crate::broker::topics::JOB_STATUS_UPDATES,
                EventType::JobStarted | EventType::JobProgress | EventType::LoadingProgress | EventType::LoadingComplete
            ) | (crate::broker::topics::SYSTEM_NOTIFICATIONS, EventType::JobFailed)
        );
        if !known_on_topic {
            tracing::warn!(
                topic,
                event_type = event.event_type.as_str(),
                job_id = %event.job_id,
                "unknown event type on topic, leaving status map unchanged"
            );
            return None;
        }

        let entry = map
            .entry(event.job_id.clone())
            .or_insert_with(|| JobStatusEntry::new_requested(event.timestamp));

        match event.event_type {
            EventType::JobStarted => {
                entry.status = JobStatusKind::Running;
                entry.stage = event.source.upper().to_string();
                entry.percentage = 0.0;
            }
            EventType::JobProgress => {
                entry.status = JobStatusKind::Running;
                entry.stage = event.source.upper().to_string();
                // On a missing percentage, keep the prior value read inside
                // this same lock (§9 resolution), rather than defaulting to 0.
                entry.percentage = event.percentage.unwrap_or(entry.percentage);
            }
            EventType::LoadingProgress => {
                entry.status = JobStatusKind::LoadingData;
                entry.stage = "LOADING DATA".to_string();
                entry.percentage = event.percentage.unwrap_or(entry.percentage);
            }
            EventType::LoadingComplete => {
                entry.status = JobStatusKind::Complete;
                entry.stage = "LOADING DATA".to_string();
                entry.percentage = 100.0;
            }
            EventType::JobFailed => {
                entry.status = JobStatusKind::Failed;
                entry.stage = event.source.upper().to_string();
                entry.error_details = event.error_details.clone();
            }
            _ => unreachable!("filtered by known_on_topic above"),
        }

        entry.last_event_type = Some(event.event_type.as_str().to_string());
        entry.source = Some(event.source.as_str().to_string());
        entry.last_update = event.timestamp;
        if let Some(description) = &event.description {
            entry.details = Some(description.clone());
        }

        Some(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{JobEventBuilder, Source, topics};

    fn progress_event(job_id: &str, pct: Option<f64>) -> JobEvent {
        let mut builder = JobEventBuilder::new(job_id, EventType::JobProgress, Source::Scraper);
        if let Some(p) = pct {
            builder = builder.percentage(p);
        }
        builder.build()
    }

    #[test]
    fn job_started_resets_percentage_to_zero() {
        let map = StatusMap::new();
        let event = JobEventBuilder::new("job-1", EventType::JobStarted, Source::Scraper).build();
        let entry = map.apply_event(topics::JOB_STATUS_UPDATES, &event).unwrap();
        assert_eq!(entry.status, JobStatusKind::Running);
        assert_eq!(entry.percentage, 0.0);
        assert_eq!(entry.stage, "SCRAPER");
    }

    #[test]
    fn job_progress_with_percentage_updates_value() {
        let map = StatusMap::new();
        map.apply_event(topics::JOB_STATUS_UPDATES, &progress_event("job-1", Some(10.0)));
        let entry = map
            .apply_event(topics::JOB_STATUS_UPDATES, &progress_event("job-1", Some(47.5)))
            .unwrap();
        assert_eq!(entry.percentage, 47.5);
    }

    #[test]
    fn job_progress_without_percentage_keeps_prior_value() {
        let map = StatusMap::new();
        map.apply_event(topics::JOB_STATUS_UPDATES, &progress_event("job-1", Some(30.0)));
        let entry = map
            .apply_event(topics::JOB_STATUS_UPDATES, &progress_event("job-1", None))
            .unwrap();
        assert_eq!(entry.percentage, 30.0);
    }

    #[test]
    fn loading_complete_forces_percentage_to_100() {
        let map = StatusMap::new();
        let event = JobEventBuilder::new("job-1", EventType::LoadingComplete, Source::Loader).build();
        let entry = map.apply_event(topics::JOB_STATUS_UPDATES, &event).unwrap();
        assert_eq!(entry.status, JobStatusKind::Complete);
        assert_eq!(entry.percentage, 100.0);
    }

    #[test]
    fn job_failed_sets_error_details_and_terminal_status() {
        let map = StatusMap::new();
        let event = JobEventBuilder::new("job-1", EventType::JobFailed, Source::Scraper)
            .error_details("ValueError - bad thing")
            .build();
        let entry = map
            .apply_event(topics::SYSTEM_NOTIFICATIONS, &event)
            .unwrap();
        assert_eq!(entry.status, JobStatusKind::Failed);
        assert_eq!(entry.error_details.as_deref(), Some("ValueError - bad thing"));
    }

    #[test]
    fn unknown_event_on_topic_is_ignored() {
        let map = StatusMap::new();
        let event = JobEventBuilder::new("job-1", EventType::JobFailed, Source::Scraper).build();
        // job_failed only belongs on system-notifications, not job-status-updates.
        let result = map.apply_event(topics::JOB_STATUS_UPDATES, &event);
        assert!(result.is_none());
        assert!(map.get("job-1").is_none());
    }

    #[test]
    fn requested_entry_seeds_percentage_zero() {
        let map = StatusMap::new();
        map.record_requested("job-1", 100.0);
        let entry = map.get("job-1").unwrap();
        assert_eq!(entry.status, JobStatusKind::Requested);
        assert_eq!(entry.percentage, 0.0);
    }
}
