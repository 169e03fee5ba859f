//! Request/response and status-map wire types for the gateway HTTP surface.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `POST /trigger-job-pipeline` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineTriggerRequest {
    pub job_titles: String,
    pub location: String,
    pub time_filter: Option<String>,
    pub max_jobs: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineTriggerResponse {
    pub message: String,
    pub job_id: String,
}

/// `PATCH /jobs/{job_id}/progress` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressUpdate {
    pub progress: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub kafka_connection: &'static str,
    pub kafka_broker: String,
}

/// One row of the `GET /data` projection: a persisted job plus its skills.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct JobItem {
    pub job_id: i64,
    pub title: String,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub job_url: Option<String>,
    pub date_posted: Option<chrono::NaiveDate>,
    pub date_scraped: Option<chrono::NaiveDateTime>,
    pub progress: Option<String>,
    #[sqlx(skip)]
    pub skills: Vec<String>,
}

/// The gateway's coarse job status, as recorded in the in-memory status map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatusKind {
    Requested,
    Running,
    #[serde(rename = "LOADING DATA")]
    LoadingData,
    Complete,
    Failed,
}

impl JobStatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatusKind::Requested => "REQUESTED",
            JobStatusKind::Running => "RUNNING",
            JobStatusKind::LoadingData => "LOADING DATA",
            JobStatusKind::Complete => "COMPLETE",
            JobStatusKind::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatusKind::Complete | JobStatusKind::Failed)
    }
}

/// A single status-map entry, keyed externally by `job_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatusEntry {
    pub status: JobStatusKind,
    pub stage: String,
    pub percentage: f64,
    pub last_event_type: Option<String>,
    pub source: Option<String>,
    pub requested_at: f64,
    pub last_update: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl JobStatusEntry {
    pub fn new_requested(now: f64) -> Self {
        Self {
            status: JobStatusKind::Requested,
            stage: "GATEWAY".to_string(),
            percentage: 0.0,
            last_event_type: None,
            source: Some("gateway".to_string()),
            requested_at: now,
            last_update: now,
            error_details: None,
            details: None,
        }
    }
}

/// Snapshot of the whole status map, as sent in the `initial_state` push
/// message and assembled for the `GET /jobs/{job_id}/status` read.
pub type StatusSnapshot = HashMap<String, JobStatusEntry>;

/// The projection of a [`JobStatusEntry`] actually broadcast on a
/// `status_update` push message: only these six keys, each dropped
/// entirely when absent rather than sent as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatusKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event_type: Option<String>,
}

impl From<&JobStatusEntry> for BroadcastData {
    fn from(entry: &JobStatusEntry) -> Self {
        Self {
            status: Some(entry.status),
            stage: Some(entry.stage.clone()),
            percentage: Some(entry.percentage),
            error_details: entry.error_details.clone(),
            last_update: Some(entry.last_update),
            last_event_type: entry.last_event_type.clone(),
        }
    }
}

/// Server→client push-channel message: `{type:"initial_state", jobs:{...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum PushMessage {
    #[serde(rename = "initial_state")]
    InitialState { jobs: StatusSnapshot },
    #[serde(rename = "status_update")]
    StatusUpdate {
        job_id: String,
        data: BroadcastData,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_kind_serializes_to_spec_labels() {
        assert_eq!(
            serde_json::to_string(&JobStatusKind::LoadingData).unwrap(),
            "\"LOADING DATA\""
        );
        assert_eq!(
            serde_json::to_string(&JobStatusKind::Running).unwrap(),
            "\"RUNNING\""
        );
    }

    #[test]
    fn terminal_status_kinds() {
        assert!(JobStatusKind::Complete.is_terminal());
        assert!(JobStatusKind::Failed.is_terminal());
        assert!(!JobStatusKind::Running.is_terminal());
    }

    #[test]
    fn push_message_has_tagged_shape() {
        let entry = JobStatusEntry::new_requested(1.0);
        let msg = PushMessage::StatusUpdate {
            job_id: "job-1".to_string(),
            data: BroadcastData::from(&entry),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "status_update");
        assert_eq!(json["job_id"], "job-1");
        assert!(json["data"].is_object());
    }

    #[test]
    fn broadcast_data_omits_absent_error_details() {
        let entry = JobStatusEntry::new_requested(1.0);
        let data = BroadcastData::from(&entry);
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("error_details").is_none());
        assert!(json.get("source").is_none(), "source is not part of the broadcast projection");
        assert!(json.get("requested_at").is_none(), "requested_at is not part of the broadcast projection");
    }
}
