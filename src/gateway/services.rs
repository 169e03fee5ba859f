use super::error::ApiError;
use super::models::{
    HealthResponse, JobStatusEntry, PipelineTriggerRequest, PipelineTriggerResponse, ProgressUpdate,
};
use super::state::AppState;
use super::validation::validate_trigger_request;
use super::{db, ws};
use crate::broker::{JobEventBuilder, EventType, ScrapeParameters, Source, now_ts, topics};
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{Json, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

/// `POST /trigger-job-pipeline`
pub async fn trigger_job_pipeline(
    State(state): State<AppState>,
    Json(request): Json<PipelineTriggerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_trigger_request(&request)?;

    let google_api_key = state.config.scraper.google_api_key.clone().unwrap_or_default();

    let job_id = Uuid::new_v4().to_string();
    let parameters = ScrapeParameters {
        google_api_key,
        job_titles: request.job_titles,
        location: request.location,
        time_filter: request.time_filter,
        max_jobs: request.max_jobs as u32,
    };
    let event = JobEventBuilder::new(&job_id, EventType::JobRequested, Source::Gateway)
        .parameters(parameters)
        .build();

    state
        .producer
        .publish(topics::SCRAPING_JOBS, &event)
        .await
        .map_err(|e| ApiError::BrokerUnavailable(e.to_string()))?;

    state.status_map.record_requested(&job_id, now_ts());
    state.metrics.job_triggered();

    Ok((
        StatusCode::ACCEPTED,
        Json(PipelineTriggerResponse {
            message: "Job pipeline triggered".to_string(),
            job_id,
        }),
    ))
}

/// `GET /jobs/{job_id}/status`
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusEntry>, ApiError> {
    state
        .status_map
        .get(&job_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(job_id))
}

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

/// `GET /data`
pub async fn get_data(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let jobs = db::list_jobs(&state.db, query.limit, query.offset).await?;
    Ok(Json(jobs))
}

/// `PATCH /jobs/{job_id}/progress`
pub async fn patch_progress(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Json(update): Json<ProgressUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = db::update_progress(&state.db, job_id, &update.progress).await?;
    if updated {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound(job_id.to_string()))
    }
}

/// `DELETE /jobs/{job_id}`
pub async fn delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = db::delete_job(&state.db, job_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(job_id.to_string()))
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let connected = !state.config.broker.kafka_broker_url.is_empty();
    Json(HealthResponse {
        status: "healthy",
        kafka_connection: if connected { "connected" } else { "error" },
        kafka_broker: state.config.broker.kafka_broker_url.clone(),
    })
}

/// Push-channel upgrade endpoint.
pub async fn push_channel(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let channel = state.push.clone();
    let snapshot = state.status_map.snapshot();
    ws.on_upgrade(move |socket| ws::handle_socket(socket, channel, snapshot))
}
