use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use fetchbox::broker::mock::MockBroker;
use fetchbox::broker::{EventProducer, EventType, JobEventBuilder, Source, topics};
use fetchbox::config::Config;
use fetchbox::gateway::build_router;
use fetchbox::gateway::state::AppState;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower::ServiceExt;

async fn build_test_app() -> (axum::Router, MockBroker, AppState) {
    let broker = MockBroker::new();
    let producer: Arc<dyn EventProducer> = Arc::new(broker.producer());

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgres://localhost/test")
        .expect("lazy pool should always construct");

    let state = AppState::new(
        Arc::new(Config::default()),
        producer,
        Arc::new(fetchbox::gateway::status::StatusMap::new()),
        fetchbox::gateway::ws::PushChannel::new(),
        pool,
    );

    (build_router(state.clone()), broker, state)
}

#[tokio::test]
async fn trigger_job_pipeline_returns_202_with_job_id() {
    let (app, broker, _state) = build_test_app().await;
    let mut consumer = broker.subscribe(topics::SCRAPING_JOBS).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/trigger-job-pipeline")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "job_titles": "Software Engineer, Data Scientist",
                        "location": "Remote",
                        "time_filter": "1w",
                        "max_jobs": 50
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["job_id"].is_string());

    let published = tokio::time::timeout(std::time::Duration::from_secs(1), consumer.recv())
        .await
        .expect("timed out waiting for job_requested")
        .unwrap();
    assert_eq!(published.topic, topics::SCRAPING_JOBS);
}

#[tokio::test]
async fn trigger_job_pipeline_rejects_empty_job_titles() {
    let (app, _broker, _state) = build_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/trigger-job-pipeline")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "job_titles": "",
                        "location": "Remote",
                        "max_jobs": 10
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn trigger_job_pipeline_rejects_invalid_time_filter() {
    let (app, _broker, _state) = build_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/trigger-job-pipeline")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "job_titles": "Engineer",
                        "location": "Remote",
                        "time_filter": "last-year",
                        "max_jobs": 10
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn job_status_returns_404_for_unknown_job() {
    let (app, _broker, _state) = build_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/jobs/does-not-exist/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn job_status_reflects_trigger_then_broker_event() {
    let (app, broker, state) = build_test_app().await;
    let producer = broker.producer();
    let consumer = broker.subscribe(topics::JOB_STATUS_UPDATES).await;
    let consumer_handle = fetchbox::gateway::consumer::spawn(state, consumer);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/trigger-job-pipeline")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"job_titles": "Engineer", "location": "Remote", "max_jobs": 5}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    let job_id = json["job_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/jobs/{job_id}/status"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let status: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(status["status"], "REQUESTED");

    let event = JobEventBuilder::new(&job_id, EventType::JobStarted, Source::Scraper).build();
    producer.publish(topics::JOB_STATUS_UPDATES, &event).await.unwrap();

    let status = poll_until_status(&app, &job_id, "RUNNING").await;
    assert_eq!(status["status"], "RUNNING");

    consumer_handle.shutdown().await;
}

/// Polls `/jobs/{job_id}/status` until it reports `want` or the timeout
/// elapses, since the broker consumer applies events on its own thread.
async fn poll_until_status(app: &axum::Router, job_id: &str, want: &str) -> Value {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    loop {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/jobs/{job_id}/status"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let status: Value = serde_json::from_slice(&body).unwrap();
        if status["status"] == want || tokio::time::Instant::now() >= deadline {
            return status;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn health_reports_configured_broker_url() {
    let (app, _broker, _state) = build_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["kafka_broker"], "kafka:9092");
}
