use super::consumer;
use super::services;
use super::state::AppState;
use super::status::StatusMap;
use super::ws::PushChannel;
use crate::broker::kafka::{KafkaEventConsumer, KafkaEventProducer};
use crate::broker::{EventProducer, connect_with_retry};
use crate::config::Config;
use axum::Router;
use axum::routing::{delete, get, patch, post};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub async fn run(address: SocketAddr, config: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Arc::new(config);

    let broker_url = config.broker.kafka_broker_url.clone();
    let producer = connect_with_retry("gateway-producer", || {
        let broker_url = broker_url.clone();
        async move { KafkaEventProducer::connect(&broker_url) }
    })
    .await?;
    let producer: Arc<dyn EventProducer> = Arc::new(producer);

    let consumer = connect_with_retry("gateway-consumer", || {
        let broker_url = broker_url.clone();
        async move {
            KafkaEventConsumer::connect(
                &broker_url,
                crate::broker::topics::API_STATUS_LISTENER_GROUP,
                consumer::STATUS_LISTENER_TOPICS,
            )
        }
    })
    .await?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database.database_url)
        .await?;

    let state = AppState::new(
        config.clone(),
        producer,
        Arc::new(StatusMap::new()),
        PushChannel::new(),
        db,
    );

    let consumer_handle = consumer::spawn(state.clone(), consumer);

    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(%address, "gateway listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    consumer_handle.shutdown().await;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let max_payload_bytes = state.config.server.max_payload_bytes.as_u64() as usize;

    Router::new()
        .route(
            "/trigger-job-pipeline",
            post(services::trigger_job_pipeline)
                .layer(RequestBodyLimitLayer::new(max_payload_bytes)),
        )
        .route("/jobs/{job_id}/status", get(services::get_job_status))
        .route("/jobs/{job_id}/progress", patch(services::patch_progress))
        .route("/jobs/{job_id}", delete(services::delete_job))
        .route("/data", get(services::get_data))
        .route("/health", get(services::health))
        .route("/ws", get(services::push_channel))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
