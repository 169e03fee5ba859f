use super::status::StatusMap;
use super::ws::PushChannel;
use crate::broker::EventProducer;
use crate::config::Config;
use crate::observability::Metrics;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub producer: Arc<dyn EventProducer>,
    pub status_map: Arc<StatusMap>,
    pub push: PushChannel,
    pub db: PgPool,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        producer: Arc<dyn EventProducer>,
        status_map: Arc<StatusMap>,
        push: PushChannel,
        db: PgPool,
    ) -> Self {
        Self {
            config,
            producer,
            status_map,
            push,
            db,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
