//! Broker abstraction: the `scraping-jobs` / `job-status-updates` /
//! `data-processing` / `system-notifications` topic contract, and the two
//! client roles (producer, consumer) every service plays against it.
//!
//! Production code talks to Kafka through [`kafka::KafkaEventProducer`] and
//! [`kafka::KafkaEventConsumer`]; tests talk to the same [`EventProducer`] /
//! [`EventConsumer`] traits through [`mock::MockBroker`], an in-memory
//! channel pair, so no part of the pipeline logic needs a live cluster to
//! exercise.

pub mod events;
pub mod kafka;
pub mod mock;
pub mod topics;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use events::{EventType, JobEvent, JobEventBuilder, ScrapeParameters, Source, now_ts};

const CONNECT_MAX_RETRIES: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("failed to connect to broker at {0} after {1} attempts")]
    ConnectFailed(String, u32),

    #[error("publish failed: {0}")]
    PublishFailed(String),

    #[error("consume failed: {0}")]
    ConsumeFailed(String),

    #[error("message decode failed: {0}")]
    DecodeFailed(#[from] serde_json::Error),
}

/// Publishes [`JobEvent`]s to a named topic.
#[async_trait]
pub trait EventProducer: Send + Sync {
    async fn publish(&self, topic: &str, event: &JobEvent) -> Result<(), BrokerError>;
}

/// A message as delivered off the wire, before the handler has tried to
/// decode it into a [`JobEvent`] — decode failures are a handler-level
/// concern (they're logged and skipped per the shared consumer contract),
/// not a consumer-level one.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl RawMessage {
    pub fn decode(&self) -> Result<JobEvent, BrokerError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Consumes raw messages off one or more subscribed topics.
#[async_trait]
pub trait EventConsumer: Send {
    async fn recv(&mut self) -> Result<RawMessage, BrokerError>;
}

/// Retries an async connect operation up to [`CONNECT_MAX_RETRIES`] times
/// with a fixed backoff, matching the shared broker-consumer contract's
/// "at most five attempts, 5s backoff" rule used at gateway, scraper, and
/// loader startup alike.
pub async fn connect_with_retry<F, Fut, T, E>(role: &str, mut connect: F) -> Result<T, BrokerError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match connect().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= CONNECT_MAX_RETRIES {
                    tracing::error!(role, attempt, %err, "broker connect failed, giving up");
                    return Err(BrokerError::ConnectFailed(role.to_string(), attempt));
                }
                tracing::warn!(
                    role,
                    attempt,
                    max = CONNECT_MAX_RETRIES,
                    %err,
                    "broker not available, retrying"
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn connect_with_retry_succeeds_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, BrokerError> = connect_with_retry("test", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("not ready".to_string())
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn connect_with_retry_gives_up_after_max_attempts() {
        let result: Result<u32, BrokerError> =
            connect_with_retry("test", || async { Err::<u32, _>("down".to_string()) }).await;
        assert!(matches!(result, Err(BrokerError::ConnectFailed(_, 5))));
    }
}
