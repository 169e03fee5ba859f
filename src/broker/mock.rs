//! In-memory broker double used by tests and the gateway/scraper/loader
//! integration tests in `tests/`. Grounded on the teacher's `MockProducer`
//! (`messaging::MockProducer`), extended with a consumer half since this
//! crate, unlike the teacher, has real cross-process consumers to fake out.

use super::{BrokerError, EventProducer, JobEvent, RawMessage};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, Receiver, Sender};

/// One shared in-memory topic space. Cloning a handle shares the same
/// underlying channels, so a producer on one handle is observed by a
/// consumer built from another handle to the same [`MockBroker`].
#[derive(Clone)]
pub struct MockBroker {
    inner: Arc<Mutex<Vec<(String, Sender<RawMessage>)>>>,
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBroker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a consumer subscribed to `topic`. Every later publish to
    /// that topic (from any producer handle sharing this broker) is
    /// delivered to every subscribed consumer.
    pub async fn subscribe(&self, topic: &str) -> MockConsumer {
        let (tx, rx) = mpsc::channel(256);
        self.inner.lock().await.push((topic.to_string(), tx));
        MockConsumer { rx }
    }

    pub fn producer(&self) -> MockProducer {
        MockProducer {
            inner: self.inner.clone(),
        }
    }
}

pub struct MockProducer {
    inner: Arc<Mutex<Vec<(String, Sender<RawMessage>)>>>,
}

#[async_trait]
impl EventProducer for MockProducer {
    async fn publish(&self, topic: &str, event: &JobEvent) -> Result<(), BrokerError> {
        let payload = serde_json::to_vec(event)?;
        let message = RawMessage {
            topic: topic.to_string(),
            payload,
        };
        let subscribers = self.inner.lock().await;
        for (sub_topic, tx) in subscribers.iter() {
            if sub_topic == topic {
                let _ = tx.send(message.clone()).await;
            }
        }
        Ok(())
    }
}

pub struct MockConsumer {
    rx: Receiver<RawMessage>,
}

#[async_trait]
impl super::EventConsumer for MockConsumer {
    async fn recv(&mut self) -> Result<RawMessage, BrokerError> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| BrokerError::ConsumeFailed("mock broker closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{EventConsumer, EventType, JobEventBuilder, Source};

    #[tokio::test]
    async fn published_event_is_delivered_to_subscriber() {
        let broker = MockBroker::new();
        let mut consumer = broker.subscribe("scraping-jobs").await;
        let producer = broker.producer();

        let event = JobEventBuilder::new("job-1", EventType::JobRequested, Source::Gateway).build();
        producer.publish("scraping-jobs", &event).await.unwrap();

        let received = consumer.recv().await.unwrap();
        let decoded = received.decode().unwrap();
        assert_eq!(decoded.job_id, "job-1");
    }

    #[tokio::test]
    async fn subscriber_on_other_topic_does_not_receive() {
        let broker = MockBroker::new();
        let mut consumer = broker.subscribe("data-processing").await;
        let producer = broker.producer();

        let event = JobEventBuilder::new("job-1", EventType::JobRequested, Source::Gateway).build();
        producer.publish("scraping-jobs", &event).await.unwrap();

        let timeout = tokio::time::timeout(std::time::Duration::from_millis(50), consumer.recv()).await;
        assert!(timeout.is_err());
    }
}
