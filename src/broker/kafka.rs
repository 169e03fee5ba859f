//! `rdkafka`-backed [`EventProducer`] / [`EventConsumer`] implementations.
//!
//! Producer and consumer configuration follow the shared contract in
//! §4.4 exactly: acks from all in-sync replicas, five producer retries,
//! 500ms retry backoff, a 10s request timeout, earliest-offset consumers
//! with ~5s auto-commit.

use super::{BrokerError, EventConsumer, EventProducer, JobEvent, RawMessage};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;

const PRODUCE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct KafkaEventProducer {
    producer: FutureProducer,
}

impl KafkaEventProducer {
    pub fn connect(broker_url: &str) -> Result<Self, BrokerError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", broker_url)
            .set("acks", "all")
            .set("message.send.max.retries", "5")
            .set("retry.backoff.ms", "500")
            .set("request.timeout.ms", "10000")
            .create()
            .map_err(|e| BrokerError::PublishFailed(e.to_string()))?;
        Ok(Self { producer })
    }
}

#[async_trait]
impl EventProducer for KafkaEventProducer {
    async fn publish(&self, topic: &str, event: &JobEvent) -> Result<(), BrokerError> {
        let payload = serde_json::to_vec(event)?;
        let record: FutureRecord<'_, (), Vec<u8>> = FutureRecord::to(topic).payload(&payload);
        self.producer
            .send(record, PRODUCE_TIMEOUT)
            .await
            .map_err(|(err, _)| BrokerError::PublishFailed(err.to_string()))?;
        Ok(())
    }
}

pub struct KafkaEventConsumer {
    consumer: StreamConsumer,
}

impl KafkaEventConsumer {
    pub fn connect(broker_url: &str, group_id: &str, topics: &[&str]) -> Result<Self, BrokerError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", broker_url)
            .set("group.id", group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .create()
            .map_err(|e| BrokerError::ConsumeFailed(e.to_string()))?;
        consumer
            .subscribe(topics)
            .map_err(|e| BrokerError::ConsumeFailed(e.to_string()))?;
        Ok(Self { consumer })
    }
}

#[async_trait]
impl EventConsumer for KafkaEventConsumer {
    async fn recv(&mut self) -> Result<RawMessage, BrokerError> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| BrokerError::ConsumeFailed(e.to_string()))?;
        let payload = message.payload().unwrap_or_default().to_vec();
        let topic = message.topic().to_string();
        Ok(RawMessage { topic, payload })
    }
}
