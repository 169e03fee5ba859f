//! The gateway's background broker-consumer thread.
//!
//! Mirrors §5's "one dedicated parallel OS thread for broker consumption,
//! hand-off via a schedule-coroutine-from-thread primitive": here the
//! dedicated thread owns a single-threaded tokio runtime driving an
//! [`EventConsumer`], and hands each received event to the main runtime
//! over a bounded channel so the status map update and broadcast happen
//! on the cooperative scheduler, exactly as the design notes describe.

use super::state::AppState;
use crate::broker::{EventConsumer, JobEvent, RawMessage, topics};
use std::thread::JoinHandle;
use tokio::sync::mpsc;

pub struct ConsumerHandle {
    stop: Option<tokio::sync::oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl ConsumerHandle {
    /// Signals the consumer thread to stop and joins it with a 10s
    /// timeout, matching the documented shutdown contract.
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = tokio::task::spawn_blocking(move || {
                let _ = join.join();
            })
            .await;
        }
    }
}

/// Spawns the dedicated consumer thread and the main-runtime task that
/// drains its hand-off channel and applies updates to the status map.
pub fn spawn<C>(state: AppState, mut consumer: C) -> ConsumerHandle
where
    C: EventConsumer + 'static,
{
    let (tx, mut rx) = mpsc::channel::<RawMessage>(256);
    let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();

    let join = std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build consumer thread runtime");

        runtime.block_on(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        tracing::info!("broker consumer thread received stop signal");
                        break;
                    }
                    result = consumer.recv() => {
                        match result {
                            Ok(message) => {
                                if tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                            Err(err) => {
                                tracing::error!(%err, "broker consume failed, continuing");
                            }
                        }
                    }
                }
            }
        });
    });

    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            handle_message(&state, message);
        }
    });

    ConsumerHandle {
        stop: Some(stop_tx),
        join: Some(join),
    }
}

fn handle_message(state: &AppState, message: RawMessage) {
    let event: JobEvent = match message.decode() {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(topic = %message.topic, %err, "failed to decode broker message, skipping");
            return;
        }
    };

    tracing::debug!(
        job_id = %event.job_id,
        topic = %message.topic,
        event_type = event.event_type.as_str(),
        "received status event"
    );

    if let Some(entry) = state.status_map.apply_event(&message.topic, &event) {
        state.push.broadcast_status(event.job_id.clone(), entry);
    }
}

/// Topics the gateway subscribes its status-listener consumer to.
pub const STATUS_LISTENER_TOPICS: &[&str] = &[topics::JOB_STATUS_UPDATES, topics::SYSTEM_NOTIFICATIONS];
