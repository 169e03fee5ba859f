//! Push-channel (WebSocket) fan-out, adapted from the original
//! `ConnectionManager`: on connect, send a snapshot `initial_state`
//! message, then block receiving from the client, logging and ignoring
//! whatever text frames arrive. Broadcasts snapshot the client list
//! before sending so a slow or disconnecting client can't hold up others.

use super::models::{BroadcastData, JobStatusEntry, PushMessage};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

/// Cloneable handle shared by every connected client's send task and by
/// the status-update broadcaster.
#[derive(Clone)]
pub struct PushChannel {
    sender: broadcast::Sender<PushMessage>,
}

impl PushChannel {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    /// Schedules a `status_update` broadcast. Per-client delivery failure
    /// (a full or closed receiver) only drops that client's copy of this
    /// message; it never affects other subscribers.
    pub fn broadcast_status(&self, job_id: String, entry: JobStatusEntry) {
        let data = BroadcastData::from(&entry);
        let _ = self.sender.send(PushMessage::StatusUpdate { job_id, data });
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<PushMessage> {
        self.sender.subscribe()
    }
}

impl Default for PushChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives one accepted WebSocket connection for its whole lifetime: sends
/// the initial snapshot, then alternates between forwarding broadcasts and
/// draining (and discarding) inbound client frames.
pub async fn handle_socket(
    socket: WebSocket,
    channel: PushChannel,
    initial_snapshot: super::models::StatusSnapshot,
) {
    let (sender, mut receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));

    let initial = PushMessage::InitialState {
        jobs: initial_snapshot,
    };
    if let Ok(text) = serde_json::to_string(&initial) {
        if sender.lock().await.send(Message::Text(text.into())).await.is_err() {
            return;
        }
    }

    let mut updates = channel.subscribe();
    let forward_sender = sender.clone();
    let forward_task = tokio::spawn(async move {
        while let Ok(message) = updates.recv().await {
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if forward_sender
                .lock()
                .await
                .send(Message::Text(text.into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Close(_) => break,
            Message::Text(text) => {
                tracing::debug!(%text, "ignoring inbound push-channel text frame");
            }
            _ => {}
        }
    }

    forward_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::models::JobStatusEntry;

    #[test]
    fn broadcast_without_subscribers_does_not_panic() {
        let channel = PushChannel::new();
        channel.broadcast_status("job-1".to_string(), JobStatusEntry::new_requested(1.0));
    }

    #[tokio::test]
    async fn subscriber_receives_broadcast() {
        let channel = PushChannel::new();
        let mut rx = channel.subscribe();
        channel.broadcast_status("job-1".to_string(), JobStatusEntry::new_requested(1.0));
        let received = rx.recv().await.unwrap();
        match received {
            PushMessage::StatusUpdate { job_id, .. } => assert_eq!(job_id, "job-1"),
            _ => panic!("expected status update"),
        }
    }
}
