use dashmap::DashMap;
use huddle_core::{ClientId, ServerMessage};
use tokio::sync::mpsc;
use tracing::debug;

/// Maps a client id to its live outbound signaling queue.
///
/// Sends are best-effort: a missing or closed entry means the client is
/// already gone and the message is dropped.
#[derive(Default)]
pub struct Registry {
    channels: DashMap<ClientId, mpsc::UnboundedSender<ServerMessage>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    pub fn register(&self, id: ClientId, tx: mpsc::UnboundedSender<ServerMessage>) {
        self.channels.insert(id, tx);
    }

    pub fn unregister(&self, id: &ClientId) {
        self.channels.remove(id);
    }

    pub fn send(&self, id: &ClientId, msg: ServerMessage) {
        match self.channels.get(id) {
            Some(tx) => {
                if tx.send(msg).is_err() {
                    debug!("Outbound queue closed for client {}", id);
                }
            }
            None => debug!("Dropping message for disconnected client {}", id),
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
