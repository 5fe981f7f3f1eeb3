use crate::relay::{Registry, RoomTable};
use huddle_core::{ClientId, ClientMessage, RoomId, ServerMessage};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

/// Snapshot of relay occupancy for the periodic stats log.
#[derive(Debug, Clone, Copy)]
pub struct RelayStats {
    pub rooms: usize,
    pub clients: usize,
}

struct RelayInner {
    registry: Registry,
    rooms: Mutex<RoomTable>,
}

/// The signaling relay: owns the connection registry and the room table,
/// interprets inbound control messages and routes envelopes between members.
///
/// It never parses SDP/ICE payloads; routing is purely by client id. All
/// failure modes (unknown sender, unreachable target) are no-ops.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                registry: Registry::new(),
                rooms: Mutex::new(RoomTable::new()),
            }),
        }
    }

    /// Registers a freshly established signaling channel and assigns its id.
    pub fn connect(&self, tx: mpsc::UnboundedSender<ServerMessage>) -> ClientId {
        let id = ClientId::new();
        self.inner.registry.register(id.clone(), tx);
        info!("Client connected: {}", id);

        self.inner
            .registry
            .send(&id, ServerMessage::Welcome { id: id.clone() });
        id
    }

    pub async fn handle_message(&self, from: &ClientId, msg: ClientMessage) {
        match msg {
            ClientMessage::Join { room } => self.handle_join(from, room).await,
            ClientMessage::Offer { offer, to } => self.forward(
                from,
                &to,
                ServerMessage::Offer {
                    offer,
                    from: from.clone(),
                },
            ),
            ClientMessage::Answer { answer, to } => self.forward(
                from,
                &to,
                ServerMessage::Answer {
                    answer,
                    from: from.clone(),
                },
            ),
            ClientMessage::IceCandidate { candidate, to } => self.forward(
                from,
                &to,
                ServerMessage::IceCandidate {
                    candidate,
                    from: from.clone(),
                },
            ),
        }
    }

    /// Implicit leave followed by unregistering the channel.
    pub async fn disconnect(&self, id: &ClientId) {
        let left = self.inner.rooms.lock().await.leave(id);

        if let Some((room, remaining)) = left {
            info!("Client {} disconnected from room {}", id, room);
            self.notify_departure(id, &remaining);
        }

        self.inner.registry.unregister(id);
    }

    pub async fn stats(&self) -> RelayStats {
        let rooms = self.inner.rooms.lock().await.room_count();
        RelayStats {
            rooms,
            clients: self.inner.registry.len(),
        }
    }

    async fn handle_join(&self, from: &ClientId, room: RoomId) {
        if room.is_empty() {
            warn!("Client {} sent a join with an empty room name", from);
            return;
        }

        let outcome = {
            let mut rooms = self.inner.rooms.lock().await;
            rooms.join(from.clone(), room.clone())
        };

        if let Some((old_room, remaining)) = outcome.left {
            info!("Client {} left room {}", from, old_room);
            self.notify_departure(from, &remaining);
        }

        info!("Client {} joined room {}", from, room);

        for peer in &outcome.peers {
            self.inner.registry.send(
                peer,
                ServerMessage::UserConnected { id: from.clone() },
            );
        }

        // The joiner only hears about a room that already has members.
        if !outcome.peers.is_empty() {
            self.inner.registry.send(
                from,
                ServerMessage::ExistingUsers {
                    users: outcome.peers,
                },
            );
        }
    }

    /// Point-to-point envelope relay. An unknown target means the peer is
    /// already gone; the message is dropped without telling the sender.
    fn forward(&self, from: &ClientId, to: &ClientId, msg: ServerMessage) {
        debug!("Relaying message from {} to {}", from, to);
        self.inner.registry.send(to, msg);
    }

    fn notify_departure(&self, departed: &ClientId, remaining: &[ClientId]) {
        for peer in remaining {
            self.inner.registry.send(
                peer,
                ServerMessage::UserDisconnected {
                    id: departed.clone(),
                },
            );
        }
    }
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}
