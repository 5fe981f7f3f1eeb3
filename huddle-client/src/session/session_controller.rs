use crate::media::LocalMedia;
use crate::peer::{PeerCommand, PeerHandle, PeerSession, PeerUpdate, Role};
use crate::session::{SessionCommand, SessionEvent};
use crate::transport::{TransportError, TransportFactory};
use dashmap::DashMap;
use huddle_core::{ClientId, ClientMessage, RoomId, ServerMessage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const TRANSPORT_QUEUE_DEPTH: usize = 256;

/// Cloneable handle for driving a running session from the outside.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn leave(&self) {
        let _ = self.commands.send(SessionCommand::Leave);
    }

    pub fn set_audio_enabled(&self, enabled: bool) {
        let _ = self.commands.send(SessionCommand::SetAudioEnabled(enabled));
    }

    pub fn set_video_enabled(&self, enabled: bool) {
        let _ = self.commands.send(SessionCommand::SetVideoEnabled(enabled));
    }
}

/// Owns the lifecycle of every peer negotiation for one room: joins on
/// start, spawns an offerer session per discovered peer, an answerer session
/// per incoming offer, and tears sessions down on departure or room exit.
pub struct SessionController<F: TransportFactory> {
    room: RoomId,
    local_id: Option<ClientId>,
    factory: F,
    local_media: Arc<dyn LocalMedia>,
    peers: HashMap<ClientId, PeerHandle>,
    media: Arc<DashMap<ClientId, F::Media>>,
    signal_tx: mpsc::UnboundedSender<ClientMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    update_tx: mpsc::UnboundedSender<PeerUpdate<F::Media>>,
    update_rx: mpsc::UnboundedReceiver<PeerUpdate<F::Media>>,
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    event_tx: mpsc::UnboundedSender<SessionEvent<F::Media>>,
}

impl<F: TransportFactory> SessionController<F> {
    pub fn new(
        room: RoomId,
        factory: F,
        local_media: Arc<dyn LocalMedia>,
        signal_tx: mpsc::UnboundedSender<ClientMessage>,
        server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    ) -> (
        Self,
        SessionHandle,
        mpsc::UnboundedReceiver<SessionEvent<F::Media>>,
    ) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let controller = Self {
            room,
            local_id: None,
            factory,
            local_media,
            peers: HashMap::new(),
            media: Arc::new(DashMap::new()),
            signal_tx,
            server_rx,
            update_tx,
            update_rx,
            command_rx,
            event_tx,
        };
        let handle = SessionHandle {
            commands: command_tx,
        };

        (controller, handle, event_rx)
    }

    /// The room id, for display and sharing.
    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// The remote media handles, keyed by peer id and kept in sync with
    /// peer session lifecycles.
    pub fn remote_media(&self) -> Arc<DashMap<ClientId, F::Media>> {
        Arc::clone(&self.media)
    }

    pub async fn run(mut self) {
        let _ = self.signal_tx.send(ClientMessage::Join {
            room: self.room.clone(),
        });

        loop {
            tokio::select! {
                msg = self.server_rx.recv() => match msg {
                    Some(msg) => self.handle_server_message(msg).await,
                    None => {
                        info!("Signaling channel closed");
                        break;
                    }
                },
                update = self.update_rx.recv() => match update {
                    Some(update) => self.handle_peer_update(update),
                    None => break,
                },
                cmd = self.command_rx.recv() => match cmd {
                    Some(SessionCommand::SetAudioEnabled(enabled)) => {
                        self.local_media.set_audio_enabled(enabled);
                    }
                    Some(SessionCommand::SetVideoEnabled(enabled)) => {
                        self.local_media.set_video_enabled(enabled);
                    }
                    Some(SessionCommand::Leave) | None => break,
                },
            }
        }

        self.shutdown().await;
    }

    async fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { id } => {
                info!("Assigned client id {}", id);
                self.local_id = Some(id);
            }
            ServerMessage::ExistingUsers { users } => {
                for id in users {
                    self.spawn_offerer(id).await;
                }
            }
            ServerMessage::UserConnected { id } => {
                self.spawn_offerer(id).await;
            }
            ServerMessage::UserDisconnected { id } => {
                // Repeat delivery for an already-discarded peer is a no-op.
                let known = self.peers.contains_key(&id);
                self.close_peer(&id).await;
                if known {
                    info!("User disconnected: {}", id);
                    let _ = self.event_tx.send(SessionEvent::PeerLeft(id));
                }
            }
            ServerMessage::Offer { offer, from } => {
                self.handle_offer(from, offer).await;
            }
            ServerMessage::Answer { answer, from } => {
                self.route(&from, PeerCommand::RemoteAnswer { sdp: answer })
                    .await;
            }
            ServerMessage::IceCandidate { candidate, from } => {
                self.route(&from, PeerCommand::RemoteCandidate { candidate })
                    .await;
            }
        }
    }

    fn handle_peer_update(&mut self, update: PeerUpdate<F::Media>) {
        match update {
            PeerUpdate::MediaAdded { id, media } => {
                self.media.insert(id.clone(), media.clone());
                let _ = self.event_tx.send(SessionEvent::MediaAdded { id, media });
            }
            PeerUpdate::Closed { id } => {
                self.peers.remove(&id);
                if self.media.remove(&id).is_some() {
                    let _ = self.event_tx.send(SessionEvent::MediaRemoved(id));
                }
            }
        }
    }

    /// Starts an offerer negotiation with a discovered peer. Discovery can
    /// arrive through both `existing-users` and `user-connected`; a peer that
    /// already has a live session is not offered to twice.
    async fn spawn_offerer(&mut self, id: ClientId) {
        if self.local_id.as_ref() == Some(&id) {
            return;
        }
        if self.peers.contains_key(&id) {
            debug!("Already negotiating with {}", id);
            return;
        }

        match self.spawn_peer(id.clone(), Role::Offerer).await {
            Ok(handle) => {
                info!("User connected: {}", id);
                self.peers.insert(id.clone(), handle);
                let _ = self.event_tx.send(SessionEvent::PeerJoined(id));
            }
            Err(e) => warn!("Failed to start negotiation with {}: {}", id, e),
        }
    }

    async fn handle_offer(&mut self, from: ClientId, offer: String) {
        if let Some(handle) = self.peers.get(&from) {
            // Renegotiation of a live peer, not a second connection.
            handle.send(PeerCommand::RemoteOffer { sdp: offer }).await;
            return;
        }

        match self.spawn_peer(from.clone(), Role::Answerer).await {
            Ok(handle) => {
                info!("User connected: {}", from);
                handle.send(PeerCommand::RemoteOffer { sdp: offer }).await;
                self.peers.insert(from.clone(), handle);
                let _ = self.event_tx.send(SessionEvent::PeerJoined(from));
            }
            Err(e) => warn!("Failed to answer offer from {}: {}", from, e),
        }
    }

    async fn spawn_peer(
        &mut self,
        id: ClientId,
        role: Role,
    ) -> Result<PeerHandle, TransportError> {
        let (transport_tx, transport_rx) = mpsc::channel(TRANSPORT_QUEUE_DEPTH);
        let transport = self.factory.create(id.clone(), transport_tx).await?;

        Ok(PeerSession::spawn(
            id,
            role,
            transport,
            transport_rx,
            self.signal_tx.clone(),
            self.update_tx.clone(),
        ))
    }

    async fn route(&mut self, from: &ClientId, cmd: PeerCommand) {
        match self.peers.get(from) {
            Some(handle) => handle.send(cmd).await,
            None => debug!("Dropping message for unknown peer {}", from),
        }
    }

    async fn close_peer(&mut self, id: &ClientId) {
        if let Some(handle) = self.peers.remove(id) {
            handle.close().await;
        }
        if self.media.remove(id).is_some() {
            let _ = self.event_tx.send(SessionEvent::MediaRemoved(id.clone()));
        }
    }

    async fn shutdown(&mut self) {
        info!("Leaving room {}", self.room);

        let ids: Vec<ClientId> = self.peers.keys().cloned().collect();
        for id in &ids {
            self.close_peer(id).await;
        }

        self.local_media.release();
        self.media.clear();
    }
}
