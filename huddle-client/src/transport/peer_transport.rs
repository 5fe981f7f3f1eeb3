use async_trait::async_trait;
use huddle_core::ClientId;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build peer connection: {0}")]
    Setup(String),

    #[error("failed to create session description: {0}")]
    Description(String),

    #[error("failed to apply remote description: {0}")]
    RemoteDescription(String),

    #[error("invalid ICE candidate: {0}")]
    Candidate(String),
}

/// Events a transport pushes into its peer's inbound queue.
#[derive(Debug)]
pub enum TransportEvent<M> {
    /// Locally gathered ICE candidate, ready to relay to the remote peer.
    /// Gathering runs independently of offer/answer sequencing.
    LocalCandidate(String),
    /// Remote media arrived for this peer.
    RemoteMedia(M),
    /// The underlying connection failed or was closed remotely.
    Closed,
}

/// The connection-establishment primitive supplied by the platform's
/// real-time transport layer. `create_offer` and `create_answer` also set the
/// produced description as the local one.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_offer(&self) -> Result<String, TransportError>;

    async fn create_answer(&self) -> Result<String, TransportError>;

    async fn set_remote_offer(&self, sdp: String) -> Result<(), TransportError>;

    async fn set_remote_answer(&self, sdp: String) -> Result<(), TransportError>;

    async fn add_ice_candidate(&self, candidate: String) -> Result<(), TransportError>;

    async fn close(&self);
}

/// Creates one transport per remote peer, wired to that peer's event queue.
#[async_trait]
pub trait TransportFactory: Send + Sync + 'static {
    /// Remote media handle exposed to the UI collaborator.
    type Media: Clone + Send + Sync + 'static;
    type Transport: PeerTransport + 'static;

    async fn create(
        &self,
        remote: ClientId,
        events: mpsc::Sender<TransportEvent<Self::Media>>,
    ) -> Result<Self::Transport, TransportError>;
}
