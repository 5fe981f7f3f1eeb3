pub mod error;
pub mod media;
pub mod peer;
pub mod session;
pub mod signaling;
pub mod transport;

pub use error::ClientError;
pub use media::LocalMedia;
pub use peer::{NegotiationState, PeerCommand, PeerHandle, PeerSession, PeerUpdate, Role};
pub use session::{SessionCommand, SessionController, SessionEvent, SessionHandle};
pub use transport::{PeerTransport, TransportError, TransportEvent, TransportFactory};
