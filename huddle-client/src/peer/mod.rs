mod peer_event;
mod peer_session;

pub use peer_event::*;
pub use peer_session::*;
