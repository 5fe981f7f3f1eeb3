mod peer_transport;
mod rtc_transport;

pub use peer_transport::*;
pub use rtc_transport::*;
