mod client;
mod room;
mod signaling;

pub use client::ClientId;
pub use room::RoomId;
pub use signaling::{ClientMessage, ServerMessage};
