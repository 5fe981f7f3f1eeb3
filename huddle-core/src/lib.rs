pub mod model;

pub use model::{ClientId, ClientMessage, RoomId, ServerMessage};
