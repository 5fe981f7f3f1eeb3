pub mod config;
pub mod relay;
pub mod signaling;

pub use config::ServerConfig;
pub use relay::{Registry, RelayService, RelayStats, RoomTable};
pub use signaling::{app, ws_handler};
