mod registry;
mod relay_service;
mod room_table;

pub use registry::*;
pub use relay_service::*;
pub use room_table::*;
