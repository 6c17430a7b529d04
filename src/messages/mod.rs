//! Message types crossing the boundary between the terminal, the network
//! tasks and the viewer.

pub mod network;
pub mod ui_events;

pub use network::SocketEvent;
pub use ui_events::{decode_key, CrosstermKeys};
