//! Network layer - HTTP request execution and Socket.IO sessions

pub mod client;
pub mod socketio;
pub mod websocket;

pub use client::{create_client, execute_request};
pub use websocket::SocketClient;
