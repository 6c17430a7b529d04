//! # apiwalk
//!
//! Replay the requests of an API project from the terminal and browse the
//! responses as collapsible JSON.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, PATCH, DELETE
//! - Socket.IO sessions over WebSocket
//! - `{{variable}}` substitution with per-project hooks
//! - Every exchange saved next to the project
//! - Structural JSON navigation with collapse/expand
//!
//! ## Architecture
//! - Viewer core (`viewer`) - line buffer, annotations and navigation
//! - App layer (`app`) - menu loop, synchronous
//! - Network layer (Tokio runtime) - HTTP and Socket.IO tasks

pub mod app;
pub mod constants;
pub mod hooks;
pub mod menu;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod ui;
pub mod viewer;

// Re-export commonly used types
pub use app::App;
pub use menu::Menu;
pub use models::{
    ApiResponse, HttpMethod, HttpRequest, Project, Request, SocketIoRequest, Variables,
};
pub use storage::{discover_projects, ProjectStore};
pub use viewer::{Display, SharedDisplay, Viewer};
