//! Network messages - what the Socket.IO task reports back to the viewer

use serde_json::Value;

use crate::viewer::style::STATUS_SERVER_ERROR;
use crate::viewer::Display;

/// Events observed on a Socket.IO connection, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Connecting { url: String },
    Connected,
    Emitting { event: String, data: Value },
    /// Server-sent event
    Event { name: String, data: Value },
    /// Acknowledgement of our emit
    Ack { data: Value },
    ConnectError { data: Value },
    Disconnected,
    /// Transport failure; the connection is gone
    Failed { error: String },
}

impl SocketEvent {
    /// Append this event to the viewer buffer as text plus JSON
    pub fn print_to(&self, display: &mut Display) {
        match self {
            SocketEvent::Connecting { url } => {
                display.print(&format!("\nConnecting to Socket.IO server at {}", url), false)
            }
            SocketEvent::Connected => display.print("\nSuccessfully connected to server", false),
            SocketEvent::Emitting { event, data } => {
                display.print(&format!("\nEmitting event {} with data:", event), false);
                display.print_value(data, false);
            }
            SocketEvent::Event { name, data } => {
                display.print(&format!("\nReceived event {} with data:", name), false);
                display.print_value(data, false);
            }
            SocketEvent::Ack { data } => {
                display.print("\nEmit received callback with data:", false);
                display.print_value(data, false);
            }
            SocketEvent::ConnectError { data } => {
                display.print("\nConnection failed with data:", false);
                display.print_value(data, false);
            }
            SocketEvent::Disconnected => display.print("\nDisconnected from server", false),
            SocketEvent::Failed { error } => {
                display.print("", false);
                display.print_styled(
                    &format!("Socket.IO error: {}", error),
                    STATUS_SERVER_ERROR,
                    false,
                );
            }
        }
    }
}
