//! Application constants
//!
//! Centralized location for magic strings and tuning values.

use std::time::Duration;

/// Name of the project definition file inside a project directory
pub const PROJECT_FILE: &str = "project.json";

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "apiwalk.log";

/// Indentation used when pretty-printing JSON for the viewer
pub const JSON_INDENT: usize = 4;

/// Rows moved by left/right in plain-scroll mode
pub const PAGE_SIZE: usize = 30;

/// Characters elided per left/right step on a long string value
pub const OFFSET_STEP: usize = 10;

/// Interval between progress dots while a request is outstanding
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Upper bound on the Socket.IO close handshake when browsing ends
pub const SOCKET_DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shortcut characters assigned to menu entries, in order. `q` is reserved.
pub const SHORTCUT_CHARS: &str = "0123456789abcdefghijklmnoprstuvwxyz";

/// Application name
pub const APP_NAME: &str = "apiwalk";
