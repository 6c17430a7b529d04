//! Style ids used by the viewer. The terminal palette for each id lives in `ui.rs`.

pub type StyleId = u8;

/// Plain text
pub const DEFAULT: StyleId = 1;
/// Cursor highlight in structural mode, selected menu entry
pub const CURSOR: StyleId = 2;
/// Scalar JSON values
pub const SCALAR: StyleId = 3;
/// Header and footer bars
pub const BAR: StyleId = 4;
/// Truncation and elision markers
pub const MARKER: StyleId = 5;
/// Object keys
pub const KEY: StyleId = 7;
/// Brackets of objects and arrays
pub const BRACKET: StyleId = 8;
/// Collapse summaries and running array counts
pub const SUMMARY: StyleId = 9;
/// 2xx status codes
pub const STATUS_OK: StyleId = 10;
/// 3xx status codes
pub const STATUS_REDIRECT: StyleId = 11;
/// 4xx status codes
pub const STATUS_CLIENT_ERROR: StyleId = 12;
/// 5xx status codes and transport failures
pub const STATUS_SERVER_ERROR: StyleId = 13;

/// Style for an HTTP status line
pub fn status_style(code: Option<u16>) -> StyleId {
    match code {
        Some(200..=299) => STATUS_OK,
        Some(300..=399) => STATUS_REDIRECT,
        Some(400..=499) => STATUS_CLIENT_ERROR,
        _ => STATUS_SERVER_ERROR,
    }
}
