//! Interactive structured-text viewer
//!
//! Pretty-printed JSON and plain text go in through [`Display`]; the viewer
//! recovers the JSON structure from the text layout, keeps per-line color
//! breakpoints, and lets the user scroll, collapse and expand the result.

pub mod annotate;
pub mod controller;
pub mod line;
pub mod render;
pub mod shared;
pub mod span;
pub mod style;
pub mod surface;
pub mod ticker;

pub use annotate::{annotate, pretty, AnnotateError};
pub use controller::{KeyOutcome, Mode, Viewer};
pub use line::{Entity, JsonAnnotation, JsonKind, Line};
pub use shared::{Display, SharedDisplay};
pub use span::Breakpoints;
pub use style::StyleId;
pub use surface::{Key, KeySource, Surface};
pub use ticker::Ticker;
