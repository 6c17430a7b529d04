//! Screen and keyboard abstractions consumed by the viewer
//!
//! The viewer never talks to a terminal directly. It writes styled runs to a
//! [`Surface`] and reads decoded [`Key`]s from a [`KeySource`]; `ui.rs` and
//! `messages::ui_events` provide the crossterm-backed implementations.

use anyhow::Result;

use crate::viewer::style::StyleId;

/// A screen that accepts `(row, column, text, style)` writes
pub trait Surface {
    /// `(height, width)` in cells
    fn size(&self) -> (usize, usize);

    /// Discard everything written since the last refresh
    fn erase(&mut self);

    fn put_str(&mut self, row: usize, col: usize, text: &str, style: StyleId);

    /// Make the written frame visible
    fn refresh(&mut self) -> Result<()>;
}

/// Keys the viewer and menus react to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Space,
    Backspace,
    Char(char),
    /// Ctrl+C
    Interrupt,
    /// Resize or an unmapped key; only triggers a redraw
    Other,
}

/// Blocking source of decoded keys
pub trait KeySource {
    fn next_key(&mut self) -> Result<Key>;
}
