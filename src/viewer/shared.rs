//! Shared display - the viewer and its surface behind one lock
//!
//! Background writers (the progress ticker, the Socket.IO client) and the
//! foreground browse loop all go through [`SharedDisplay::lock`]. Every append
//! redraws while the lock is held, so appends and full-screen paints never
//! interleave. The browse loop releases the lock while it blocks on input.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;

use crate::viewer::controller::{KeyOutcome, Mode, Viewer};
use crate::viewer::line::Line;
use crate::viewer::render::draw_lines;
use crate::viewer::style::StyleId;
use crate::viewer::surface::{KeySource, Surface};

/// Header shown while browsing
pub const BROWSE_HEADER: &str = "ENTER or ESC to return to menu, SPACE to swap modes";

/// A viewer bound to the surface it paints on
pub struct Display {
    viewer: Viewer,
    surface: Box<dyn Surface + Send>,
}

impl Display {
    pub fn new(surface: Box<dyn Surface + Send>) -> Self {
        Display {
            viewer: Viewer::new(),
            surface,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer {
        &mut self.viewer
    }

    /// Start a fresh buffer for the next request
    pub fn start(&mut self) {
        self.viewer.start();
    }

    pub fn print(&mut self, text: &str, merge: bool) {
        self.viewer.print(text, merge);
        self.draw();
    }

    pub fn print_styled(&mut self, text: &str, style: StyleId, merge: bool) {
        self.viewer.print_styled(text, Some(style), merge);
        self.draw();
    }

    pub fn print_json(&mut self, text: &str, merge: bool) {
        self.viewer.print_json(text, merge);
        self.draw();
    }

    pub fn print_value(&mut self, value: &serde_json::Value, merge: bool) {
        self.viewer.print_value(value, merge);
        self.draw();
    }

    pub fn set_header(&mut self, text: &str) {
        self.viewer.set_header(text, false);
    }

    pub fn set_footer(&mut self, text: &str) {
        self.viewer.set_footer(text, false);
    }

    /// Repaint the viewer. Paint failures are logged, never surfaced.
    pub fn draw(&mut self) {
        if let Err(e) = self.viewer.draw(self.surface.as_mut()) {
            tracing::warn!(error = %e, "Failed to draw viewer");
        }
    }

    /// Paint arbitrary lines (menus) on the same surface
    pub fn draw_lines(&mut self, lines: &[Line], cursor: Option<usize>) {
        let refs: Vec<&Line> = lines.iter().collect();
        draw_lines(self.surface.as_mut(), &refs, cursor);
        if let Err(e) = self.surface.refresh() {
            tracing::warn!(error = %e, "Failed to draw lines");
        }
    }
}

/// Cloneable handle to a [`Display`] shared with background threads
#[derive(Clone)]
pub struct SharedDisplay {
    inner: Arc<Mutex<Display>>,
}

impl SharedDisplay {
    pub fn new(surface: Box<dyn Surface + Send>) -> Self {
        SharedDisplay {
            inner: Arc::new(Mutex::new(Display::new(surface))),
        }
    }

    /// Lock the display. A writer that panicked mid-append leaves the buffer
    /// structurally valid, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, Display> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the navigation loop until the user asks to leave
    pub fn browse(&self, input: &mut dyn KeySource) -> Result<()> {
        {
            let mut display = self.lock();
            display.set_header(BROWSE_HEADER);
            let viewer = display.viewer_mut();
            viewer.set_mode(Mode::Scroll);
            viewer.set_footer_for_mode();
        }

        loop {
            self.lock().draw();
            let key = input.next_key()?;
            if self.lock().viewer_mut().handle_key(key) == KeyOutcome::Exit {
                break;
            }
        }
        Ok(())
    }
}
