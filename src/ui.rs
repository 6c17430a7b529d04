use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::viewer::style::{self, StyleId};
use crate::viewer::Surface;

/// Terminal palette for a viewer style id
pub fn style_for(id: StyleId) -> Style {
    match id {
        style::CURSOR => Style::default().fg(Color::Black).bg(Color::White),
        style::SCALAR => Style::default().fg(Color::Magenta),
        style::BAR => Style::default().fg(Color::White).bg(Color::Blue),
        style::MARKER => Style::default().fg(Color::Blue),
        style::KEY => Style::default().fg(Color::Cyan),
        style::BRACKET => Style::default().fg(Color::Green),
        style::SUMMARY => Style::default().fg(Color::Yellow),
        style::STATUS_OK => Style::default().fg(status_color(200)).bold(),
        style::STATUS_REDIRECT => Style::default().fg(status_color(300)).bold(),
        style::STATUS_CLIENT_ERROR => Style::default().fg(status_color(400)).bold(),
        style::STATUS_SERVER_ERROR => Style::default().fg(status_color(500)).bold(),
        _ => Style::default().fg(Color::White),
    }
}

/// Status code color
pub fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=499 => Color::Red,
        500..=599 => Color::Magenta,
        _ => Color::Yellow,
    }
}

/// Restores the terminal when dropped
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)
            .context("entering alternate screen")?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
    }
}

/// Ratatui-backed [`Surface`]. Writes are buffered until `refresh`.
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pending: Vec<(usize, usize, String, StyleId)>,
}

impl TerminalSurface {
    pub fn new() -> Result<Self> {
        let terminal =
            Terminal::new(CrosstermBackend::new(io::stdout())).context("creating terminal")?;
        Ok(TerminalSurface {
            terminal,
            pending: Vec::new(),
        })
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> (usize, usize) {
        self.terminal
            .size()
            .map(|size| (size.height as usize, size.width as usize))
            .unwrap_or((24, 80))
    }

    fn erase(&mut self) {
        self.pending.clear();
    }

    fn put_str(&mut self, row: usize, col: usize, text: &str, style: StyleId) {
        self.pending.push((row, col, text.to_string(), style));
    }

    fn refresh(&mut self) -> Result<()> {
        let pending = &self.pending;
        self.terminal.draw(|frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();
            for (row, col, text, id) in pending {
                if *row >= area.height as usize || *col >= area.width as usize {
                    continue;
                }
                buf.set_string(*col as u16, *row as u16, text, style_for(*id));
            }
        })?;
        Ok(())
    }
}
