//! Viewport/navigation controller
//!
//! Owns the line buffer, the collapse bookkeeping, scroll and cursor
//! positions, and the two navigation modes. Input keys become state changes
//! here; painting is delegated to the render engine.

use crate::constants::PAGE_SIZE;
use crate::viewer::annotate::{annotate, pretty};
use crate::viewer::line::Line;
use crate::viewer::render::draw_lines;
use crate::viewer::style::{StyleId, BAR};
use crate::viewer::surface::{Key, Surface};

/// Navigation mode of the viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Up/down scroll one row, left/right one page
    #[default]
    Scroll,
    /// Up/down move a cursor between keys and collapsible lines
    Json,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Scroll => "SCROLL",
            Mode::Json => "JSON",
        }
    }
}

/// What the browse loop should do after a key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Exit,
}

/// Scrollable, collapsible view over a buffer of annotated lines
#[derive(Debug, Default)]
pub struct Viewer {
    content: Vec<Line>,
    header: Line,
    footer: Line,
    mode: Mode,
    top_row: usize,
    bottom_row: usize,
    cursor_row: Option<usize>,
    /// Width of the last drawn frame, used to cap string offsets
    width: usize,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the buffer and reset scrolling, keeping header and footer
    pub fn start(&mut self) {
        self.content.clear();
        self.top_row = 0;
        self.bottom_row = 0;
        self.cursor_row = None;
        self.mode = Mode::Scroll;
    }

    pub fn lines(&self) -> &[Line] {
        &self.content
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn top_row(&self) -> usize {
        self.top_row
    }

    pub fn bottom_row(&self) -> usize {
        self.bottom_row
    }

    pub fn cursor_row(&self) -> Option<usize> {
        self.cursor_row
    }

    pub fn header(&self) -> &Line {
        &self.header
    }

    pub fn footer(&self) -> &Line {
        &self.footer
    }

    /// Number of lines not hidden by a collapsed entity
    pub fn visible_len(&self) -> usize {
        self.content.iter().filter(|l| !l.is_hidden()).count()
    }

    // ========================
    // Appending content
    // ========================

    /// Append plain text, one line per `\n`. With `merge`, the first line is
    /// joined onto the current last line instead of starting a new one.
    pub fn print(&mut self, text: &str, merge: bool) {
        self.print_styled(text, None, merge);
    }

    /// Append plain text painted in a single style
    pub fn print_styled(&mut self, text: &str, style: Option<StyleId>, merge: bool) {
        let mut new_lines = text
            .split('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .map(|s| match style {
                Some(style) => Line::styled(s, style),
                None => Line::new(s),
            });
        if merge {
            if let Some(last) = self.content.last_mut() {
                if let Some(first) = new_lines.next() {
                    let by = last.len();
                    last.text.push_str(&first.text);
                    last.colors.append_shifted(&first.colors, by);
                }
            }
        }
        for mut line in new_lines {
            line.row = self.content.len();
            self.content.push(line);
        }
    }

    /// Append pretty-printed JSON with structure annotations. Text that does
    /// not annotate cleanly is appended as plain lines.
    pub fn print_json(&mut self, text: &str, merge: bool) {
        // Only plain text can take a JSON tail, a line holds one annotation
        let merge = merge && self.content.last().is_some_and(|last| last.json.is_none());
        let first_row = if merge { self.content.len() - 1 } else { self.content.len() };

        let mut lines = match annotate(text, first_row) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "Appending malformed JSON as plain text");
                self.print(text, merge);
                return;
            }
        };

        if merge {
            if let (Some(prev), Some(first)) = (self.content.pop(), lines.first_mut()) {
                let by = prev.len();
                let mut colors = prev.colors.clone();
                colors.append_shifted(&first.colors, by);
                first.text = prev.text + &first.text;
                first.colors = colors;
                if let Some(json) = first.json.as_mut() {
                    json.shift(by);
                }
            }
        }
        self.content.append(&mut lines);
    }

    /// Serialize `value` and append it as annotated JSON
    pub fn print_value(&mut self, value: &serde_json::Value, merge: bool) {
        self.print_json(&pretty(value), merge);
    }

    pub fn set_header(&mut self, text: &str, merge: bool) {
        if merge {
            self.header.text.push_str(text);
        } else {
            self.header = Line::styled(text, BAR);
        }
    }

    pub fn set_footer(&mut self, text: &str, merge: bool) {
        if merge {
            self.footer.text.push_str(text);
        } else if text.is_empty() {
            self.footer = Line::default();
        } else {
            self.footer = Line::styled(text, BAR);
        }
    }

    pub fn set_footer_for_mode(&mut self) {
        let hint = match self.mode {
            Mode::Json => "use left/right arrows to collapse/expand elements",
            Mode::Scroll => "use left/right arrows to page up and down",
        };
        let text = format!("Navigation mode: {}, {}", self.mode.as_str(), hint);
        self.set_footer(&text, false);
    }

    // ========================
    // Drawing
    // ========================

    /// Buffer rows shown from `top_row` in `space` content rows
    fn layout(&self, space: usize) -> Vec<usize> {
        (self.top_row..self.content.len())
            .filter(|&idx| !self.content[idx].is_hidden())
            .take(space)
            .collect()
    }

    /// Paint header, visible content, `~` filler rows and footer
    pub fn draw(&mut self, surface: &mut dyn Surface) -> anyhow::Result<()> {
        let (height, width) = surface.size();
        self.width = width;
        let space = height.saturating_sub(2);

        let mut rows = self.layout(space);
        // Bring a cursor below the window into view
        if self.mode == Mode::Json {
            if let Some(cursor) = self.cursor_row {
                while space > 0
                    && rows.last().is_some_and(|&last| cursor > last)
                    && self.scroll_screen_down(1)
                {
                    rows = self.layout(space);
                }
            }
        }
        self.bottom_row = rows.last().copied().unwrap_or(self.top_row);

        let filler = Line::new("~");
        let mut lines: Vec<&Line> = Vec::with_capacity(height);
        lines.push(&self.header);
        lines.extend(rows.iter().map(|&idx| &self.content[idx]));
        lines.extend(std::iter::repeat(&filler).take(space - rows.len().min(space)));
        lines.push(&self.footer);

        let cursor = match self.mode {
            Mode::Json => self.cursor_row.and_then(|cursor| {
                rows.iter()
                    .position(|&idx| idx == cursor)
                    .filter(|_| self.content[cursor].is_cursor_target())
                    .map(|pos| pos + 1)
            }),
            Mode::Scroll => None,
        };

        draw_lines(surface, &lines, cursor);
        surface.refresh()
    }

    // ========================
    // Navigation
    // ========================

    /// Move the top of the window up by `n` visible rows
    pub fn scroll_screen_up(&mut self, n: usize) -> bool {
        let start = self.top_row;
        for _ in 0..n {
            match (0..self.top_row).rev().find(|&i| !self.content[i].is_hidden()) {
                Some(row) => self.top_row = row,
                None => break,
            }
        }
        self.top_row != start
    }

    /// Move the top of the window down by `n` visible rows
    pub fn scroll_screen_down(&mut self, n: usize) -> bool {
        let start = self.top_row;
        for _ in 0..n {
            match (self.top_row + 1..self.content.len()).find(|&i| !self.content[i].is_hidden()) {
                Some(row) => self.top_row = row,
                None => break,
            }
        }
        self.top_row != start
    }

    pub fn scroll_json_up(&mut self) {
        let Some(cursor) = self.cursor_row else { return };
        match (0..cursor).rev().find(|&i| self.content[i].is_cursor_target()) {
            Some(row) => self.cursor_row = Some(row),
            None => {
                self.scroll_screen_up(1);
            }
        }
        if let Some(cursor) = self.cursor_row {
            if cursor < self.top_row {
                self.top_row = cursor;
            }
        }
    }

    /// The window catches up with the cursor on the next draw
    pub fn scroll_json_down(&mut self) {
        let Some(cursor) = self.cursor_row else { return };
        match (cursor + 1..self.content.len()).find(|&i| self.content[i].is_cursor_target()) {
            Some(row) => self.cursor_row = Some(row),
            None => {
                self.scroll_screen_down(1);
            }
        }
    }

    /// Switch between scroll and structural mode. Entering structural mode
    /// re-anchors a cursor that is off screen; with nothing to anchor to the
    /// switch is refused.
    pub fn cycle_mode(&mut self) -> bool {
        match self.mode {
            Mode::Scroll => {
                let in_view = self.cursor_row.is_some_and(|c| {
                    c >= self.top_row && c <= self.bottom_row && self.content[c].is_cursor_target()
                });
                if !in_view {
                    let anchor = (self.top_row..self.content.len())
                        .find(|&i| self.content[i].is_cursor_target());
                    match anchor {
                        Some(row) => self.cursor_row = Some(row),
                        None => return false,
                    }
                }
                self.mode = Mode::Json;
            }
            Mode::Json => self.mode = Mode::Scroll,
        }
        self.set_footer_for_mode();
        true
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Collapse or expand the entity starting on `row`. Returns whether
    /// anything changed.
    pub fn set_collapsed(&mut self, row: usize, collapsed: bool) -> bool {
        let Some(json) = self.content.get_mut(row).and_then(|l| l.json.as_mut()) else {
            return false;
        };
        if !json.is_collapsible() {
            return false;
        }
        let Some(entity) = json.entity.as_mut() else { return false };
        if entity.collapsed == collapsed {
            return false;
        }
        entity.collapsed = collapsed;
        let end = entity.pair.min(self.content.len().saturating_sub(1));

        for line in &mut self.content[row + 1..=end] {
            if let Some(json) = line.json.as_mut() {
                json.hidden = if collapsed {
                    json.hidden + 1
                } else {
                    json.hidden.saturating_sub(1)
                };
            }
        }
        if collapsed && self.top_row > row && self.top_row <= end {
            self.top_row = row;
        }
        true
    }

    /// Apply one key. `Enter`, `Esc`, `q` and Ctrl+C end browsing.
    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        match (key, self.mode) {
            (Key::Enter | Key::Esc | Key::Char('q') | Key::Interrupt, _) => return KeyOutcome::Exit,
            (Key::Space, _) => {
                self.cycle_mode();
            }
            (Key::Up, Mode::Json) => self.scroll_json_up(),
            (Key::Down, Mode::Json) => self.scroll_json_down(),
            (Key::Up, Mode::Scroll) => {
                self.scroll_screen_up(1);
            }
            (Key::Down, Mode::Scroll) => {
                self.scroll_screen_down(1);
            }
            (Key::Left, Mode::Scroll) => {
                self.scroll_screen_up(PAGE_SIZE);
            }
            (Key::Right, Mode::Scroll) => {
                self.scroll_screen_down(PAGE_SIZE);
            }
            (Key::Left | Key::Right, Mode::Json) => {
                let Some(row) = self.cursor_row.filter(|&r| r < self.content.len()) else {
                    return KeyOutcome::Continue;
                };
                let width = self.width;
                let line = &mut self.content[row];
                match (key, line.is_string_value()) {
                    (Key::Left, true) => line.decrease_offset(),
                    (Key::Right, true) => line.increase_offset(width),
                    (Key::Left, false) => {
                        self.set_collapsed(row, true);
                    }
                    _ => {
                        self.set_collapsed(row, false);
                    }
                }
            }
            _ => {}
        }
        KeyOutcome::Continue
    }
}
