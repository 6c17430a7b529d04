//! Selection menu painted on the viewer's surface

use anyhow::Result;

use crate::viewer::style::{BAR, CURSOR, DEFAULT, SCALAR};
use crate::viewer::{Breakpoints, Key, KeySource, Line, SharedDisplay};

/// A titled list of `(description, shortcut)` items
#[derive(Clone, Debug, Default)]
pub struct Menu {
    pub title: String,
    pub items: Vec<(String, char)>,
    /// Shown under the items when set
    pub instructions: Option<String>,
    pub selection: usize,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<(String, char)>) -> Self {
        Menu {
            title: title.into(),
            items,
            instructions: None,
            selection: 0,
        }
    }

    pub fn scroll_up(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selection = if self.selection == 0 {
            self.items.len() - 1
        } else {
            self.selection - 1
        };
    }

    pub fn scroll_down(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selection = (self.selection + 1) % self.items.len();
    }

    /// Item bound to `ch`. Blank shortcuts never match.
    pub fn shortcut(&self, ch: char) -> Option<usize> {
        let ch = ch.to_ascii_lowercase();
        if ch == ' ' {
            return None;
        }
        self.items.iter().position(|(_, shortcut)| *shortcut == ch)
    }

    pub fn lines(&self) -> Vec<Line> {
        let mut lines: Vec<Line> = self.title.lines().map(|row| Line::styled(row, BAR)).collect();
        lines.push(Line::new(""));
        for (idx, (desc, shortcut)) in self.items.iter().enumerate() {
            let mut line = Line::new(format!("> [{}] {}", shortcut, desc));
            let mut colors = Breakpoints::solid(DEFAULT);
            colors.insert_span(SCALAR, 3, 1);
            if idx == self.selection {
                colors.insert_span(CURSOR, 6, desc.chars().count());
            }
            line.colors = colors;
            line.row = idx;
            lines.push(line);
        }
        if let Some(instructions) = self.instructions.as_deref().filter(|s| !s.is_empty()) {
            lines.push(Line::new(""));
            lines.extend(instructions.lines().map(Line::new));
        }
        lines
    }

    /// Paint and react to keys until an item is chosen. Esc and Ctrl+C give None.
    pub fn wait_for_selection(
        &mut self,
        display: &SharedDisplay,
        input: &mut dyn KeySource,
    ) -> Result<Option<usize>> {
        loop {
            display.lock().draw_lines(&self.lines(), None);
            match input.next_key()? {
                Key::Up => self.scroll_up(),
                Key::Down => self.scroll_down(),
                Key::Esc | Key::Interrupt => return Ok(None),
                Key::Enter => return Ok(Some(self.selection)),
                Key::Char(ch) => {
                    if let Some(idx) = self.shortcut(ch) {
                        self.selection = idx;
                        return Ok(Some(idx));
                    }
                }
                _ => {}
            }
        }
    }
}

/// `0-9`, then letters without `q`, then blanks once those run out
pub fn shortcut_for(index: usize) -> char {
    crate::constants::SHORTCUT_CHARS
        .chars()
        .nth(index)
        .unwrap_or(' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::surface::testing::{MemorySurface, ScriptedKeys};

    fn menu() -> Menu {
        Menu::new(
            "Select a request:",
            vec![
                ("first".to_string(), '0'),
                ("second".to_string(), '1'),
                ("quit".to_string(), 'q'),
            ],
        )
    }

    #[test]
    fn test_selection_wraps() {
        let mut menu = menu();
        menu.scroll_up();
        assert_eq!(menu.selection, 2);
        menu.scroll_down();
        assert_eq!(menu.selection, 0);
    }

    #[test]
    fn test_shortcut_chars() {
        assert_eq!(shortcut_for(0), '0');
        assert_eq!(shortcut_for(10), 'a');
        assert_eq!(shortcut_for(26), 'r');
        assert_eq!(shortcut_for(100), ' ');
    }

    #[test]
    fn test_line_colors() {
        let mut menu = menu();
        menu.instructions = Some("hint".to_string());
        let lines = menu.lines();
        assert_eq!(lines[0].colors.style_at(0), BAR);
        assert_eq!(lines[2].text, "> [0] first");
        assert_eq!(lines[2].colors.style_at(3), SCALAR);
        assert_eq!(lines[2].colors.style_at(6), CURSOR);
        assert_eq!(lines[3].colors.style_at(6), DEFAULT);
        assert_eq!(lines.last().unwrap().text, "hint");
    }

    #[test]
    fn test_wait_for_selection() {
        let surface = MemorySurface::new(10, 30);
        let frame = surface.clone();
        let display = SharedDisplay::new(Box::new(surface));

        let mut menu = menu();
        let mut keys = ScriptedKeys::new(&[Key::Down, Key::Enter]);
        assert_eq!(menu.wait_for_selection(&display, &mut keys).unwrap(), Some(1));
        assert_eq!(frame.row_text(0).trim_end(), "Select a request:");
        assert_eq!(frame.style_at(3, 6), CURSOR);

        let mut keys = ScriptedKeys::new(&[Key::Char('Q')]);
        assert_eq!(menu.wait_for_selection(&display, &mut keys).unwrap(), Some(2));

        let mut keys = ScriptedKeys::new(&[Key::Char('z'), Key::Esc]);
        assert_eq!(menu.wait_for_selection(&display, &mut keys).unwrap(), None);
    }
}
