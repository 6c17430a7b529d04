//! UI events - terminal input decoded into viewer keys

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::viewer::{Key, KeySource};

/// Convert a key event to a viewer key. Releases and repeats are ignored.
pub fn decode_key(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Key::Interrupt),
            _ => Some(Key::Other),
        };
    }

    Some(match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    })
}

/// Blocking key source reading crossterm events
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_key(&mut self) -> Result<Key> {
        loop {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(key) = decode_key(key) {
                        return Ok(key);
                    }
                }
                // Redraw at the new size
                Event::Resize(_, _) => return Ok(Key::Other),
                _ => {}
            }
        }
    }
}
