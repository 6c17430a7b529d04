//! Buffer lines and their JSON structure annotations

use std::ops::Range;

use crate::constants::OFFSET_STEP;
use crate::viewer::span::Breakpoints;
use crate::viewer::style::StyleId;

/// Structural kind of an annotated JSON line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonKind {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    /// `[]` or `{}` on a single line
    Empty,
    String,
    Number,
    Boolean,
    Null,
}

impl JsonKind {
    pub fn is_start(&self) -> bool {
        matches!(self, JsonKind::ObjectStart | JsonKind::ArrayStart)
    }

    pub fn is_end(&self) -> bool {
        matches!(self, JsonKind::ObjectEnd | JsonKind::ArrayEnd)
    }
}

/// Extra state carried by the first and last line of a multi-line object or array
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entity {
    /// Row of the other end of the entity
    pub pair: usize,
    /// Direct children, counted for arrays only
    pub child_count: usize,
    /// Only meaningful on start lines
    pub collapsed: bool,
}

/// Structural metadata for one line of pretty-printed JSON
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonAnnotation {
    pub kind: JsonKind,
    /// Character span of the quoted key, for `"key": value` lines
    pub key: Option<Range<usize>>,
    /// Character span of the value token, without a trailing comma
    pub value: Range<usize>,
    pub style: StyleId,
    /// Number of collapsed entities currently hiding this line
    pub hidden: usize,
    /// Present on start and end lines once the pair is known
    pub entity: Option<Entity>,
}

impl JsonAnnotation {
    pub fn is_collapsible(&self) -> bool {
        self.kind.is_start() && self.entity.is_some()
    }

    pub fn is_collapsed(&self) -> bool {
        self.is_collapsible() && self.entity.as_ref().is_some_and(|e| e.collapsed)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden > 0
    }

    /// Span highlighted when the cursor sits on this line
    pub fn cursor_span(&self) -> Option<Range<usize>> {
        match &self.key {
            Some(key) => Some(key.clone()),
            None if self.is_collapsible() => Some(self.value.clone()),
            None => None,
        }
    }

    pub(crate) fn shift(&mut self, by: usize) {
        if let Some(key) = &mut self.key {
            *key = key.start + by..key.end + by;
        }
        self.value = self.value.start + by..self.value.end + by;
    }
}

/// One row of the viewer buffer
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub colors: Breakpoints,
    pub json: Option<JsonAnnotation>,
    /// Position in the buffer, assigned on append
    pub row: usize,
    /// Characters elided from a long string value
    pub offset: usize,
}

impl Line {
    pub fn new(text: impl Into<String>) -> Self {
        Line {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn styled(text: impl Into<String>, style: StyleId) -> Self {
        Line {
            text: text.into(),
            colors: Breakpoints::solid(style),
            ..Default::default()
        }
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_hidden(&self) -> bool {
        self.json.as_ref().is_some_and(|j| j.is_hidden())
    }

    /// Whether structural-mode navigation may place the cursor here
    pub fn is_cursor_target(&self) -> bool {
        self.json
            .as_ref()
            .is_some_and(|j| !j.is_hidden() && (j.key.is_some() || j.is_collapsible()))
    }

    pub fn is_string_value(&self) -> bool {
        self.json.as_ref().is_some_and(|j| j.kind == JsonKind::String)
    }

    /// Elide another step of a long string, never past what fits on `width`
    /// columns and never past the string's own characters
    pub fn increase_offset(&mut self, width: usize) {
        let Some(json) = &self.json else {
            return;
        };
        let inner = json.value.len().saturating_sub(2);
        let cap = (self.len() + 3).saturating_sub(width).min(inner);
        self.offset = cap.min(self.offset + OFFSET_STEP);
    }

    pub fn decrease_offset(&mut self) {
        self.offset = self.offset.saturating_sub(OFFSET_STEP);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::style::SCALAR;

    fn string_line(len: usize) -> Line {
        let text = format!("\"{}\"", "x".repeat(len - 2));
        Line {
            json: Some(JsonAnnotation {
                kind: JsonKind::String,
                key: None,
                value: 0..len,
                style: SCALAR,
                hidden: 0,
                entity: None,
            }),
            ..Line::new(text)
        }
    }

    #[test]
    fn test_offset_is_capped_and_monotonic() {
        let mut line = string_line(200);
        let mut last = 0;
        for _ in 0..30 {
            line.increase_offset(80);
            assert!(line.offset >= last);
            last = line.offset;
        }
        assert_eq!(line.offset, 200 - 80 + 3);
    }

    #[test]
    fn test_offset_stops_at_string_end_behind_long_key() {
        let key = format!("\"{}\"", "k".repeat(100));
        let text = format!("{}: \"abcdefghijklmnopqrst\"", key);
        let value = key.len() + 2..text.len();
        let mut line = Line {
            json: Some(JsonAnnotation {
                kind: JsonKind::String,
                key: Some(0..key.len()),
                value,
                style: SCALAR,
                hidden: 0,
                entity: None,
            }),
            ..Line::new(text)
        };
        for _ in 0..6 {
            line.increase_offset(80);
        }
        assert_eq!(line.offset, 20);
    }

    #[test]
    fn test_offset_never_below_zero() {
        let mut line = string_line(200);
        line.increase_offset(80);
        line.decrease_offset();
        line.decrease_offset();
        assert_eq!(line.offset, 0);
    }

    #[test]
    fn test_short_string_has_no_offset() {
        let mut line = string_line(20);
        line.increase_offset(80);
        assert_eq!(line.offset, 0);
    }

    #[test]
    fn test_plain_line_is_not_a_cursor_target() {
        assert!(!Line::new("hello").is_cursor_target());
        assert!(!string_line(10).is_cursor_target());
    }
}
