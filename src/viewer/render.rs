//! Render engine - turns buffer lines into styled screen writes
//!
//! Every draw-time effect (collapse summaries, running array counts, string
//! elision, truncation, padding, the cursor) is applied to a throwaway copy of
//! the line's text and breakpoints. The stored [`Line`] is never touched.

use crate::viewer::line::{JsonKind, Line};
use crate::viewer::span::Breakpoints;
use crate::viewer::style::{CURSOR, MARKER, SUMMARY};
use crate::viewer::surface::Surface;

/// Marker used both for elided string content and truncated lines
pub const ELLIPSIS_MARKER: &str = "[…]";
const MARKER_LEN: usize = 3;

/// A line ready to paint: exactly `width` characters plus their styles
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: Vec<char>,
    pub colors: Breakpoints,
}

impl RenderedLine {
    pub fn as_string(&self) -> String {
        self.text.iter().collect()
    }
}

/// Lay out `line` for a row `width` cells wide
pub fn render_line(line: &Line, width: usize, with_cursor: bool) -> RenderedLine {
    let mut text: Vec<char> = line.text.chars().collect();
    let mut colors = line.colors.clone();

    if let Some(json) = &line.json {
        if let Some(entity) = json.entity.as_ref().filter(|_| json.kind.is_start()) {
            let at = json.value.start.min(text.len());
            if entity.collapsed {
                let summary = match json.kind {
                    JsonKind::ArrayStart => format!("[ … count: {} ]", entity.child_count),
                    _ => "{ … }".to_string(),
                };
                let len = summary.chars().count();
                text.truncate(at);
                text.extend(summary.chars());
                colors.insert_span(SUMMARY, at + 2, len - 4);
                colors.insert_span(json.style, at + len - 1, 1);
            } else if json.kind == JsonKind::ArrayStart {
                let running = format!("[ count: {}", entity.child_count);
                let len = running.chars().count();
                text.truncate(at);
                text.extend(running.chars());
                colors.insert_span(SUMMARY, at + 1, len - 1);
            }
        }

        if json.kind == JsonKind::String && line.offset > 0 {
            let start = (json.value.start + 1).min(text.len());
            let closing = json.value.end.saturating_sub(1).max(start);
            let end = (start + line.offset).min(closing).min(text.len());
            let elided = end - start;
            text.splice(start..end, ELLIPSIS_MARKER.chars());
            colors.remap(|offset| {
                if offset <= start {
                    offset
                } else if offset < end {
                    start + MARKER_LEN
                } else {
                    offset - elided + MARKER_LEN
                }
            });
            colors.insert_span(MARKER, start, MARKER_LEN);
        }
    }

    if text.len() > width {
        if width >= MARKER_LEN {
            text.truncate(width - MARKER_LEN);
            text.extend(ELLIPSIS_MARKER.chars());
            colors.insert_span(MARKER, width - MARKER_LEN, MARKER_LEN);
        } else {
            text.truncate(width);
        }
    }
    text.resize(width, ' ');

    if with_cursor {
        if let Some(span) = line.json.as_ref().and_then(|j| j.cursor_span()) {
            colors.insert_span(CURSOR, span.start, span.len());
        }
    }

    RenderedLine { text, colors }
}

/// Write a rendered line to `row`, clipped to its width
pub fn paint(surface: &mut dyn Surface, row: usize, rendered: &RenderedLine) {
    for (start, end, style) in rendered.colors.segments(rendered.text.len()) {
        let run: String = rendered.text[start..end].iter().collect();
        surface.put_str(row, start, &run, style);
    }
}

/// Erase the surface and paint `lines` from the top. `cursor` is an index
/// into `lines`, not a buffer row.
pub fn draw_lines(surface: &mut dyn Surface, lines: &[&Line], cursor: Option<usize>) {
    let (height, width) = surface.size();
    surface.erase();
    for (idx, line) in lines.iter().take(height).enumerate() {
        let rendered = render_line(line, width, cursor == Some(idx));
        paint(surface, idx, &rendered);
    }
}
