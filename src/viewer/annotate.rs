//! Structural annotator - recovers JSON structure from pretty-printed text
//!
//! The input is JSON already serialized with a fixed indent per level. Each
//! physical line becomes one [`Line`] tagged with its kind, key and value
//! spans. Opening brackets are matched to their closing line with a stack that
//! only lives for the duration of the call; the resulting links are plain row
//! indices into the buffer.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::constants::JSON_INDENT;
use crate::viewer::line::{Entity, JsonAnnotation, JsonKind, Line};
use crate::viewer::style::{BRACKET, KEY, SCALAR};

/// Input that could not have come from a well-formed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotateError {
    /// A closing bracket with no open entity
    Unbalanced { row: usize },
    /// Input ended with the entity opened on `row` still open
    Unclosed { row: usize },
}

impl fmt::Display for AnnotateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotateError::Unbalanced { row } => {
                write!(f, "unmatched closing bracket on row {}", row)
            }
            AnnotateError::Unclosed { row } => {
                write!(f, "entity opened on row {} is never closed", row)
            }
        }
    }
}

impl std::error::Error for AnnotateError {}

fn key_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*("(?:[^"\\]|\\.)*")\s?:\s?(.*?)\s*$"#)
            .expect("key-value pattern is valid")
    })
}

/// Serialize `value` the way the annotator expects to read it back
pub fn pretty(value: &impl Serialize) -> String {
    let indent = " ".repeat(JSON_INDENT);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    if value.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

fn indentation(text: &str) -> usize {
    text.chars().take_while(|c| c.is_whitespace()).count()
}

/// Annotate `text`, numbering the produced lines from `first_row`.
///
/// On error nothing is returned, so the caller's buffer is untouched.
pub fn annotate(text: &str, first_row: usize) -> Result<Vec<Line>, AnnotateError> {
    let mut lines: Vec<Line> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let row = first_row + i;
        let mut line = Line::new(raw);
        line.row = row;

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            lines.push(line);
            continue;
        }

        let key_value = key_value_re()
            .captures(raw)
            .and_then(|caps| caps.get(1).zip(caps.get(2)));
        let (key, mut value) = match key_value {
            Some((k, v)) => {
                (
                    Some(char_offset(raw, k.start())..char_offset(raw, k.end())),
                    char_offset(raw, v.start())..char_offset(raw, v.end()),
                )
            }
            None => {
                let start = indentation(raw);
                (None, start..start + trimmed.chars().count())
            }
        };

        let mut token: String = raw.chars().skip(value.start).take(value.len()).collect();
        if token.ends_with(',') {
            token.pop();
            value.end -= 1;
        }
        if token.is_empty() {
            lines.push(line);
            continue;
        }

        let (kind, entity) = match token.as_str() {
            "[" => {
                stack.push(row);
                (JsonKind::ArrayStart, None)
            }
            "{" => {
                stack.push(row);
                (JsonKind::ObjectStart, None)
            }
            "]" | "}" => {
                let start = stack.pop().ok_or(AnnotateError::Unbalanced { row })?;
                let is_array = token == "]";
                let start_line = &lines[start - first_row];
                let child_count = if is_array {
                    count_children(&lines[start - first_row + 1..], indentation(&start_line.text))
                } else {
                    0
                };
                if let Some(json) = lines[start - first_row].json.as_mut() {
                    json.entity = Some(Entity {
                        pair: row,
                        child_count,
                        collapsed: false,
                    });
                }
                let kind = if is_array { JsonKind::ArrayEnd } else { JsonKind::ObjectEnd };
                (
                    kind,
                    Some(Entity {
                        pair: start,
                        ..Default::default()
                    }),
                )
            }
            "[]" | "{}" => (JsonKind::Empty, None),
            "null" => (JsonKind::Null, None),
            "true" | "false" => (JsonKind::Boolean, None),
            t if t.len() >= 2 && t.starts_with('"') && t.ends_with('"') => (JsonKind::String, None),
            _ => (JsonKind::Number, None),
        };

        let style = match kind {
            JsonKind::ObjectStart
            | JsonKind::ObjectEnd
            | JsonKind::ArrayStart
            | JsonKind::ArrayEnd
            | JsonKind::Empty => BRACKET,
            _ => SCALAR,
        };

        line.colors.insert_span(style, value.start, value.len());
        if let Some(key) = &key {
            line.colors.insert_span(KEY, key.start, key.len());
        }
        line.json = Some(JsonAnnotation {
            kind,
            key,
            value,
            style,
            hidden: 0,
            entity,
        });
        lines.push(line);
    }

    match stack.first() {
        Some(&row) => Err(AnnotateError::Unclosed { row }),
        None => Ok(lines),
    }
}

/// Count lines one level deeper than `indent`, ignoring closing brackets
fn count_children(lines: &[Line], indent: usize) -> usize {
    lines
        .iter()
        .filter(|line| {
            let trimmed = line.text.trim_start();
            !trimmed.is_empty()
                && !trimmed.starts_with(']')
                && !trimmed.starts_with('}')
                && indentation(&line.text) == indent + JSON_INDENT
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn kinds(lines: &[Line]) -> Vec<Option<JsonKind>> {
        lines.iter().map(|l| l.json.as_ref().map(|j| j.kind)).collect()
    }

    fn assert_pairs_are_mutual(lines: &[Line], first_row: usize) {
        for line in lines {
            let Some(json) = &line.json else { continue };
            if json.kind.is_start() || json.kind.is_end() {
                let entity = json.entity.as_ref().expect("entity is linked");
                let other = lines[entity.pair - first_row].json.as_ref().unwrap();
                assert_eq!(other.entity.as_ref().unwrap().pair, line.row);
            }
        }
    }

    #[test]
    fn test_object_with_array() {
        let text = pretty(&json!({"a": 1, "b": [1, 2, 3]}));
        let lines = annotate(&text, 0).unwrap();

        assert_eq!(
            kinds(&lines),
            vec![
                Some(JsonKind::ObjectStart),
                Some(JsonKind::Number),
                Some(JsonKind::ArrayStart),
                Some(JsonKind::Number),
                Some(JsonKind::Number),
                Some(JsonKind::Number),
                Some(JsonKind::ArrayEnd),
                Some(JsonKind::ObjectEnd),
            ]
        );

        let a = lines[1].json.as_ref().unwrap();
        assert_eq!(lines[1].text, r#"    "a": 1,"#);
        assert_eq!(a.key, Some(4..7));
        assert_eq!(a.value, 9..10);

        let b = lines[2].json.as_ref().unwrap();
        assert!(b.key.is_some());
        let entity = b.entity.as_ref().unwrap();
        assert_eq!(entity.child_count, 3);
        assert_eq!(entity.pair, 6);
        assert!(lines[3].json.as_ref().unwrap().key.is_none());

        assert_eq!(lines[6].json.as_ref().unwrap().entity.as_ref().unwrap().pair, 2);
        assert_pairs_are_mutual(&lines, 0);
    }

    #[test]
    fn test_rows_start_at_offset() {
        let text = pretty(&json!([{"x": true}]));
        let lines = annotate(&text, 10).unwrap();
        assert_eq!(lines[0].row, 10);
        assert_eq!(lines[0].json.as_ref().unwrap().entity.as_ref().unwrap().pair, 14);
        assert_pairs_are_mutual(&lines, 10);
    }

    #[test]
    fn test_child_count_ignores_nesting() {
        let text = pretty(&json!([[1, 2], {"k": [3]}, "s", null, []]));
        let lines = annotate(&text, 0).unwrap();
        let root = lines[0].json.as_ref().unwrap().entity.as_ref().unwrap();
        assert_eq!(root.child_count, 5);
    }

    #[test]
    fn test_scalar_kinds_and_colors() {
        let text = pretty(&json!({"s": "v", "n": null, "t": false, "e": {}}));
        let lines = annotate(&text, 0).unwrap();
        assert_eq!(lines[1].json.as_ref().unwrap().kind, JsonKind::String);
        assert_eq!(lines[2].json.as_ref().unwrap().kind, JsonKind::Null);
        assert_eq!(lines[3].json.as_ref().unwrap().kind, JsonKind::Boolean);
        assert_eq!(lines[4].json.as_ref().unwrap().kind, JsonKind::Empty);

        let s = &lines[1];
        assert_eq!(s.colors.style_at(4), KEY);
        assert_eq!(s.colors.style_at(9), SCALAR);
    }

    #[test]
    fn test_escaped_quote_in_key() {
        let text = pretty(&json!({"a\"b": "c"}));
        let lines = annotate(&text, 0).unwrap();
        let json = lines[1].json.as_ref().unwrap();
        assert_eq!(json.kind, JsonKind::String);
        assert_eq!(json.key, Some(4..10));
    }

    #[test]
    fn test_non_ascii_offsets_are_characters() {
        let text = pretty(&json!({"ключ": "значение"}));
        let lines = annotate(&text, 0).unwrap();
        let json = lines[1].json.as_ref().unwrap();
        assert_eq!(json.key, Some(4..10));
        assert_eq!(json.value, 12..22);
    }

    #[test]
    fn test_blank_lines_are_left_plain() {
        let lines = annotate("[\n\n    1\n]", 0).unwrap();
        assert!(lines[1].json.is_none());
        let root = lines[0].json.as_ref().unwrap().entity.as_ref().unwrap();
        assert_eq!(root.pair, 3);
        assert_eq!(root.child_count, 1);
    }

    #[test]
    fn test_unbalanced_input_is_rejected() {
        assert_eq!(annotate("1\n]", 0), Err(AnnotateError::Unbalanced { row: 1 }));
        assert_eq!(annotate("{\n    \"a\": [", 3), Err(AnnotateError::Unclosed { row: 3 }));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z ,:\\[\\]{}\"]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 5, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..5)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn count_containers(value: &Value) -> usize {
        match value {
            Value::Array(items) if !items.is_empty() => {
                1 + items.iter().map(count_containers).sum::<usize>()
            }
            Value::Object(map) if !map.is_empty() => {
                1 + map.values().map(count_containers).sum::<usize>()
            }
            _ => 0,
        }
    }

    proptest! {
        #[test]
        fn prop_every_start_has_a_mutual_end(value in arb_json()) {
            let lines = annotate(&pretty(&value), 0).unwrap();
            let kinds: Vec<JsonKind> =
                lines.iter().filter_map(|l| l.json.as_ref().map(|j| j.kind)).collect();
            let starts = kinds.iter().filter(|k| k.is_start()).count();
            let ends = kinds.iter().filter(|k| k.is_end()).count();
            prop_assert_eq!(starts, count_containers(&value));
            prop_assert_eq!(ends, starts);
            assert_pairs_are_mutual(&lines, 0);
        }

        #[test]
        fn prop_array_child_count_matches_length(
            items in prop::collection::vec(arb_json(), 1..8)
        ) {
            let lines = annotate(&pretty(&Value::Array(items.clone())), 0).unwrap();
            let root = lines[0].json.as_ref().unwrap().entity.as_ref().unwrap();
            prop_assert_eq!(root.child_count, items.len());
        }
    }
}
