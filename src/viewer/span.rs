//! Span & color engine - per-line style breakpoints
//!
//! A line's decoration is a sorted list of `(offset, style)` pairs. Each
//! style runs from its offset up to the next breakpoint (or the end of the
//! line). The first breakpoint is always at offset 0.

use crate::viewer::style::{StyleId, DEFAULT};

/// Sorted, non-overlapping style breakpoints covering one line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoints {
    points: Vec<(usize, StyleId)>,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::solid(DEFAULT)
    }
}

impl Breakpoints {
    /// A single style covering the whole line
    pub fn solid(style: StyleId) -> Self {
        Breakpoints {
            points: vec![(0, style)],
        }
    }

    pub fn as_slice(&self) -> &[(usize, StyleId)] {
        &self.points
    }

    /// Style in effect at `offset`
    pub fn style_at(&self, offset: usize) -> StyleId {
        self.points
            .iter()
            .take_while(|(start, _)| *start <= offset)
            .last()
            .map(|(_, style)| *style)
            .unwrap_or(DEFAULT)
    }

    /// Paint `[start, start + width)` with `style`, resuming whatever style was
    /// in effect at `start + width` afterwards.
    ///
    /// Breakpoints inside the span are dropped, so the span always wins over
    /// earlier insertions. Repeating the same call is a no-op.
    pub fn insert_span(&mut self, style: StyleId, start: usize, width: usize) {
        if width == 0 {
            return;
        }
        let end = start + width;
        let resumed = self.style_at(end);

        self.points.retain(|(offset, _)| *offset < start || *offset > end);
        let at = self.points.partition_point(|(offset, _)| *offset < start);
        self.points.insert(at, (start, style));
        self.points.insert(at + 1, (end, resumed));
        self.ensure_origin();
    }

    /// Rewrite every offset through `map`, keeping the list sorted. When
    /// several breakpoints land on the same offset the rightmost one wins.
    pub fn remap(&mut self, map: impl Fn(usize) -> usize) {
        let mut remapped: Vec<(usize, StyleId)> = Vec::with_capacity(self.points.len());
        for &(offset, style) in &self.points {
            let offset = map(offset);
            match remapped.last_mut() {
                Some(last) if last.0 >= offset => {
                    last.1 = style;
                }
                _ => remapped.push((offset, style)),
            }
        }
        self.points = remapped;
        self.ensure_origin();
    }

    /// Append another line's breakpoints, shifted right by `by` characters
    pub fn append_shifted(&mut self, other: &Breakpoints, by: usize) {
        self.points.retain(|(offset, _)| *offset < by);
        self.points
            .extend(other.points.iter().map(|(offset, style)| (offset + by, *style)));
    }

    /// Styled `[start, end)` runs clipped to `len`, skipping empty runs
    pub fn segments(&self, len: usize) -> impl Iterator<Item = (usize, usize, StyleId)> + '_ {
        self.points.iter().enumerate().filter_map(move |(i, &(start, style))| {
            let end = self
                .points
                .get(i + 1)
                .map(|(next, _)| *next)
                .unwrap_or(len)
                .min(len);
            (start < end).then_some((start, end, style))
        })
    }

    fn ensure_origin(&mut self) {
        if self.points.first().map_or(true, |(offset, _)| *offset > 0) {
            self.points.insert(0, (0, DEFAULT));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::style::{CURSOR, KEY, SCALAR};
    use proptest::prelude::*;

    fn is_valid(bp: &Breakpoints) -> bool {
        let points = bp.as_slice();
        points.first().map(|p| p.0) == Some(0) && points.windows(2).all(|w| w[0].0 < w[1].0)
    }

    #[test]
    fn test_insert_into_default() {
        let mut bp = Breakpoints::default();
        bp.insert_span(KEY, 4, 5);
        assert_eq!(bp.as_slice(), &[(0, DEFAULT), (4, KEY), (9, DEFAULT)]);
    }

    #[test]
    fn test_insert_resumes_previous_style() {
        let mut bp = Breakpoints::default();
        bp.insert_span(SCALAR, 10, 10);
        bp.insert_span(CURSOR, 12, 3);
        assert_eq!(
            bp.as_slice(),
            &[(0, DEFAULT), (10, SCALAR), (12, CURSOR), (15, SCALAR), (20, DEFAULT)]
        );
    }

    #[test]
    fn test_insert_replaces_breakpoint_at_start() {
        let mut bp = Breakpoints::default();
        bp.insert_span(KEY, 4, 5);
        bp.insert_span(CURSOR, 4, 5);
        assert_eq!(bp.as_slice(), &[(0, DEFAULT), (4, CURSOR), (9, DEFAULT)]);
    }

    #[test]
    fn test_zero_width_is_noop() {
        let mut bp = Breakpoints::default();
        bp.insert_span(KEY, 3, 0);
        assert_eq!(bp, Breakpoints::default());
    }

    #[test]
    fn test_remap_collapses_duplicates() {
        let mut bp = Breakpoints::default();
        bp.insert_span(KEY, 2, 2);
        bp.insert_span(SCALAR, 6, 4);
        bp.remap(|offset| if offset > 3 { 3.max(offset - 4) } else { offset });
        assert!(is_valid(&bp));
        assert_eq!(bp.style_at(3), SCALAR);
    }

    #[test]
    fn test_segments_clip_to_length() {
        let mut bp = Breakpoints::default();
        bp.insert_span(KEY, 2, 10);
        let segments: Vec<_> = bp.segments(5).collect();
        assert_eq!(segments, vec![(0, 2, DEFAULT), (2, 5, KEY)]);
    }

    proptest! {
        #[test]
        fn prop_insertions_keep_breakpoints_valid(
            spans in prop::collection::vec((1u8..10, 0usize..80, 0usize..20), 0..30)
        ) {
            let mut bp = Breakpoints::default();
            for (style, start, width) in spans {
                bp.insert_span(style, start, width);
                prop_assert!(is_valid(&bp));
                if width > 0 {
                    prop_assert_eq!(bp.style_at(start), style);
                    prop_assert_eq!(bp.style_at(start + width - 1), style);
                }
            }
        }

        #[test]
        fn prop_insert_is_idempotent(start in 0usize..50, width in 0usize..20) {
            let mut once = Breakpoints::default();
            once.insert_span(SCALAR, 5, 10);
            once.insert_span(KEY, start, width);
            let mut twice = once.clone();
            twice.insert_span(KEY, start, width);
            prop_assert_eq!(once, twice);
        }
    }
}
