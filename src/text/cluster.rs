//! Line clustering: reassembles unordered OCR fragments into chat lines.
//!
//! Each fragment is anchored at the vertical midpoint of its left edge.  A
//! fragment joins the **first** existing group (in creation order) whose key
//! lies strictly within `threshold` of that anchor; otherwise it opens a new
//! group keyed at its own anchor.
//!
//! A group's key is taken from its first member and never moves as later
//! fragments join.
//!
//! All ordering goes through `f32::total_cmp` on an ordered `Vec`, so the same
//! input always produces byte-identical output.

use thiserror::Error;

use crate::ocr::TextFragment;

/// Default vertical distance under which two fragments share a line.
pub const DEFAULT_LINE_THRESHOLD: f32 = 15.0;

// ---------------------------------------------------------------------------
// MalformedFragment
// ---------------------------------------------------------------------------

/// Why a fragment could not be placed on a line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedFragment {
    #[error("polygon has {0} points, expected 4")]
    TooFewPoints(usize),

    #[error("polygon has a non-finite coordinate")]
    NonFinite,
}

// ---------------------------------------------------------------------------
// Anchor
// ---------------------------------------------------------------------------

/// Position data derived from a well-formed fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Midpoint height of the left edge (top-left and bottom-left corners).
    pub y_center: f32,
    /// Smallest x over the polygon.
    pub left: f32,
}

/// Validate `fragment` and compute its anchor.
pub fn anchor(fragment: &TextFragment) -> Result<Anchor, MalformedFragment> {
    let poly = &fragment.polygon;
    if poly.len() < 4 {
        return Err(MalformedFragment::TooFewPoints(poly.len()));
    }
    if poly.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(MalformedFragment::NonFinite);
    }

    let y_center = (poly[0].y + poly[3].y) / 2.0;
    let left = poly.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    Ok(Anchor { y_center, left })
}

// ---------------------------------------------------------------------------
// LineGroup
// ---------------------------------------------------------------------------

/// Fragments that were judged to sit on the same chat line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    /// Anchor height of the first member; fixed at creation.
    pub key: f32,
    members: Vec<(Anchor, TextFragment)>,
}

impl LineGroup {
    fn new(anchor: Anchor, fragment: TextFragment) -> Self {
        Self {
            key: anchor.y_center,
            members: vec![(anchor, fragment)],
        }
    }

    /// Members in the order they joined.
    pub fn fragments(&self) -> impl Iterator<Item = &TextFragment> {
        self.members.iter().map(|(_, f)| f)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The line text: members left to right, blank texts skipped, joined by a
    /// single space and trimmed.
    pub fn message(&self) -> String {
        let mut ordered: Vec<&(Anchor, TextFragment)> = self.members.iter().collect();
        // `sort_by` is stable, so equal x keeps input order.
        ordered.sort_by(|a, b| a.0.left.total_cmp(&b.0.left));

        ordered
            .iter()
            .map(|(_, f)| f.text.as_str())
            .filter(|t| !t.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// LineClusterer
// ---------------------------------------------------------------------------

/// Pure fragment → line grouping.
///
/// ```
/// use chat_translator::ocr::TextFragment;
/// use chat_translator::text::LineClusterer;
///
/// let fragments = vec![
///     TextFragment::from_box(80.0, 95.0, 30.0, 10.0, "there", 0.9),
///     TextFragment::from_box(0.0, 135.0, 30.0, 10.0, "bye", 0.9),
///     TextFragment::from_box(10.0, 97.0, 30.0, 10.0, "hi", 0.9),
/// ];
/// let lines = LineClusterer::default().cluster(&fragments);
/// assert_eq!(lines, vec!["hi there", "bye"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineClusterer {
    threshold: f32,
}

impl Default for LineClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_THRESHOLD)
    }
}

impl LineClusterer {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Group fragments into lines, sorted top to bottom.
    ///
    /// Malformed fragments are dropped and logged at debug level.
    pub fn group(&self, fragments: &[TextFragment]) -> Vec<LineGroup> {
        let mut groups: Vec<LineGroup> = Vec::new();

        for (i, fragment) in fragments.iter().enumerate() {
            let anchor = match anchor(fragment) {
                Ok(a) => a,
                Err(e) => {
                    log::debug!("cluster: dropping fragment {i} ({:?}): {e}", fragment.text);
                    continue;
                }
            };

            match groups
                .iter_mut()
                .find(|g| (g.key - anchor.y_center).abs() < self.threshold)
            {
                Some(group) => group.members.push((anchor, fragment.clone())),
                None => groups.push(LineGroup::new(anchor, fragment.clone())),
            }
        }

        groups.sort_by(|a, b| a.key.total_cmp(&b.key));
        groups
    }

    /// Group and render: one non-empty message per line, top to bottom.
    pub fn cluster(&self, fragments: &[TextFragment]) -> Vec<String> {
        self.group(fragments)
            .iter()
            .map(LineGroup::message)
            .filter(|m| !m.is_empty())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::Point;

    /// Fragment whose left edge midpoint sits at `y_center`.
    fn frag(x: f32, y_center: f32, text: &str) -> TextFragment {
        TextFragment::from_box(x, y_center - 5.0, 20.0, 10.0, text, 0.9)
    }

    #[test]
    fn anchor_uses_left_edge_midpoint() {
        let f = TextFragment::new(
            vec![
                Point::new(10.0, 100.0),
                Point::new(50.0, 90.0),
                Point::new(50.0, 130.0),
                Point::new(5.0, 110.0),
            ],
            "x",
            1.0,
        );
        let a = anchor(&f).unwrap();
        assert_eq!(a.y_center, 105.0);
        assert_eq!(a.left, 5.0);
    }

    #[test]
    fn anchor_rejects_short_and_non_finite_polygons() {
        let short = TextFragment::new(vec![Point::new(0.0, 0.0); 3], "x", 1.0);
        assert_eq!(anchor(&short), Err(MalformedFragment::TooFewPoints(3)));

        let mut nan = frag(0.0, 10.0, "x");
        nan.polygon[2].y = f32::NAN;
        assert_eq!(anchor(&nan), Err(MalformedFragment::NonFinite));
    }

    #[test]
    fn worked_example_clusters_into_two_lines() {
        let fragments = vec![
            frag(0.0, 100.0, "a"),
            frag(30.0, 102.0, "b"),
            frag(60.0, 108.0, "c"),
            frag(0.0, 140.0, "d"),
        ];
        let groups = LineClusterer::new(15.0).group(&fragments);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, 100.0);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].key, 140.0);
        assert_eq!(
            LineClusterer::new(15.0).cluster(&fragments),
            vec!["a b c", "d"]
        );
    }

    #[test]
    fn key_is_not_recentred_as_members_join() {
        // 100 → group A, 112 joins A (diff 12), 124 does NOT join A (diff 24)
        // even though it is within 15 of the 112 member.
        let fragments = vec![
            frag(0.0, 100.0, "one"),
            frag(10.0, 112.0, "two"),
            frag(20.0, 124.0, "three"),
        ];
        let groups = LineClusterer::new(15.0).group(&fragments);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, 100.0);
        assert_eq!(groups[1].key, 124.0);
    }

    #[test]
    fn first_matching_group_in_creation_order_wins() {
        // Groups created at 120 then 100; a fragment at 110 is within 15 of
        // both and must join 120, the older one.
        let fragments = vec![
            frag(0.0, 120.0, "first"),
            frag(0.0, 100.0, "second"),
            frag(50.0, 110.0, "joiner"),
        ];
        let groups = LineClusterer::new(15.0).group(&fragments);
        assert_eq!(groups[0].key, 100.0);
        assert_eq!(groups[0].len(), 1);
        assert_eq!(groups[1].key, 120.0);
        assert_eq!(groups[1].message(), "first joiner");
    }

    #[test]
    fn threshold_is_strict() {
        let fragments = vec![frag(0.0, 100.0, "a"), frag(0.0, 115.0, "b")];
        assert_eq!(LineClusterer::new(15.0).group(&fragments).len(), 2);
        assert_eq!(LineClusterer::new(15.5).group(&fragments).len(), 1);
    }

    #[test]
    fn lines_read_left_to_right_with_stable_ties() {
        let fragments = vec![
            frag(50.0, 100.0, "world"),
            frag(10.0, 101.0, "hello"),
            frag(50.0, 99.0, "again"),
        ];
        assert_eq!(
            LineClusterer::default().cluster(&fragments),
            vec!["hello world again"]
        );
    }

    #[test]
    fn malformed_fragments_are_dropped_silently() {
        let fragments = vec![
            TextFragment::new(vec![Point::new(0.0, 0.0)], "bad", 0.5),
            frag(0.0, 40.0, "good"),
        ];
        assert_eq!(LineClusterer::default().cluster(&fragments), vec!["good"]);
    }

    #[test]
    fn blank_lines_are_dropped_and_text_trimmed() {
        let fragments = vec![
            frag(0.0, 10.0, "   "),
            frag(0.0, 50.0, " padded "),
            frag(30.0, 50.0, ""),
        ];
        assert_eq!(LineClusterer::default().cluster(&fragments), vec!["padded"]);
    }

    #[test]
    fn clustering_is_deterministic() {
        let fragments: Vec<_> = (0..60)
            .map(|i| {
                let y = ((i * 37) % 200) as f32 + 0.3;
                let x = ((i * 53) % 300) as f32;
                frag(x, y, &format!("w{i}"))
            })
            .collect();
        let clusterer = LineClusterer::default();
        let first = clusterer.cluster(&fragments);
        for _ in 0..5 {
            assert_eq!(clusterer.cluster(&fragments), first);
        }
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(LineClusterer::default().cluster(&[]).is_empty());
    }
}
