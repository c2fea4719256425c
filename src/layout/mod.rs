//! Anchor layout engine
//!
//! Views are positioned by asserting that one of their anchors (an edge, a
//! center axis, or a corner) sits at a literal coordinate or at a value
//! computed from another view when the container lays out.

pub mod anchor;
pub mod assertion;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod tree;

pub use anchor::{Anchor, AnchorParseError, Axis, Basepoint, Baseline, ANCHOR_NAMES};
pub use assertion::{Assertion, Dynamic, Reference, Source};
pub use config::{DanglingPolicy, LayoutConfig};
pub use engine::{Diagnostic, LayoutEngine, PassReport, SharedEngine};
pub use error::LayoutError;
pub use geometry::Frame;
pub use tree::{
    AttachMode, LayoutParticipant, LayoutReport, NativeLayout, Participant, ViewFrames, ViewId,
    ViewTree,
};

/// Compute Levenshtein edit distance between two strings
pub(crate) fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Find names within a maximum edit distance, closest first
pub(crate) fn find_similar<'a>(
    names: impl IntoIterator<Item = &'a str>,
    target: &str,
    max_distance: usize,
) -> Vec<String> {
    let mut candidates: Vec<(&str, usize)> = names
        .into_iter()
        .filter_map(|name| {
            let dist = levenshtein_distance(name, target);
            (dist <= max_distance && dist > 0).then_some((name, dist))
        })
        .collect();

    candidates.sort_by_key(|(_, d)| *d);
    candidates
        .into_iter()
        .map(|(name, _)| name.to_string())
        .take(3)
        .collect()
}
