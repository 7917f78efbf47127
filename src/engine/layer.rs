//! One vertical lane of placed comments.

use crate::model::Comment;
use std::collections::VecDeque;

/// Which of the two lanes.
///
/// The lane count is fixed: one lane keeps accepting new comments while the
/// other drains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerIndex {
    /// Lane 0.
    #[default]
    First,
    /// Lane 1.
    Second,
}

impl LayerIndex {
    /// Both lanes, in projection order.
    pub const ALL: [LayerIndex; 2] = [LayerIndex::First, LayerIndex::Second];

    /// The opposite lane.
    pub fn other(self) -> Self {
        match self {
            LayerIndex::First => LayerIndex::Second,
            LayerIndex::Second => LayerIndex::First,
        }
    }

    /// Numeric index (0 or 1).
    pub fn index(self) -> usize {
        match self {
            LayerIndex::First => 0,
            LayerIndex::Second => 1,
        }
    }
}

/// A comment that has been measured and given a vertical offset.
///
/// # Invariants
/// - `height >= 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedComment {
    comment: Comment,
    top: u16,
    height: u16,
}

impl PlacedComment {
    /// Only the engine creates placements, after rejecting zero heights.
    pub(crate) fn new(comment: Comment, top: u16, height: u16) -> Self {
        debug_assert!(height > 0, "placed comments have positive extent");
        Self {
            comment,
            top,
            height,
        }
    }

    /// The placed comment.
    pub fn comment(&self) -> &Comment {
        &self.comment
    }

    /// Offset from the top of the container.
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Measured height.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// First offset below this placement: `top + height`.
    pub fn bottom(&self) -> u32 {
        u32::from(self.top) + u32::from(self.height)
    }

    pub(crate) fn into_comment(self) -> Comment {
        self.comment
    }
}

/// Ordered run of placements, ascending by `top`.
///
/// Entries are contiguous in arrival order. Eviction always removes from the
/// front (smallest `top`, oldest).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    entries: VecDeque<PlacedComment>,
}

impl Layer {
    /// Empty lane.
    pub fn new() -> Self {
        Self::default()
    }

    /// Placements in ascending `top` order.
    pub fn entries(&self) -> impl Iterator<Item = &PlacedComment> {
        self.entries.iter()
    }

    /// Number of placements.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lane holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all placement heights, i.e. how far an appending lane has grown.
    pub fn used(&self) -> u32 {
        self.entries.iter().map(|e| u32::from(e.height)).sum()
    }

    /// Smallest `top` in the lane, `None` when empty.
    pub fn min_top(&self) -> Option<u16> {
        self.entries.iter().map(PlacedComment::top).min()
    }

    /// How many front entries must go so a comment of `height` placed at
    /// `used` in the other lane no longer reaches this lane's first entry.
    ///
    /// Walks entries in ascending `top` order, paying off the overlap with
    /// each entry's height until nothing is owed.
    pub fn eviction_count(&self, used: u32, height: u16) -> usize {
        let Some(old_top) = self.min_top() else {
            return 0;
        };
        let left_space = i64::from(old_top) - i64::from(used);
        let mut remaining = i64::from(height) - left_space;

        let mut count = 0;
        for entry in &self.entries {
            if remaining <= 0 {
                break;
            }
            remaining -= i64::from(entry.height);
            count += 1;
        }
        count
    }

    /// Remove the first `count` entries and hand their comments back.
    pub(crate) fn evict_front(&mut self, count: usize) -> Vec<Comment> {
        let count = count.min(self.entries.len());
        self.entries
            .drain(..count)
            .map(PlacedComment::into_comment)
            .collect()
    }

    /// Drop every entry, returning their comments oldest first.
    pub(crate) fn clear(&mut self) -> Vec<Comment> {
        self.evict_front(self.entries.len())
    }

    pub(crate) fn push(&mut self, placed: PlacedComment) {
        self.entries.push_back(placed);
    }

    /// Restore ascending `top` order (stable).
    pub(crate) fn normalize(&mut self) {
        self.entries.make_contiguous().sort_by_key(PlacedComment::top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CommentElement, CommentId};

    fn comment(id: &str) -> Comment {
        Comment::new(
            CommentId::new(id).unwrap(),
            vec![CommentElement::text(id)],
        )
    }

    fn layer_of(spans: &[(u16, u16)]) -> Layer {
        let mut layer = Layer::new();
        for (i, (top, height)) in spans.iter().enumerate() {
            layer.push(PlacedComment::new(comment(&format!("e{i}")), *top, *height));
        }
        layer
    }

    #[test]
    fn other_flips_between_lanes() {
        assert_eq!(LayerIndex::First.other(), LayerIndex::Second);
        assert_eq!(LayerIndex::Second.other(), LayerIndex::First);
        assert_eq!(LayerIndex::First.index(), 0);
        assert_eq!(LayerIndex::Second.index(), 1);
    }

    #[test]
    fn used_is_sum_of_heights() {
        let layer = layer_of(&[(0, 40), (40, 50)]);
        assert_eq!(layer.used(), 90);
        assert_eq!(layer.min_top(), Some(0));
    }

    #[test]
    fn empty_layer_never_evicts() {
        assert_eq!(Layer::new().eviction_count(0, 500), 0);
        assert_eq!(Layer::new().min_top(), None);
    }

    #[test]
    fn eviction_count_walks_until_debt_is_paid() {
        let layer = layer_of(&[(0, 40), (40, 50)]);
        assert_eq!(layer.eviction_count(0, 30), 1);
        assert_eq!(layer.eviction_count(0, 40), 1);
        assert_eq!(layer.eviction_count(0, 41), 2);
        assert_eq!(layer.eviction_count(0, 80), 2);
    }

    #[test]
    fn eviction_count_is_zero_when_gap_suffices() {
        let layer = layer_of(&[(60, 20), (80, 20)]);
        assert_eq!(layer.eviction_count(10, 50), 0, "10 + 50 <= 60");
        assert_eq!(layer.eviction_count(10, 51), 1);
    }

    #[test]
    fn eviction_count_caps_at_layer_length() {
        let layer = layer_of(&[(0, 5), (5, 5)]);
        assert_eq!(layer.eviction_count(0, 1000), 2);
    }

    #[test]
    fn evict_front_removes_oldest() {
        let mut layer = layer_of(&[(0, 10), (10, 10), (20, 10)]);
        let evicted = layer.evict_front(2);
        assert_eq!(
            evicted.iter().map(|c| c.id().as_str()).collect::<Vec<_>>(),
            vec!["e0", "e1"]
        );
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.min_top(), Some(20));
    }

    #[test]
    fn normalize_sorts_by_top() {
        let mut layer = layer_of(&[(30, 10), (0, 10), (10, 20)]);
        layer.normalize();
        let tops: Vec<u16> = layer.entries().map(PlacedComment::top).collect();
        assert_eq!(tops, vec![0, 10, 30]);
    }

    #[test]
    fn bottom_does_not_overflow() {
        let placed = PlacedComment::new(comment("big"), u16::MAX, u16::MAX);
        assert_eq!(placed.bottom(), 2 * u32::from(u16::MAX));
    }
}
