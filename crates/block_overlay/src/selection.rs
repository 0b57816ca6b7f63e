use std::collections::BTreeSet;
use std::ops::Range;

/// Block-level selection: empty, a single block, or a contiguous range grown
/// from an anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSession {
    anchor: Option<usize>,
    indices: BTreeSet<usize>,
}

impl SelectionSession {
    /// With `extend` and an existing anchor, selects anchor..=index; otherwise
    /// the block becomes the new anchor and sole selection.
    pub fn select_block(&mut self, index: usize, extend: bool) {
        match self.anchor {
            Some(anchor) if extend => {
                let (start, end) = if anchor <= index {
                    (anchor, index)
                } else {
                    (index, anchor)
                };
                self.indices = (start..=end).collect();
            }
            _ => {
                self.anchor = Some(index);
                self.indices = BTreeSet::from([index]);
            }
        }
    }

    /// Selects `range` with the anchor on its first block.
    pub fn select_range(&mut self, range: Range<usize>) {
        if range.is_empty() {
            self.clear_selection();
            return;
        }
        self.anchor = Some(range.start);
        self.indices = range.collect();
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
        self.indices.clear();
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn indices(&self) -> &BTreeSet<usize> {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// The selection as a half-open range, if non-empty.
    pub fn range(&self) -> Option<Range<usize>> {
        let first = *self.indices.first()?;
        let last = *self.indices.last()?;
        Some(first..last + 1)
    }

    /// Forgets indices that no longer exist.
    pub fn clamp_to(&mut self, child_count: usize) {
        self.indices.retain(|ix| *ix < child_count);
        if self.anchor.is_some_and(|ix| ix >= child_count) {
            self.anchor = self.indices.first().copied();
        }
        if self.indices.is_empty() {
            self.anchor = None;
        }
    }

    /// Blocks a bulk operation should act on: the selection, else the hovered
    /// block, else the block holding the cursor. Stale indices are dropped.
    pub fn resolve_active_indices(
        &self,
        child_count: usize,
        hovered: Option<usize>,
        cursor: Option<usize>,
    ) -> Vec<usize> {
        let selected: Vec<usize> = self
            .indices
            .iter()
            .copied()
            .filter(|ix| *ix < child_count)
            .collect();
        if !selected.is_empty() {
            return selected;
        }
        hovered
            .filter(|ix| *ix < child_count)
            .or(cursor.filter(|ix| *ix < child_count))
            .into_iter()
            .collect()
    }
}
