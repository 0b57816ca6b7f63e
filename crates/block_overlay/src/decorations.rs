use std::collections::BTreeMap;

use serde::Serialize;

/// Style tag a rendering adapter applies to a top-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    Hovered,
    Selected,
    Dragging,
}

/// Block index → decoration. A block carries at most one tag; `Dragging`
/// outranks `Selected`, which outranks `Hovered`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecorationSet(BTreeMap<usize, Decoration>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum DecorationChange {
    Added { block: usize, decoration: Decoration },
    Removed { block: usize, decoration: Decoration },
}

impl DecorationSet {
    pub fn insert(&mut self, block: usize, decoration: Decoration) {
        let slot = self.0.entry(block).or_insert(decoration);
        if decoration > *slot {
            *slot = decoration;
        }
    }

    pub fn get(&self, block: usize) -> Option<Decoration> {
        self.0.get(&block).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Decoration)> + '_ {
        self.0.iter().map(|(block, decoration)| (*block, *decoration))
    }

    pub fn blocks_with(&self, decoration: Decoration) -> Vec<usize> {
        self.iter()
            .filter(|(_, d)| *d == decoration)
            .map(|(block, _)| block)
            .collect()
    }

    /// Changes that turn `previous` into `self`: removals first, so an
    /// adapter never shows two tags on one block.
    pub fn diff(&self, previous: &DecorationSet) -> Vec<DecorationChange> {
        let removed = previous
            .iter()
            .filter(|(block, decoration)| self.get(*block) != Some(*decoration))
            .map(|(block, decoration)| DecorationChange::Removed { block, decoration });
        let added = self
            .iter()
            .filter(|(block, decoration)| previous.get(*block) != Some(*decoration))
            .map(|(block, decoration)| DecorationChange::Added { block, decoration });
        removed.chain(added).collect()
    }
}
