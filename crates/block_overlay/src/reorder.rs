use std::ops::Range;

use plate_core::{Node, Op, Point as CaretPoint, Selection, Transaction};

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::geometry::{Point, insertion_index};
use crate::layout::LayoutSnapshot;
use crate::pointer::PointerId;
use crate::surface::BlockTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderPhase {
    /// Pointer is down on the drag handle but has not travelled far enough.
    Armed,
    Dragging,
}

/// One drag-handle gesture, from pointer-down to pointer-up.
#[derive(Debug, Clone)]
pub struct ReorderSession {
    pointer_id: PointerId,
    grabbed: usize,
    source: Range<usize>,
    start: Point,
    phase: ReorderPhase,
    pending: Option<Point>,
    last_applied_insert_index: Option<usize>,
    extend_on_click: bool,
}

impl ReorderSession {
    pub fn arm(
        pointer_id: PointerId,
        grabbed: usize,
        source: Range<usize>,
        start: Point,
        extend_on_click: bool,
    ) -> Self {
        Self {
            pointer_id,
            grabbed,
            source,
            start,
            phase: ReorderPhase::Armed,
            pending: None,
            last_applied_insert_index: None,
            extend_on_click,
        }
    }

    pub fn pointer_id(&self) -> PointerId {
        self.pointer_id
    }

    pub fn grabbed(&self) -> usize {
        self.grabbed
    }

    /// Current indices of the blocks being moved.
    pub fn source(&self) -> Range<usize> {
        self.source.clone()
    }

    pub fn phase(&self) -> ReorderPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == ReorderPhase::Dragging
    }

    pub fn extend_on_click(&self) -> bool {
        self.extend_on_click
    }

    pub fn last_applied_insert_index(&self) -> Option<usize> {
        self.last_applied_insert_index
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Records a pointer move. Returns `true` when a frame must be requested,
    /// i.e. the move is the first one buffered since the last frame.
    pub fn on_move(&mut self, point: Point, config: &OverlayConfig) -> bool {
        if !point.is_finite() {
            return false;
        }
        if self.phase == ReorderPhase::Armed {
            let dx = (point.x - self.start.x).abs();
            let dy = (point.y - self.start.y).abs();
            if dx.max(dy) < config.drag_threshold_px {
                return false;
            }
            tracing::debug!(source = ?self.source, "reorder drag started");
            self.phase = ReorderPhase::Dragging;
        }
        let first = self.pending.is_none();
        self.pending = Some(point);
        first
    }

    /// Applies the latest buffered pointer position as a committed move.
    /// Returns the moved range when the tree changed.
    pub fn on_frame<T: BlockTree + ?Sized>(
        &mut self,
        tree: &mut T,
        layout: &LayoutSnapshot,
    ) -> Result<Option<Range<usize>>, OverlayError> {
        let Some(point) = self.pending.take() else {
            return Ok(None);
        };
        if self.phase != ReorderPhase::Dragging {
            return Ok(None);
        }
        let rects = layout.block_rects(tree.child_count());
        let Some(target) = insertion_index(&rects, point) else {
            return Err(OverlayError::InvalidGeometry);
        };
        let moved = move_blocks(tree, self.source.clone(), target)?;
        if let Some(range) = &moved {
            self.source = range.clone();
            self.last_applied_insert_index = Some(target);
        }
        Ok(moved)
    }
}

/// Moves the contiguous blocks in `source` so they start at insertion index
/// `insert_index` (counted in the tree before the move).
///
/// Returns `Ok(None)` without touching the tree when `insert_index` lies in
/// `source.start..=source.end`, since the blocks would land where they are.
pub fn move_blocks<T: BlockTree + ?Sized>(
    tree: &mut T,
    source: Range<usize>,
    insert_index: usize,
) -> Result<Option<Range<usize>>, OverlayError> {
    if !tree.is_editable() {
        return Err(OverlayError::ReadOnly);
    }
    let count = tree.child_count();
    if source.is_empty() {
        return Ok(None);
    }
    if source.end > count {
        return Err(OverlayError::StaleBlock(source.end - 1));
    }
    let insert_index = insert_index.min(count);
    if (source.start..=source.end).contains(&insert_index) {
        return Ok(None);
    }

    let nodes: Vec<Node> = source
        .clone()
        .map(|ix| tree.block(ix).cloned().ok_or(OverlayError::StaleBlock(ix)))
        .collect::<Result<_, _>>()?;

    let removed_before = if insert_index > source.start {
        source.len()
    } else {
        0
    };
    let target = insert_index - removed_before;

    let mut tx = Transaction::new(Vec::new());
    for ix in source.clone().rev() {
        tx.push(Op::remove_block(ix));
    }
    let caret = caret_in(&nodes[0], target);
    let moved = target..target + nodes.len();
    for (offset, node) in nodes.into_iter().enumerate() {
        tx.push(Op::insert_block(target + offset, node));
    }

    tree.commit(tx.selection_after(caret).source("overlay.reorder"))?;
    tracing::debug!(from = ?source, to = ?moved, "moved blocks");
    Ok(Some(moved))
}

pub(crate) fn caret_in(node: &Node, index: usize) -> Selection {
    let mut path = vec![index];
    if let Some(rest) = node.first_text_path() {
        path.extend(rest);
    }
    Selection::collapsed(CaretPoint::new(path, 0))
}

/// Where the block at `index` ends up after `source` moved to `moved`.
pub fn moved_index(index: usize, source: &Range<usize>, moved: &Range<usize>) -> usize {
    if source.contains(&index) {
        return moved.start + (index - source.start);
    }
    let without = if index >= source.end {
        index - source.len()
    } else {
        index
    };
    if without >= moved.start {
        without + moved.len()
    } else {
        without
    }
}
