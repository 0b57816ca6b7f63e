//! Block-level edits over the active indices (selection, else hover, else
//! cursor block). Each call is one transaction, so one undo step.

use std::ops::Range;

use plate_core::{AttrPatch, CalloutTone, Node, Op, Point as CaretPoint, Selection, Transaction};

use crate::error::OverlayError;
use crate::reorder::caret_in;
use crate::surface::BlockTree;

pub const TEXT_COLOR_ATTR: &str = "text_color";
pub const BACKGROUND_COLOR_ATTR: &str = "background_color";

/// Sorted, deduplicated indices, all of which must exist in `tree`.
fn checked_indices<T: BlockTree + ?Sized>(
    tree: &T,
    indices: &[usize],
) -> Result<Vec<usize>, OverlayError> {
    if !tree.is_editable() {
        return Err(OverlayError::ReadOnly);
    }
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let count = tree.child_count();
    if let Some(stale) = sorted.iter().find(|ix| **ix >= count) {
        return Err(OverlayError::StaleBlock(*stale));
    }
    Ok(sorted)
}

fn cloned_blocks<T: BlockTree + ?Sized>(
    tree: &T,
    indices: impl IntoIterator<Item = usize>,
) -> Result<Vec<Node>, OverlayError> {
    indices
        .into_iter()
        .map(|ix| tree.block(ix).cloned().ok_or(OverlayError::StaleBlock(ix)))
        .collect()
}

/// Inserts copies of the blocks right after the last of them. Returns the
/// indices of the copies.
pub fn duplicate_blocks<T: BlockTree + ?Sized>(
    tree: &mut T,
    indices: &[usize],
) -> Result<Option<Range<usize>>, OverlayError> {
    let indices = checked_indices(tree, indices)?;
    let Some(&last) = indices.last() else {
        return Ok(None);
    };
    let copies = cloned_blocks(tree, indices.iter().copied())?;
    let start = last + 1;
    let range = start..start + copies.len();
    let caret = caret_in(&copies[0], start);

    let mut tx = Transaction::new(Vec::new());
    for (offset, node) in copies.into_iter().enumerate() {
        tx.push(Op::insert_block(start + offset, node));
    }
    tree.commit(tx.selection_after(caret).source("overlay.duplicate"))?;
    tracing::debug!(copies = ?range, "duplicated blocks");
    Ok(Some(range))
}

/// Removes the blocks and leaves the caret on the block that took the first
/// one's place. An emptied document is refilled with a blank paragraph.
pub fn delete_blocks<T: BlockTree + ?Sized>(
    tree: &mut T,
    indices: &[usize],
) -> Result<bool, OverlayError> {
    let indices = checked_indices(tree, indices)?;
    let Some(&first) = indices.first() else {
        return Ok(false);
    };
    let remaining = tree.child_count() - indices.len();
    let caret_block = first.min(remaining.saturating_sub(1));

    let mut tx = Transaction::new(Vec::new());
    for ix in indices.iter().rev() {
        tx.push(Op::remove_block(*ix));
    }
    let caret = Selection::collapsed(CaretPoint::new(vec![caret_block], 0));
    tree.commit(tx.selection_after(caret).source("overlay.delete"))?;
    tracing::debug!(?indices, "deleted blocks");
    Ok(true)
}

/// Moves the span from the first to the last index into a new callout at the
/// span's position. Returns the callout's index.
pub fn wrap_in_callout<T: BlockTree + ?Sized>(
    tree: &mut T,
    indices: &[usize],
    tone: CalloutTone,
) -> Result<Option<usize>, OverlayError> {
    let indices = checked_indices(tree, indices)?;
    let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
        return Ok(None);
    };
    let children = cloned_blocks(tree, first..=last)?;
    let callout = Node::callout(tone, children);
    let caret = caret_in(&callout, first);

    let mut tx = Transaction::new(Vec::new());
    for ix in (first..=last).rev() {
        tx.push(Op::remove_block(ix));
    }
    tx.push(Op::insert_block(first, callout));
    tree.commit(tx.selection_after(caret).source("overlay.wrap_callout"))?;
    tracing::debug!(first, last, tone = tone.as_str(), "wrapped blocks in callout");
    Ok(Some(first))
}

fn set_color_attr<T: BlockTree + ?Sized>(
    tree: &mut T,
    indices: &[usize],
    key: &str,
    color: Option<&str>,
) -> Result<bool, OverlayError> {
    let indices = checked_indices(tree, indices)?;
    if indices.is_empty() {
        return Ok(false);
    }
    let patch = match color {
        Some(color) => AttrPatch::set(key, color),
        None => AttrPatch::remove(key),
    };
    let ops = indices
        .iter()
        .map(|ix| Op::set_block_attrs(*ix, patch.clone()))
        .collect();
    tree.commit(Transaction::new(ops).source("overlay.color"))?;
    tracing::debug!(?indices, key, ?color, "recolored blocks");
    Ok(true)
}

/// Sets (or with `None`, clears) the text color of each block.
pub fn set_text_color<T: BlockTree + ?Sized>(
    tree: &mut T,
    indices: &[usize],
    color: Option<&str>,
) -> Result<bool, OverlayError> {
    set_color_attr(tree, indices, TEXT_COLOR_ATTR, color)
}

pub fn set_background_color<T: BlockTree + ?Sized>(
    tree: &mut T,
    indices: &[usize],
    color: Option<&str>,
) -> Result<bool, OverlayError> {
    set_color_attr(tree, indices, BACKGROUND_COLOR_ATTR, color)
}
