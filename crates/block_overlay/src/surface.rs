use plate_core::{Editor, Node, TableDimensions, Transaction};
use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::schedule::Millis;

/// Closed set of top-level block kinds the overlay branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading,
    List,
    Callout,
    Divider,
    Table,
    Other,
}

impl BlockKind {
    pub fn of(node: &Node) -> Self {
        match node.kind() {
            "paragraph" => {
                let is_list = node
                    .attrs()
                    .is_some_and(|attrs| attrs.contains_key("list_type"));
                if is_list {
                    BlockKind::List
                } else {
                    BlockKind::Paragraph
                }
            }
            "heading" => BlockKind::Heading,
            "callout" => BlockKind::Callout,
            "divider" => BlockKind::Divider,
            "table" => BlockKind::Table,
            _ => BlockKind::Other,
        }
    }

    pub fn is_table(self) -> bool {
        matches!(self, BlockKind::Table)
    }

    /// How long hover survives after the pointer leaves the block. Tables get
    /// longer because their controls float further from the edge.
    pub fn hover_clear_delay(self, config: &OverlayConfig) -> Millis {
        match self {
            BlockKind::Table => config.table_hover_clear_delay_ms,
            BlockKind::Paragraph
            | BlockKind::Heading
            | BlockKind::List
            | BlockKind::Callout
            | BlockKind::Divider
            | BlockKind::Other => config.hover_clear_delay_ms,
        }
    }

    /// Whether the block can show row/column quick menus and resize handles.
    pub fn has_grid_controls(self) -> bool {
        match self {
            BlockKind::Table => true,
            BlockKind::Paragraph
            | BlockKind::Heading
            | BlockKind::List
            | BlockKind::Callout
            | BlockKind::Divider
            | BlockKind::Other => false,
        }
    }
}

/// The editable document the overlay reads from and commits to.
///
/// Every edit is a discrete transaction or a focused-cell table primitive;
/// implementations re-validate indices on each call rather than trusting
/// anything the overlay computed earlier.
pub trait BlockTree {
    fn child_count(&self) -> usize;

    fn block(&self, index: usize) -> Option<&Node>;

    fn block_kind(&self, index: usize) -> Option<BlockKind> {
        self.block(index).map(BlockKind::of)
    }

    fn is_editable(&self) -> bool;

    /// Top-level block holding the text cursor.
    fn cursor_block(&self) -> Option<usize>;

    fn commit(&mut self, tx: Transaction) -> Result<(), OverlayError>;

    fn table_dimensions(&self, table: usize) -> Option<TableDimensions>;

    fn cell_has_user_content(&self, table: usize, row: usize, col: usize) -> bool;

    /// Puts the selection inside a cell; required before every table primitive.
    fn focus_cell(&mut self, table: usize, row: usize, col: usize) -> Result<(), OverlayError>;

    fn add_row_after(&mut self) -> Result<(), OverlayError>;

    fn add_column_after(&mut self) -> Result<(), OverlayError>;

    fn delete_row(&mut self) -> Result<(), OverlayError>;

    fn delete_column(&mut self) -> Result<(), OverlayError>;
}

impl BlockTree for Editor {
    fn child_count(&self) -> usize {
        self.doc().children.len()
    }

    fn block(&self, index: usize) -> Option<&Node> {
        self.doc().children.get(index)
    }

    fn is_editable(&self) -> bool {
        !self.is_read_only()
    }

    fn cursor_block(&self) -> Option<usize> {
        self.selection()
            .focus
            .path
            .first()
            .copied()
            .filter(|ix| *ix < self.child_count())
    }

    fn commit(&mut self, tx: Transaction) -> Result<(), OverlayError> {
        self.apply(tx).map_err(OverlayError::from)
    }

    fn table_dimensions(&self, table: usize) -> Option<TableDimensions> {
        Editor::table_dimensions(self, table)
    }

    fn cell_has_user_content(&self, table: usize, row: usize, col: usize) -> bool {
        Editor::cell_has_user_content(self, table, row, col)
    }

    fn focus_cell(&mut self, table: usize, row: usize, col: usize) -> Result<(), OverlayError> {
        Editor::focus_cell(self, table, row, col).map_err(|_| OverlayError::StaleCell {
            table,
            row,
            col,
        })
    }

    fn add_row_after(&mut self) -> Result<(), OverlayError> {
        Editor::add_row_after(self).map_err(OverlayError::from)
    }

    fn add_column_after(&mut self) -> Result<(), OverlayError> {
        Editor::add_column_after(self).map_err(OverlayError::from)
    }

    fn delete_row(&mut self) -> Result<(), OverlayError> {
        Editor::delete_row(self).map_err(OverlayError::from)
    }

    fn delete_column(&mut self) -> Result<(), OverlayError> {
        Editor::delete_column(self).map_err(OverlayError::from)
    }
}
