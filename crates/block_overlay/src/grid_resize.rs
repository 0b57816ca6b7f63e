use plate_core::TableDimensions;
use serde::{Deserialize, Serialize};

use crate::config::OverlayConfig;
use crate::error::OverlayError;
use crate::geometry::{Point, Rect, snap_steps};
use crate::layout::{LayoutSnapshot, TableLayout};
use crate::pointer::PointerId;
use crate::surface::BlockTree;

/// The two resize handles drawn on a hovered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridHandle {
    /// Bottom-center: rows, plus columns on a deliberate diagonal drag.
    Bottom,
    /// Right-center: columns, plus rows only once both axes are active.
    Right,
}

/// Pixel size of one row/column step, measured at drag start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapMetrics {
    pub row: f64,
    pub col: f64,
}

impl SnapMetrics {
    /// Uses the live first cell when it is measurable, else the table's
    /// average row height / column width.
    pub fn measure(
        table: Option<&TableLayout>,
        table_rect: Rect,
        dims: TableDimensions,
        config: &OverlayConfig,
    ) -> Self {
        let first = table.and_then(TableLayout::first_cell);
        let measured_row = first.map(|cell| cell.height()).filter(|h| h.is_finite() && *h > 0.0);
        let measured_col = first.map(|cell| cell.width()).filter(|w| w.is_finite() && *w > 0.0);

        let average_row = table_rect.height() / dims.rows.max(1) as f64;
        let average_col = table_rect.width() / dims.cols.max(1) as f64;

        let row = measured_row
            .or(Some(average_row).filter(|h| h.is_finite() && *h > 0.0))
            .unwrap_or(config.row_snap_min_px);
        let col = measured_col
            .or(Some(average_col).filter(|w| w.is_finite() && *w > 0.0))
            .unwrap_or(config.col_snap_min_px);

        Self {
            row: row.clamp(config.row_snap_min_px, config.row_snap_max_px),
            col: col.clamp(config.col_snap_min_px, config.col_snap_max_px),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GridDelta {
    pub rows: i64,
    pub cols: i64,
}

impl GridDelta {
    pub fn is_zero(&self) -> bool {
        self.rows == 0 && self.cols == 0
    }
}

/// How many trailing rows/columns are empty and may be deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovableLines {
    pub rows: usize,
    pub cols: usize,
}

/// Counts trailing rows and columns with no user content, stopping at the
/// first one that has any. At least one row and one column always remain.
pub fn trailing_removable<T: BlockTree + ?Sized>(
    tree: &T,
    table: usize,
    dims: TableDimensions,
) -> RemovableLines {
    let row_is_empty =
        |row: usize| (0..dims.cols).all(|col| !tree.cell_has_user_content(table, row, col));
    let col_is_empty =
        |col: usize| (0..dims.rows).all(|row| !tree.cell_has_user_content(table, row, col));

    RemovableLines {
        rows: (1..dims.rows).rev().take_while(|row| row_is_empty(*row)).count(),
        cols: (1..dims.cols).rev().take_while(|col| col_is_empty(*col)).count(),
    }
}

/// Zones the renderer shades while a resize drag is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResizePreview {
    pub add_rows: Option<Rect>,
    pub delete_rows: Option<Rect>,
    pub add_cols: Option<Rect>,
    pub delete_cols: Option<Rect>,
    /// Diagonal zone when rows and columns grow or shrink together.
    pub corner: Option<Rect>,
}

#[derive(Debug, Clone)]
pub struct GridResizeSession {
    pointer_id: PointerId,
    table: usize,
    handle: GridHandle,
    start: Point,
    table_rect: Rect,
    snap: SnapMetrics,
    removable: RemovableLines,
    rows_active: bool,
    cols_active: bool,
    delta: GridDelta,
}

impl GridResizeSession {
    pub fn start<T: BlockTree + ?Sized>(
        tree: &T,
        layout: &LayoutSnapshot,
        table: usize,
        handle: GridHandle,
        pointer_id: PointerId,
        start: Point,
        config: &OverlayConfig,
    ) -> Result<Self, OverlayError> {
        if !tree.is_editable() {
            return Err(OverlayError::ReadOnly);
        }
        match tree.block_kind(table) {
            Some(kind) if kind.is_table() => {}
            Some(_) => return Err(OverlayError::NotATable(table)),
            None => return Err(OverlayError::StaleBlock(table)),
        }
        let dims = tree
            .table_dimensions(table)
            .ok_or(OverlayError::NotATable(table))?;
        let table_rect = layout
            .block_rect(table)
            .ok_or(OverlayError::InvalidGeometry)?;
        if !start.is_finite() {
            return Err(OverlayError::InvalidGeometry);
        }

        let snap = SnapMetrics::measure(layout.table_layout(table), table_rect, dims, config);
        let removable = trailing_removable(tree, table, dims);
        tracing::debug!(table, ?handle, ?snap, ?removable, "grid resize started");

        Ok(Self {
            pointer_id,
            table,
            handle,
            start,
            table_rect,
            snap,
            removable,
            rows_active: false,
            cols_active: false,
            delta: GridDelta::default(),
        })
    }

    pub fn pointer_id(&self) -> PointerId {
        self.pointer_id
    }

    pub fn table(&self) -> usize {
        self.table
    }

    pub fn handle(&self) -> GridHandle {
        self.handle
    }

    pub fn snap(&self) -> SnapMetrics {
        self.snap
    }

    pub fn removable(&self) -> RemovableLines {
        self.removable
    }

    pub fn delta(&self) -> GridDelta {
        self.delta
    }

    pub fn rows_active(&self) -> bool {
        self.rows_active
    }

    pub fn cols_active(&self) -> bool {
        self.cols_active
    }

    /// Recomputes the pending delta from the drag's start point.
    pub fn update(&mut self, point: Point, config: &OverlayConfig) -> GridDelta {
        if !point.is_finite() {
            return self.delta;
        }
        let dx = point.x - self.start.x;
        let dy = point.y - self.start.y;
        let threshold = config.axis_lock_threshold_px;

        match self.handle {
            GridHandle::Bottom => {
                self.rows_active |= dy.abs() > threshold;
                self.cols_active |= dx.abs() > threshold;
            }
            GridHandle::Right => {
                self.cols_active |= dx.abs() > threshold;
                self.rows_active |= self.cols_active && dy.abs() > threshold;
            }
        }

        let rows = if self.rows_active {
            snap_steps(dy, self.snap.row).max(-(self.removable.rows as i64))
        } else {
            0
        };
        let cols = if self.cols_active {
            snap_steps(dx, self.snap.col).max(-(self.removable.cols as i64))
        } else {
            0
        };
        self.delta = GridDelta { rows, cols };
        self.delta
    }

    /// The delta to commit on release. A press without meaningful movement
    /// adds one row (bottom handle) or one column (right handle).
    pub fn finish(&self) -> GridDelta {
        if self.rows_active || self.cols_active {
            return self.delta;
        }
        match self.handle {
            GridHandle::Bottom => GridDelta { rows: 1, cols: 0 },
            GridHandle::Right => GridDelta { rows: 0, cols: 1 },
        }
    }

    pub fn preview(&self) -> ResizePreview {
        let rect = self.table_rect;
        let rows_px = self.delta.rows as f64 * self.snap.row;
        let cols_px = self.delta.cols as f64 * self.snap.col;
        let mut preview = ResizePreview::default();

        if rows_px > 0.0 {
            preview.add_rows = Some(Rect::new(rect.left, rect.bottom, rect.right, rect.bottom + rows_px));
        } else if rows_px < 0.0 {
            preview.delete_rows = Some(Rect::new(
                rect.left,
                (rect.bottom + rows_px).max(rect.top),
                rect.right,
                rect.bottom,
            ));
        }

        if cols_px > 0.0 {
            preview.add_cols = Some(Rect::new(rect.right, rect.top, rect.right + cols_px, rect.bottom));
        } else if cols_px < 0.0 {
            preview.delete_cols = Some(Rect::new(
                (rect.right + cols_px).max(rect.left),
                rect.top,
                rect.right,
                rect.bottom,
            ));
        }

        if rows_px > 0.0 && cols_px > 0.0 {
            preview.corner = Some(Rect::new(
                rect.right,
                rect.bottom,
                rect.right + cols_px,
                rect.bottom + rows_px,
            ));
        } else if rows_px < 0.0 && cols_px < 0.0 {
            preview.corner = Some(Rect::new(
                (rect.right + cols_px).max(rect.left),
                (rect.bottom + rows_px).max(rect.top),
                rect.right,
                rect.bottom,
            ));
        }

        preview
    }
}

/// One unit edit against the table's last row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GridEdit {
    DeleteColumn,
    DeleteRow,
    AddColumn,
    AddRow,
}

/// Deletions before insertions; columns before rows within each group.
pub fn plan_grid_edits(delta: GridDelta) -> Vec<GridEdit> {
    let count = |n: i64| n.unsigned_abs() as usize;
    let mut edits = Vec::new();
    if delta.cols < 0 {
        edits.extend(std::iter::repeat_n(GridEdit::DeleteColumn, count(delta.cols)));
    }
    if delta.rows < 0 {
        edits.extend(std::iter::repeat_n(GridEdit::DeleteRow, count(delta.rows)));
    }
    if delta.cols > 0 {
        edits.extend(std::iter::repeat_n(GridEdit::AddColumn, count(delta.cols)));
    }
    if delta.rows > 0 {
        edits.extend(std::iter::repeat_n(GridEdit::AddRow, count(delta.rows)));
    }
    edits
}

/// Applies `edits` one unit at a time at the table's end, moving the
/// selection into the last cell before each primitive. Returns how many
/// edits were applied.
///
/// Dimensions are re-read before every step. A delete is skipped, and the
/// rest of that group with it, if the line it would remove is the last one
/// or holds content (the tree may have changed since the drag began).
pub fn apply_grid_edits<T: BlockTree + ?Sized>(
    tree: &mut T,
    table: usize,
    edits: &[GridEdit],
) -> Result<usize, OverlayError> {
    if !tree.is_editable() {
        return Err(OverlayError::ReadOnly);
    }
    let mut applied = 0;
    let mut deletes_blocked = false;
    for edit in edits {
        let dims = tree
            .table_dimensions(table)
            .ok_or(OverlayError::NotATable(table))?;
        let (last_row, last_col) = (dims.rows.saturating_sub(1), dims.cols.saturating_sub(1));

        match edit {
            GridEdit::DeleteColumn | GridEdit::DeleteRow if deletes_blocked => continue,
            GridEdit::DeleteColumn => {
                let occupied = (0..dims.rows).any(|row| tree.cell_has_user_content(table, row, last_col));
                if dims.cols <= 1 || occupied {
                    deletes_blocked = true;
                    continue;
                }
                tree.focus_cell(table, last_row, last_col)?;
                tree.delete_column()?;
            }
            GridEdit::DeleteRow => {
                let occupied = (0..dims.cols).any(|col| tree.cell_has_user_content(table, last_row, col));
                if dims.rows <= 1 || occupied {
                    deletes_blocked = true;
                    continue;
                }
                tree.focus_cell(table, last_row, last_col)?;
                tree.delete_row()?;
            }
            GridEdit::AddColumn => {
                tree.focus_cell(table, last_row, last_col)?;
                tree.add_column_after()?;
            }
            GridEdit::AddRow => {
                tree.focus_cell(table, last_row, last_col)?;
                tree.add_row_after()?;
            }
        }
        applied += 1;
    }
    tracing::debug!(table, applied, "grid edits applied");
    Ok(applied)
}
