use serde::Serialize;

use crate::config::OverlayConfig;
use crate::geometry::{Point, Rect, cell_at};
use crate::layout::{LayoutSnapshot, TableLayout};
use crate::schedule::{Millis, ScheduledTask};
use crate::surface::{BlockKind, BlockTree};

/// The hovered top-level block and its viewport-relative bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoverState {
    pub block: usize,
    pub kind: BlockKind,
    pub rect: Rect,
}

impl HoverState {
    pub fn width(&self) -> f64 {
        self.rect.width()
    }
}

/// The cell under the pointer while a table is hovered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoverTableCellState {
    pub block: usize,
    pub row: usize,
    pub col: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverHit {
    pub state: HoverState,
    pub cell: Option<HoverTableCellState>,
}

/// The region around a table that still counts as hovering it, so the
/// add/remove handles just past its edges stay reachable.
pub fn table_hit_zone(rect: Rect, table: Option<&TableLayout>, config: &OverlayConfig) -> Rect {
    let footer = table
        .and_then(TableLayout::last_row_height)
        .unwrap_or(0.0)
        + config.table_zone_footer_buffer_px;
    let right = table
        .and_then(TableLayout::last_col_width)
        .map(|w| w * config.table_zone_right_cell_factor)
        .unwrap_or(0.0);
    rect.expand(
        config.table_zone_side_margin_px,
        config.table_zone_top_margin_px,
        right,
        footer,
    )
}

/// Works out which block (and, for tables, which cell) the pointer refers to.
///
/// `target` is the document path of the rendered element under the pointer;
/// its first component is the top-level block that contains it. A directly
/// targeted non-table block always wins over any table's extended zone.
pub fn resolve_hover<T: BlockTree + ?Sized>(
    tree: &T,
    layout: &LayoutSnapshot,
    point: Point,
    target: Option<&[usize]>,
    config: &OverlayConfig,
) -> Option<HoverHit> {
    if !point.is_finite() {
        return None;
    }
    let count = tree.child_count().min(layout.blocks.len());
    let direct = target
        .and_then(|path| path.first().copied())
        .filter(|ix| *ix < count)
        .and_then(|ix| tree.block_kind(ix).map(|kind| (ix, kind)));

    if let Some((ix, kind)) = direct {
        if !kind.is_table() {
            let rect = layout.block_rect(ix)?;
            return Some(HoverHit {
                state: HoverState {
                    block: ix,
                    kind,
                    rect,
                },
                cell: None,
            });
        }
    }

    let zone_hit = (0..count).find(|ix| {
        tree.block_kind(*ix).is_some_and(BlockKind::is_table)
            && layout.block_rect(*ix).is_some_and(|rect| {
                table_hit_zone(rect, layout.table_layout(*ix), config).contains(point)
            })
    });

    let table = zone_hit.or(direct.map(|(ix, _)| ix))?;
    let rect = layout.block_rect(table)?;
    Some(HoverHit {
        state: HoverState {
            block: table,
            kind: BlockKind::Table,
            rect,
        },
        cell: resolve_cell(tree, layout, table, point, target),
    })
}

fn resolve_cell<T: BlockTree + ?Sized>(
    tree: &T,
    layout: &LayoutSnapshot,
    table: usize,
    point: Point,
    target: Option<&[usize]>,
) -> Option<HoverTableCellState> {
    let table_layout = layout.table_layout(table)?;
    let dims = tree.table_dimensions(table)?;

    let from_target = match target {
        Some([block, row, col, ..]) if *block == table => Some((*row, *col)),
        _ => None,
    };
    let (row, col) = from_target.or_else(|| cell_at(&table_layout.cells, point))?;
    if row >= dims.rows || col >= dims.cols {
        return None;
    }
    let rect = table_layout.cell(row, col).filter(Rect::is_finite)?;
    Some(HoverTableCellState {
        block: table,
        row,
        col,
        rect,
    })
}

/// Hover state plus its debounced clear.
#[derive(Debug, Clone, Default)]
pub struct HoverSession {
    current: Option<HoverState>,
    cell: Option<HoverTableCellState>,
    clear_task: ScheduledTask,
    ui_hovered: bool,
    menu_open: bool,
}

impl HoverSession {
    pub fn current(&self) -> Option<&HoverState> {
        self.current.as_ref()
    }

    pub fn cell(&self) -> Option<&HoverTableCellState> {
        self.cell.as_ref()
    }

    pub fn is_clear_pending(&self) -> bool {
        self.clear_task.is_pending()
    }

    pub fn is_ui_hovered(&self) -> bool {
        self.ui_hovered
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Folds one pointer-move resolution into the session. Returns whether the
    /// hovered block or cell changed.
    pub fn apply(&mut self, hit: Option<HoverHit>, now: Millis, config: &OverlayConfig) -> bool {
        match hit {
            Some(hit) => {
                self.clear_task.cancel();
                let changed = self.current != Some(hit.state) || self.cell != hit.cell;
                self.current = Some(hit.state);
                self.cell = hit.cell;
                changed
            }
            None => {
                if self.current.is_some() && !self.clear_task.is_pending() && !self.ui_hovered {
                    self.schedule_clear(now, config);
                }
                false
            }
        }
    }

    fn schedule_clear(&mut self, now: Millis, config: &OverlayConfig) {
        if let Some(current) = self.current {
            self.clear_task
                .schedule(now, current.kind.hover_clear_delay(config));
        }
    }

    pub fn on_ui_enter(&mut self) {
        self.ui_hovered = true;
        self.clear_task.cancel();
    }

    pub fn on_ui_leave(&mut self, now: Millis, config: &OverlayConfig) {
        self.ui_hovered = false;
        if !self.menu_open {
            self.schedule_clear(now, config);
        }
    }

    pub fn set_menu_open(&mut self, open: bool, now: Millis, config: &OverlayConfig) {
        self.menu_open = open;
        if open {
            self.clear_task.cancel();
        } else if !self.ui_hovered {
            self.schedule_clear(now, config);
        }
    }

    /// Runs the pending clear if it is due. Returns whether hover was cleared.
    pub fn tick(&mut self, now: Millis) -> bool {
        if !self.clear_task.take_due(now) {
            return false;
        }
        if self.menu_open || self.ui_hovered {
            return false;
        }
        let had_hover = self.current.is_some();
        self.current = None;
        self.cell = None;
        had_hover
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.cell = None;
        self.clear_task.cancel();
    }

    /// Re-points hover after blocks moved, then revalidates it.
    pub fn remap<T: BlockTree + ?Sized>(&mut self, tree: &T, map: impl Fn(usize) -> usize) {
        if let Some(current) = &mut self.current {
            current.block = map(current.block);
        }
        if let Some(cell) = &mut self.cell {
            cell.block = map(cell.block);
        }
        self.revalidate(tree);
    }

    /// Drops hover that points past the end of the tree or at a block whose
    /// kind changed underneath it.
    pub fn revalidate<T: BlockTree + ?Sized>(&mut self, tree: &T) {
        let Some(current) = self.current else {
            return;
        };
        if tree.block_kind(current.block) != Some(current.kind) {
            tracing::debug!(block = current.block, "dropping stale hover");
            self.clear();
            return;
        }
        if let Some(cell) = self.cell {
            let in_range = tree
                .table_dimensions(cell.block)
                .is_some_and(|dims| cell.row < dims.rows && cell.col < dims.cols);
            if !in_range {
                self.cell = None;
            }
        }
    }
}
