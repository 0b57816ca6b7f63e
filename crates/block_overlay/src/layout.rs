use plate_core::Path;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Size, cell_at};

/// Rendered cell rectangles of a table, `cells[row][col]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableLayout {
    pub cells: Vec<Vec<Rect>>,
}

impl TableLayout {
    pub fn new(cells: Vec<Vec<Rect>>) -> Self {
        Self { cells }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Rect> {
        self.cells.get(row)?.get(col).copied()
    }

    pub fn first_cell(&self) -> Option<Rect> {
        self.cell(0, 0)
    }

    pub fn last_row_height(&self) -> Option<f64> {
        let rect = self.cells.last()?.first()?;
        Some(rect.height()).filter(|h| h.is_finite() && *h > 0.0)
    }

    pub fn last_col_width(&self) -> Option<f64> {
        let rect = self.cells.first()?.last()?;
        Some(rect.width()).filter(|w| w.is_finite() && *w > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockLayout {
    pub rect: Rect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<TableLayout>,
}

impl BlockLayout {
    pub fn new(rect: Rect) -> Self {
        Self { rect, table: None }
    }

    pub fn table(rect: Rect, cells: Vec<Vec<Rect>>) -> Self {
        Self {
            rect,
            table: Some(TableLayout::new(cells)),
        }
    }
}

/// What the renderer last laid out: the scrolling shell, the viewport, and one
/// entry per top-level block in document order.
///
/// Snapshots are taken fresh for every event or frame; nothing here is cached
/// across tree edits.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub shell: Rect,
    pub viewport: Size,
    #[serde(default)]
    pub blocks: Vec<BlockLayout>,
}

impl LayoutSnapshot {
    pub fn block_rect(&self, index: usize) -> Option<Rect> {
        self.blocks
            .get(index)
            .map(|block| block.rect)
            .filter(Rect::is_finite)
    }

    /// Rects of the first `count` blocks; stops early at the first missing one.
    pub fn block_rects(&self, count: usize) -> Vec<Rect> {
        self.blocks
            .iter()
            .take(count)
            .map(|block| block.rect)
            .take_while(Rect::is_finite)
            .collect()
    }

    pub fn table_layout(&self, index: usize) -> Option<&TableLayout> {
        self.blocks.get(index)?.table.as_ref()
    }

    /// Document path of whatever is rendered under `point`: `[block]`, or
    /// `[block, row, col]` over a table cell.
    pub fn resolve_position(&self, point: Point) -> Option<Path> {
        if !point.is_finite() {
            return None;
        }
        let index = self
            .blocks
            .iter()
            .position(|block| block.rect.is_finite() && block.rect.contains(point))?;
        match self
            .table_layout(index)
            .and_then(|table| cell_at(&table.cells, point))
        {
            Some((row, col)) => Some(vec![index, row, col]),
            None => Some(vec![index]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> LayoutSnapshot {
        let cells = (0..2)
            .map(|row| {
                (0..2)
                    .map(|col| {
                        Rect::from_origin_size(
                            100.0 + col as f64 * 100.0,
                            50.0 + row as f64 * 30.0,
                            100.0,
                            30.0,
                        )
                    })
                    .collect()
            })
            .collect();
        LayoutSnapshot {
            shell: Rect::new(100.0, 0.0, 700.0, 1000.0),
            viewport: Size::new(1200.0, 800.0),
            blocks: vec![
                BlockLayout::new(Rect::new(100.0, 0.0, 700.0, 40.0)),
                BlockLayout::table(Rect::new(100.0, 50.0, 300.0, 110.0), cells),
            ],
        }
    }

    #[test]
    fn resolve_position_names_block_or_cell() {
        let layout = snapshot();
        assert_eq!(layout.resolve_position(Point::new(400.0, 20.0)), Some(vec![0]));
        assert_eq!(layout.resolve_position(Point::new(250.0, 95.0)), Some(vec![1, 1, 1]));
        assert_eq!(layout.resolve_position(Point::new(120.0, 55.0)), Some(vec![1, 0, 0]));
    }

    #[test]
    fn resolve_position_misses_gaps_and_bad_points() {
        let mut layout = snapshot();
        assert_eq!(layout.resolve_position(Point::new(400.0, 45.0)), None);
        assert_eq!(layout.resolve_position(Point::new(50.0, 20.0)), None);
        assert_eq!(layout.resolve_position(Point::new(f64::NAN, 20.0)), None);

        layout.blocks[0].rect.top = f64::INFINITY;
        assert_eq!(layout.resolve_position(Point::new(400.0, 20.0)), None);
    }
}
