use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_finite(&self) -> bool {
        self.width.is_finite() && self.height.is_finite()
    }
}

/// Viewport-relative rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right) / 2.0,
            (self.top + self.bottom) / 2.0,
        )
    }

    /// Finite coordinates with non-negative extent.
    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
            && self.right >= self.left
            && self.bottom >= self.top
    }

    /// Half-open containment so stacked blocks never both claim a boundary pixel.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.top && y < self.bottom
    }

    pub fn expand(&self, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(
            self.left - left,
            self.top - top,
            self.right + right,
            self.bottom + bottom,
        )
    }
}

/// Index of the block whose vertical span contains `y`.
///
/// Only the vertical axis is tested: while dragging, the pointer usually sits in
/// the gutter, left of the blocks themselves.
pub fn block_index_at_y(rects: &[Rect], y: f64) -> Option<usize> {
    if !y.is_finite() {
        return None;
    }
    rects.iter().position(|rect| rect.contains_y(y))
}

/// Insertion index (0..=rects.len()) for a drop at `point`.
pub fn insertion_index(rects: &[Rect], point: Point) -> Option<usize> {
    if !point.is_finite() {
        return None;
    }
    let (Some(first), Some(last)) = (rects.first(), rects.last()) else {
        return Some(0);
    };

    if let Some(ix) = block_index_at_y(rects, point.y) {
        let rect = rects[ix];
        return Some(if point.y < rect.center().y { ix } else { ix + 1 });
    }
    if point.y < first.top {
        return Some(0);
    }
    if point.y >= last.bottom {
        return Some(rects.len());
    }

    // Between two blocks: insert before the next one down.
    Some(
        rects
            .iter()
            .position(|rect| rect.top > point.y)
            .unwrap_or(rects.len()),
    )
}

/// (row, col) of the cell containing `point`.
pub fn cell_at(cells: &[Vec<Rect>], point: Point) -> Option<(usize, usize)> {
    if !point.is_finite() {
        return None;
    }
    cells.iter().enumerate().find_map(|(row, cols)| {
        cols.iter()
            .position(|rect| rect.contains(point))
            .map(|col| (row, col))
    })
}

/// Discrete steps for a raw pixel delta: `sign(raw) * ceil(|raw| / snap)`.
pub fn snap_steps(raw: f64, snap: f64) -> i64 {
    if !raw.is_finite() || !snap.is_finite() || snap <= 0.0 || raw == 0.0 {
        return 0;
    }
    let steps = (raw.abs() / snap).ceil() as i64;
    if raw < 0.0 { -steps } else { steps }
}
