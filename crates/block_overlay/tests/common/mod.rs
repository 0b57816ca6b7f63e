#![allow(dead_code)]

use plate_block_overlay::{BlockLayout, LayoutSnapshot, Point, Rect, Size};
use plate_core::{Editor, Node};

pub const BLOCK_LEFT: f64 = 100.0;
pub const BLOCK_WIDTH: f64 = 600.0;
pub const BLOCK_HEIGHT: f64 = 40.0;
pub const BLOCK_GAP: f64 = 10.0;
pub const ROW_HEIGHT: f64 = 34.0;
pub const COL_WIDTH: f64 = 100.0;

pub fn paragraphs(labels: &[&str]) -> Editor {
    Editor::from_blocks(labels.iter().map(|label| Node::paragraph(*label)).collect())
}

/// First text of every top-level block, in order.
pub fn labels(editor: &Editor) -> Vec<String> {
    editor.doc().children.iter().map(first_text).collect()
}

pub fn first_text(node: &Node) -> String {
    match node {
        Node::Text(t) => t.text.clone(),
        Node::Void(v) => format!("<{}>", v.kind),
        Node::Element(el) => el.children.first().map(first_text).unwrap_or_default(),
    }
}

/// Lays the editor's blocks out top to bottom: tables get a real cell grid of
/// `ROW_HEIGHT` x `COL_WIDTH` cells, everything else is `BLOCK_HEIGHT` tall.
pub fn layout_for(editor: &Editor) -> LayoutSnapshot {
    let mut top = 0.0;
    let mut blocks = Vec::new();
    for (ix, node) in editor.doc().children.iter().enumerate() {
        let block = match editor.table_dimensions(ix) {
            Some(dims) => table_block(top, dims.rows, dims.cols),
            None if node.kind() == "divider" => {
                BlockLayout::new(Rect::from_origin_size(BLOCK_LEFT, top, BLOCK_WIDTH, 12.0))
            }
            None => BlockLayout::new(Rect::from_origin_size(
                BLOCK_LEFT,
                top,
                BLOCK_WIDTH,
                BLOCK_HEIGHT,
            )),
        };
        top = block.rect.bottom + BLOCK_GAP;
        blocks.push(block);
    }
    LayoutSnapshot {
        shell: Rect::new(BLOCK_LEFT, 0.0, BLOCK_LEFT + BLOCK_WIDTH, 2000.0),
        viewport: Size::new(1200.0, 800.0),
        blocks,
    }
}

pub fn table_block(top: f64, rows: usize, cols: usize) -> BlockLayout {
    let cells = (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| {
                    Rect::from_origin_size(
                        BLOCK_LEFT + col as f64 * COL_WIDTH,
                        top + row as f64 * ROW_HEIGHT,
                        COL_WIDTH,
                        ROW_HEIGHT,
                    )
                })
                .collect()
        })
        .collect();
    let rect = Rect::from_origin_size(
        BLOCK_LEFT,
        top,
        cols as f64 * COL_WIDTH,
        rows as f64 * ROW_HEIGHT,
    );
    BlockLayout::table(rect, cells)
}

/// A point inside block `index`, `dy` pixels below its top edge.
pub fn inside(layout: &LayoutSnapshot, index: usize, dy: f64) -> Point {
    let rect = layout.blocks[index].rect;
    Point::new(rect.left + 20.0, rect.top + dy)
}
