use crate::core::{Document, ElementNode, Node, Point, Selection, node_at_path};
use crate::ops::Op;
use crate::table::{table_cell_node, table_row_node};

/// Ops that bring `doc` one step closer to a well-formed tree. An empty
/// result means the document is already normalized.
pub(crate) fn normalize_ops(doc: &Document) -> Vec<Op> {
    if doc.children.is_empty() {
        return vec![Op::insert_block(0, Node::paragraph(""))];
    }

    let mut ops = Vec::new();
    walk(&doc.children, &mut Vec::new(), &mut ops);
    ops
}

fn is_text_block(kind: &str) -> bool {
    matches!(kind, "paragraph" | "heading")
}

fn walk(nodes: &[Node], path: &mut Vec<usize>, ops: &mut Vec<Op>) {
    for (ix, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else {
            continue;
        };
        path.push(ix);

        if is_text_block(&el.kind) {
            if !el.children.iter().any(|n| matches!(n, Node::Text(_))) {
                let mut insert_path = path.clone();
                insert_path.push(0);
                ops.push(Op::InsertNode {
                    path: insert_path,
                    node: Node::text(""),
                });
            }
        } else {
            match el.kind.as_str() {
                "table" => normalize_table(el, path, ops),
                "callout" if el.children.is_empty() => {
                    let mut insert_path = path.clone();
                    insert_path.push(0);
                    ops.push(Op::InsertNode {
                        path: insert_path,
                        node: Node::paragraph(""),
                    });
                }
                _ => {}
            }
            walk(&el.children, path, ops);
        }

        path.pop();
    }
}

fn normalize_table(table: &ElementNode, path: &[usize], ops: &mut Vec<Op>) {
    if table.children.is_empty() {
        let mut insert_path = path.to_vec();
        insert_path.push(0);
        ops.push(Op::InsertNode {
            path: insert_path,
            node: table_row_node(1),
        });
        return;
    }

    let max_cols = table
        .children
        .iter()
        .map(|row| row.children().len())
        .max()
        .unwrap_or(0)
        .max(1);

    for (row_ix, row) in table.children.iter().enumerate() {
        if row.kind() != "table_row" {
            continue;
        }
        for col_ix in row.children().len()..max_cols {
            let mut insert_path = path.to_vec();
            insert_path.extend([row_ix, col_ix]);
            ops.push(Op::InsertNode {
                path: insert_path,
                node: table_cell_node(),
            });
        }
        // Every cell keeps a text leaf so the caret can sit in it.
        for (cell_ix, cell) in row.children().iter().enumerate() {
            if cell.kind() == "table_cell" && cell.first_text_path().is_none() {
                let mut insert_path = path.to_vec();
                insert_path.extend([row_ix, cell_ix, cell.children().len()]);
                ops.push(Op::InsertNode {
                    path: insert_path,
                    node: Node::paragraph(""),
                });
            }
        }
    }
}

/// Maps both ends of `selection` onto existing text leaves.
pub(crate) fn normalize_selection(doc: &Document, selection: &Selection) -> Selection {
    let fallback = first_text_point(&doc.children, &mut Vec::new()).unwrap_or(Point {
        path: vec![0],
        offset: 0,
    });

    let anchor = normalize_point_to_existing_text(doc, &selection.anchor).unwrap_or_else(|| {
        normalize_point_to_existing_text(doc, &selection.focus).unwrap_or_else(|| fallback.clone())
    });
    let focus =
        normalize_point_to_existing_text(doc, &selection.focus).unwrap_or_else(|| anchor.clone());

    Selection { anchor, focus }
}

fn first_text_point(children: &[Node], path: &mut Vec<usize>) -> Option<Point> {
    for (ix, node) in children.iter().enumerate() {
        path.push(ix);
        let found = match node {
            Node::Text(_) => Some(Point {
                path: path.clone(),
                offset: 0,
            }),
            Node::Element(el) => first_text_point(&el.children, path),
            Node::Void(_) => None,
        };
        path.pop();
        if found.is_some() {
            return found;
        }
    }
    None
}

fn normalize_point_to_existing_text(doc: &Document, point: &Point) -> Option<Point> {
    if point.path.is_empty() || doc.children.is_empty() {
        return None;
    }

    let mut resolved_path: Vec<usize> = Vec::new();
    let mut children: &[Node] = &doc.children;

    for &wanted in &point.path {
        if children.is_empty() {
            break;
        }
        let ix = wanted.min(children.len() - 1);
        resolved_path.push(ix);
        match &children[ix] {
            Node::Text(t) => {
                return Some(Point {
                    path: resolved_path,
                    offset: point.offset.min(t.text.len()),
                });
            }
            Node::Element(el) => children = &el.children,
            Node::Void(_) => break,
        }
    }

    match node_at_path(doc, &resolved_path)? {
        Node::Text(t) => Some(Point {
            path: resolved_path,
            offset: point.offset.min(t.text.len()),
        }),
        Node::Element(el) => first_text_point(&el.children, &mut resolved_path),
        Node::Void(_) => {
            // Voids hold no caret; fall forward to the next text leaf in the document.
            let block = *resolved_path.first()?;
            doc.children
                .iter()
                .enumerate()
                .skip(block + 1)
                .chain(doc.children.iter().enumerate().take(block).rev())
                .find_map(|(ix, node)| {
                    node.first_text_path().map(|mut rest| {
                        rest.insert(0, ix);
                        Point::new(rest, 0)
                    })
                })
        }
    }
}
