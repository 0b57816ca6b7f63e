use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    ApplyError, Attrs, Document, Editor, ElementNode, Node, Point, Selection, node_at_path,
};
use crate::ops::{Op, Path, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("selection is not inside a table")]
    NotInTable,
    #[error("no table at block {0}")]
    NoTable(usize),
    #[error("cell ({row}, {col}) is outside the table")]
    CellOutOfRange { row: usize, col: usize },
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDimensions {
    pub rows: usize,
    pub cols: usize,
}

pub(crate) fn table_cell_node() -> Node {
    Node::Element(ElementNode {
        kind: "table_cell".to_string(),
        attrs: Attrs::default(),
        children: vec![Node::paragraph("")],
    })
}

pub(crate) fn table_row_node(cols: usize) -> Node {
    let cols = cols.max(1);
    Node::Element(ElementNode {
        kind: "table_row".to_string(),
        attrs: Attrs::default(),
        children: (0..cols).map(|_| table_cell_node()).collect(),
    })
}

impl Node {
    pub fn table(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        Node::Element(ElementNode {
            kind: "table".to_string(),
            attrs: Attrs::default(),
            children: (0..rows).map(|_| table_row_node(cols)).collect(),
        })
    }

    /// Table whose cells each hold one paragraph with the given text.
    pub fn table_from_text(rows: &[&[&str]]) -> Self {
        let children = rows
            .iter()
            .map(|row| {
                Node::Element(ElementNode {
                    kind: "table_row".to_string(),
                    attrs: Attrs::default(),
                    children: row
                        .iter()
                        .map(|text| {
                            Node::Element(ElementNode {
                                kind: "table_cell".to_string(),
                                attrs: Attrs::default(),
                                children: vec![Node::paragraph(*text)],
                            })
                        })
                        .collect(),
                })
            })
            .collect();
        Node::Element(ElementNode {
            kind: "table".to_string(),
            attrs: Attrs::default(),
            children,
        })
    }
}

fn ancestor_element_path(doc: &Document, path: &[usize], kind: &str) -> Option<Path> {
    (1..=path.len()).rev().find_map(|len| {
        let candidate = &path[..len];
        match node_at_path(doc, candidate) {
            Some(Node::Element(el)) if el.kind == kind => Some(candidate.to_vec()),
            _ => None,
        }
    })
}

/// Focused cell resolved against the current document.
struct FocusedCell {
    table_path: Path,
    row: usize,
    col: usize,
}

impl FocusedCell {
    fn resolve(doc: &Document, focus_path: &[usize]) -> Result<Self, TableError> {
        let cell_path =
            ancestor_element_path(doc, focus_path, "table_cell").ok_or(TableError::NotInTable)?;
        let (col, row_path) = cell_path.split_last().ok_or(TableError::NotInTable)?;
        let (row, table_path) = row_path.split_last().ok_or(TableError::NotInTable)?;
        match node_at_path(doc, table_path) {
            Some(Node::Element(el)) if el.kind == "table" => Ok(Self {
                table_path: table_path.to_vec(),
                row: *row,
                col: *col,
            }),
            _ => Err(TableError::NotInTable),
        }
    }

    fn cell_selection(&self, row: usize, col: usize) -> Selection {
        let mut path = self.table_path.clone();
        path.extend([row, col, 0, 0]);
        Selection::collapsed(Point::new(path, 0))
    }
}

fn table_element<'a>(doc: &'a Document, table_path: &[usize]) -> Result<&'a ElementNode, TableError> {
    match node_at_path(doc, table_path) {
        Some(Node::Element(el)) if el.kind == "table" => Ok(el),
        _ => Err(TableError::NotInTable),
    }
}

fn dimensions_of(table: &ElementNode) -> TableDimensions {
    TableDimensions {
        rows: table.children.len(),
        cols: table
            .children
            .first()
            .map(|row| row.children().len())
            .unwrap_or(0),
    }
}

impl Editor {
    fn top_level_table(&self, table_index: usize) -> Result<&ElementNode, TableError> {
        match self.doc().children.get(table_index) {
            Some(Node::Element(el)) if el.kind == "table" => Ok(el),
            _ => Err(TableError::NoTable(table_index)),
        }
    }

    pub fn table_dimensions(&self, table_index: usize) -> Option<TableDimensions> {
        self.top_level_table(table_index).ok().map(dimensions_of)
    }

    pub fn cell_at(&self, table_index: usize, row: usize, col: usize) -> Option<&Node> {
        self.top_level_table(table_index)
            .ok()?
            .children
            .get(row)?
            .children()
            .get(col)
    }

    pub fn cell_has_user_content(&self, table_index: usize, row: usize, col: usize) -> bool {
        self.cell_at(table_index, row, col)
            .is_some_and(Node::has_user_content)
    }

    /// Moves the caret into the given cell so the focused-cell primitives target it.
    pub fn focus_cell(&mut self, table_index: usize, row: usize, col: usize) -> Result<(), TableError> {
        let dims = self
            .table_dimensions(table_index)
            .ok_or(TableError::NoTable(table_index))?;
        let out_of_range = TableError::CellOutOfRange { row, col };
        if row >= dims.rows || col >= dims.cols {
            return Err(out_of_range);
        }
        let mut path = vec![table_index, row, col];
        path.extend(
            self.cell_at(table_index, row, col)
                .and_then(Node::first_text_path)
                .ok_or_else(|| out_of_range.clone())?,
        );
        self.set_selection(Selection::collapsed(Point::new(path, 0)));

        match self.focused_cell() {
            Some((table_path, r, c)) if table_path == [table_index] && (r, c) == (row, col) => {
                Ok(())
            }
            _ => Err(out_of_range),
        }
    }

    /// (table path, row, col) of the cell holding the caret.
    pub fn focused_cell(&self) -> Option<(Path, usize, usize)> {
        FocusedCell::resolve(self.doc(), &self.selection().focus.path)
            .ok()
            .map(|cell| (cell.table_path, cell.row, cell.col))
    }

    pub fn add_row_before(&mut self) -> Result<(), TableError> {
        let tx = self.insert_row_tx(false)?;
        self.apply(tx).map_err(TableError::from)
    }

    pub fn add_row_after(&mut self) -> Result<(), TableError> {
        let tx = self.insert_row_tx(true)?;
        self.apply(tx).map_err(TableError::from)
    }

    pub fn add_column_before(&mut self) -> Result<(), TableError> {
        let tx = self.insert_col_tx(false)?;
        self.apply(tx).map_err(TableError::from)
    }

    pub fn add_column_after(&mut self) -> Result<(), TableError> {
        let tx = self.insert_col_tx(true)?;
        self.apply(tx).map_err(TableError::from)
    }

    pub fn delete_row(&mut self) -> Result<(), TableError> {
        let tx = self.delete_row_tx()?;
        self.apply(tx).map_err(TableError::from)
    }

    pub fn delete_column(&mut self) -> Result<(), TableError> {
        let tx = self.delete_col_tx()?;
        self.apply(tx).map_err(TableError::from)
    }

    fn insert_row_tx(&self, after: bool) -> Result<Transaction, TableError> {
        let cell = FocusedCell::resolve(self.doc(), &self.selection().focus.path)?;
        let table = table_element(self.doc(), &cell.table_path)?;
        let cols = dimensions_of(table).cols.max(1);

        let row_ix = if after { cell.row + 1 } else { cell.row };
        let mut insert_path = cell.table_path.clone();
        insert_path.push(row_ix);

        Ok(Transaction::new(vec![Op::InsertNode {
            path: insert_path,
            node: table_row_node(cols),
        }])
        .selection_after(cell.cell_selection(row_ix, cell.col.min(cols - 1)))
        .source(if after {
            "table.add_row_after"
        } else {
            "table.add_row_before"
        }))
    }

    fn insert_col_tx(&self, after: bool) -> Result<Transaction, TableError> {
        let cell = FocusedCell::resolve(self.doc(), &self.selection().focus.path)?;
        let table = table_element(self.doc(), &cell.table_path)?;

        let col_ix = if after { cell.col + 1 } else { cell.col };
        let ops = table
            .children
            .iter()
            .enumerate()
            .filter(|(_, row)| row.kind() == "table_row")
            .map(|(r_ix, row)| {
                let mut insert_path = cell.table_path.clone();
                insert_path.extend([r_ix, col_ix.min(row.children().len())]);
                Op::InsertNode {
                    path: insert_path,
                    node: table_cell_node(),
                }
            })
            .collect();

        Ok(Transaction::new(ops)
            .selection_after(cell.cell_selection(cell.row, col_ix))
            .source(if after {
                "table.add_column_after"
            } else {
                "table.add_column_before"
            }))
    }

    fn replace_table_with_paragraph(table_path: &[usize], source: &str) -> Transaction {
        let mut paragraph_text_path = table_path.to_vec();
        paragraph_text_path.push(0);
        Transaction::new(vec![
            Op::RemoveNode {
                path: table_path.to_vec(),
            },
            Op::InsertNode {
                path: table_path.to_vec(),
                node: Node::paragraph(""),
            },
        ])
        .selection_after(Selection::collapsed(Point::new(paragraph_text_path, 0)))
        .source(source)
    }

    fn delete_row_tx(&self) -> Result<Transaction, TableError> {
        let cell = FocusedCell::resolve(self.doc(), &self.selection().focus.path)?;
        let dims = dimensions_of(table_element(self.doc(), &cell.table_path)?);

        if dims.rows <= 1 {
            return Ok(Self::replace_table_with_paragraph(
                &cell.table_path,
                "table.delete_row",
            ));
        }

        let target_row = if cell.row + 1 < dims.rows {
            cell.row
        } else {
            cell.row.saturating_sub(1)
        };

        let mut row_path = cell.table_path.clone();
        row_path.push(cell.row);

        Ok(Transaction::new(vec![Op::RemoveNode { path: row_path }])
            .selection_after(cell.cell_selection(target_row, cell.col))
            .source("table.delete_row"))
    }

    fn delete_col_tx(&self) -> Result<Transaction, TableError> {
        let cell = FocusedCell::resolve(self.doc(), &self.selection().focus.path)?;
        let table = table_element(self.doc(), &cell.table_path)?;
        let dims = dimensions_of(table);

        if dims.cols <= 1 {
            return Ok(Self::replace_table_with_paragraph(
                &cell.table_path,
                "table.delete_column",
            ));
        }

        let target_col = if cell.col + 1 < dims.cols {
            cell.col
        } else {
            cell.col.saturating_sub(1)
        };

        let ops = table
            .children
            .iter()
            .enumerate()
            .filter(|(_, row)| row.kind() == "table_row" && cell.col < row.children().len())
            .map(|(r_ix, _)| {
                let mut remove_path = cell.table_path.clone();
                remove_path.extend([r_ix, cell.col]);
                Op::RemoveNode { path: remove_path }
            })
            .collect();

        Ok(Transaction::new(ops)
            .selection_after(cell.cell_selection(cell.row, target_col))
            .source("table.delete_column"))
    }
}
