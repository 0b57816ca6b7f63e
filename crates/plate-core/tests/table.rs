use plate_core::{Editor, Node, TableDimensions, TableError};

fn editor_with_table(rows: &[&[&str]]) -> Editor {
    Editor::from_blocks(vec![
        Node::paragraph("intro"),
        Node::table_from_text(rows),
        Node::paragraph("outro"),
    ])
}

fn cell_text(editor: &Editor, row: usize, col: usize) -> String {
    let cell = editor.cell_at(1, row, col).expect("cell exists");
    match cell.children().first().and_then(|p| p.children().first()) {
        Some(Node::Text(t)) => t.text.clone(),
        other => panic!("Expected text leaf, got {other:?}"),
    }
}

#[test]
fn table_dimensions_report_rows_and_cols() {
    let editor = editor_with_table(&[&["a", "b", "c"], &["", "", ""]]);
    assert_eq!(
        editor.table_dimensions(1),
        Some(TableDimensions { rows: 2, cols: 3 })
    );
    assert_eq!(editor.table_dimensions(0), None);
    assert_eq!(editor.table_dimensions(9), None);
}

#[test]
fn cell_content_detection_covers_text_and_voids() {
    let mut table = Node::table_from_text(&[&["", " "], &["x", ""]]);
    if let Node::Element(table) = &mut table {
        if let Node::Element(row) = &mut table.children[1] {
            if let Node::Element(cell) = &mut row.children[1] {
                cell.children.push(Node::image("cat.png"));
            }
        }
    }
    let editor = Editor::from_blocks(vec![Node::paragraph(""), table]);

    assert!(!editor.cell_has_user_content(1, 0, 0));
    assert!(!editor.cell_has_user_content(1, 0, 1));
    assert!(editor.cell_has_user_content(1, 1, 0));
    assert!(editor.cell_has_user_content(1, 1, 1));
    assert!(!editor.cell_has_user_content(1, 5, 5));
}

#[test]
fn add_row_after_focused_cell_keeps_table_rectangular() {
    let mut editor = editor_with_table(&[&["a", "b"], &["c", "d"]]);
    editor.focus_cell(1, 1, 1).unwrap();
    editor.add_row_after().unwrap();

    assert_eq!(
        editor.table_dimensions(1),
        Some(TableDimensions { rows: 3, cols: 2 })
    );
    assert_eq!(cell_text(&editor, 1, 1), "d");
    assert_eq!(cell_text(&editor, 2, 1), "");
    assert_eq!(editor.selection().focus.path, vec![1, 2, 1, 0, 0]);
}

#[test]
fn add_row_before_and_column_before_insert_at_focus() {
    let mut editor = editor_with_table(&[&["a", "b"], &["c", "d"]]);
    editor.focus_cell(1, 0, 0).unwrap();
    editor.add_row_before().unwrap();
    assert_eq!(cell_text(&editor, 0, 0), "");
    assert_eq!(cell_text(&editor, 1, 0), "a");

    editor.add_column_before().unwrap();
    assert_eq!(
        editor.table_dimensions(1),
        Some(TableDimensions { rows: 3, cols: 3 })
    );
    assert_eq!(cell_text(&editor, 1, 1), "a");
    assert_eq!(cell_text(&editor, 1, 0), "");
}

#[test]
fn add_column_after_extends_every_row() {
    let mut editor = editor_with_table(&[&["a", "b"], &["c", "d"]]);
    editor.focus_cell(1, 0, 1).unwrap();
    editor.add_column_after().unwrap();

    assert_eq!(
        editor.table_dimensions(1),
        Some(TableDimensions { rows: 2, cols: 3 })
    );
    for row in 0..2 {
        assert_eq!(cell_text(&editor, row, 2), "");
    }
    assert_eq!(editor.focused_cell(), Some((vec![1], 0, 2)));
}

#[test]
fn delete_row_and_column_remove_focused_lines() {
    let mut editor = editor_with_table(&[&["a", "b", "c"], &["d", "e", "f"], &["", "", ""]]);
    editor.focus_cell(1, 2, 2).unwrap();
    editor.delete_row().unwrap();
    assert_eq!(
        editor.table_dimensions(1),
        Some(TableDimensions { rows: 2, cols: 3 })
    );
    assert_eq!(editor.focused_cell(), Some((vec![1], 1, 2)));

    editor.delete_column().unwrap();
    assert_eq!(
        editor.table_dimensions(1),
        Some(TableDimensions { rows: 2, cols: 2 })
    );
    assert_eq!(cell_text(&editor, 1, 1), "e");
    assert_eq!(editor.focused_cell(), Some((vec![1], 1, 1)));
}

#[test]
fn deleting_the_only_row_replaces_table_with_paragraph() {
    let mut editor = editor_with_table(&[&["a", "b"]]);
    editor.focus_cell(1, 0, 0).unwrap();
    editor.delete_row().unwrap();

    assert!(matches!(
        editor.doc().children.get(1),
        Some(Node::Element(el)) if el.kind == "paragraph"
    ));
    assert_eq!(editor.selection().focus.path, vec![1, 0]);
}

#[test]
fn primitives_outside_a_table_report_not_in_table() {
    let mut editor = editor_with_table(&[&["a"]]);
    assert_eq!(editor.add_row_after(), Err(TableError::NotInTable));
    assert_eq!(
        editor.focus_cell(1, 3, 0),
        Err(TableError::CellOutOfRange { row: 3, col: 0 })
    );
    assert_eq!(editor.focus_cell(0, 0, 0), Err(TableError::NoTable(0)));
}

#[test]
fn read_only_editor_rejects_table_edits() {
    let mut editor = editor_with_table(&[&["a"]]);
    editor.focus_cell(1, 0, 0).unwrap();
    editor.set_read_only(true);
    assert!(matches!(editor.add_row_after(), Err(TableError::Apply(_))));
    assert_eq!(
        editor.table_dimensions(1),
        Some(TableDimensions { rows: 1, cols: 1 })
    );
}

#[test]
fn normalize_fills_ragged_tables() {
    let table = Node::table_from_text(&[&["a", "b"], &["c"]]);
    let editor = Editor::from_blocks(vec![table]);
    assert_eq!(
        editor.table_dimensions(0),
        Some(TableDimensions { rows: 2, cols: 2 })
    );
    assert!(editor.cell_at(0, 1, 1).is_some());
}

#[test]
fn void_only_cells_get_a_paragraph_to_hold_the_caret() {
    let mut table = Node::table_from_text(&[&["a", "b"]]);
    if let Node::Element(el) = &mut table {
        if let Some(Node::Element(row)) = el.children.first_mut() {
            if let Some(Node::Element(cell)) = row.children.get_mut(1) {
                cell.children = vec![Node::image("chart.png")];
            }
        }
    }
    let mut editor = Editor::from_blocks(vec![table, Node::paragraph("outro")]);

    let cell = editor.cell_at(0, 0, 1).expect("cell exists");
    assert_eq!(cell.children(), [Node::image("chart.png"), Node::paragraph("")]);

    editor.focus_cell(0, 0, 1).unwrap();
    assert_eq!(editor.focused_cell(), Some((vec![0], 0, 1)));
    assert_eq!(editor.selection().focus.path, vec![0, 0, 1, 1, 0]);
}
