mod common;

use common::{BLOCK_LEFT, ROW_HEIGHT, inside, layout_for};
use plate_block_overlay::{
    BlockKind, BlockOverlay, Control, Decoration, HitTarget, OverlayConfig, Point, PointerEvent,
};
use plate_core::{CalloutTone, Editor, Node};

fn every_kind() -> Editor {
    Editor::from_blocks(vec![
        Node::paragraph("para"),
        Node::heading(2, "title"),
        Node::list_item("bulleted", "item"),
        Node::callout(CalloutTone::Note, vec![Node::paragraph("aside")]),
        Node::divider(),
        Node::table(2, 3),
        Node::paragraph("tail"),
    ])
}

fn move_to(point: Point, target: HitTarget, time: u64) -> PointerEvent {
    PointerEvent::new(1, point, target, time)
}

const FAR_AWAY: Point = Point { x: 1100.0, y: 1500.0 };

#[test]
fn leaving_any_block_clears_hover_after_its_delay() {
    let editor = every_kind();
    let layout = layout_for(&editor);
    let config = OverlayConfig::default();
    let expected = [
        BlockKind::Paragraph,
        BlockKind::Heading,
        BlockKind::List,
        BlockKind::Callout,
        BlockKind::Divider,
        BlockKind::Table,
        BlockKind::Paragraph,
    ];

    for (ix, kind) in expected.into_iter().enumerate() {
        let mut overlay = BlockOverlay::new(config.clone());
        overlay.on_pointer_move(
            &editor,
            &layout,
            &move_to(inside(&layout, ix, 5.0), HitTarget::Tree(vec![ix]), 0),
        );
        let hovered = overlay.hover().current().copied().expect("hovered");
        assert_eq!(hovered.block, ix);
        assert_eq!(hovered.kind, kind);

        overlay.on_pointer_move(&editor, &layout, &move_to(FAR_AWAY, HitTarget::None, 10));
        assert!(overlay.hover().is_clear_pending());

        let delay = kind.hover_clear_delay(&config);
        assert!(!overlay.tick(10 + delay - 1), "{kind:?} cleared early");
        assert!(overlay.hover().current().is_some());
        assert!(overlay.tick(10 + delay), "{kind:?} never cleared");
        assert!(overlay.hover().current().is_none());
        assert!(overlay.decorations().is_empty());
    }
}

#[test]
fn table_clear_waits_longer_than_other_blocks() {
    let config = OverlayConfig::default();
    assert_eq!(BlockKind::Paragraph.hover_clear_delay(&config), 700);
    assert_eq!(BlockKind::Table.hover_clear_delay(&config), 1400);
}

#[test]
fn extended_zone_keeps_table_hovered_past_its_edges() {
    let editor = Editor::from_blocks(vec![Node::table(2, 3), Node::paragraph("below")]);
    let mut layout = layout_for(&editor);
    // Push the paragraph out of the way so only the zone is under test.
    layout.blocks[1].rect.top += 200.0;
    layout.blocks[1].rect.bottom += 200.0;
    let table = layout.blocks[0].rect;
    let mut overlay = BlockOverlay::default();

    let footer = Point::new(table.left + 50.0, table.bottom + ROW_HEIGHT + 10.0);
    overlay.on_pointer_move(&editor, &layout, &move_to(footer, HitTarget::None, 0));
    assert_eq!(overlay.hover().current().map(|h| h.block), Some(0));

    let right = Point::new(table.right + 70.0, table.top + 10.0);
    overlay.on_pointer_move(&editor, &layout, &move_to(right, HitTarget::None, 5));
    assert_eq!(overlay.hover().current().map(|h| h.block), Some(0));
    assert!(!overlay.hover().is_clear_pending());

    let beyond = Point::new(table.right + 90.0, table.top + 10.0);
    overlay.on_pointer_move(&editor, &layout, &move_to(beyond, HitTarget::None, 10));
    assert!(overlay.hover().is_clear_pending());

    let left = Point::new(BLOCK_LEFT - 20.0, table.top + 5.0);
    overlay.on_pointer_move(&editor, &layout, &move_to(left, HitTarget::None, 20));
    assert!(!overlay.hover().is_clear_pending());
}

#[test]
fn directly_targeted_block_beats_table_zone() {
    let editor = Editor::from_blocks(vec![Node::table(2, 3), Node::paragraph("below")]);
    let layout = layout_for(&editor);
    let point = inside(&layout, 1, 5.0);
    // The paragraph sits inside the table's footer zone.
    assert!(point.y < layout.blocks[0].rect.bottom + ROW_HEIGHT + 16.0);

    let mut overlay = BlockOverlay::default();
    overlay.on_pointer_move(&editor, &layout, &move_to(point, HitTarget::Tree(vec![1]), 0));
    assert_eq!(overlay.hover().current().map(|h| h.kind), Some(BlockKind::Paragraph));

    // In the gap below the table nothing is targeted, so the zone decides.
    let gap = Point::new(point.x, layout.blocks[0].rect.bottom + 5.0);
    overlay.on_pointer_move(&editor, &layout, &move_to(gap, HitTarget::None, 5));
    assert_eq!(overlay.hover().current().map(|h| h.kind), Some(BlockKind::Table));
}

#[test]
fn untargeted_pointer_is_resolved_from_layout() {
    let editor = Editor::from_blocks(vec![Node::table(2, 3), Node::paragraph("below")]);
    let layout = layout_for(&editor);
    let mut overlay = BlockOverlay::default();

    // Over the paragraph, even though it lies inside the table's footer zone.
    let point = inside(&layout, 1, 5.0);
    overlay.on_pointer_move(&editor, &layout, &move_to(point, HitTarget::None, 0));
    assert_eq!(overlay.hover().current().map(|h| h.block), Some(1));
    assert_eq!(overlay.hover().current().map(|h| h.kind), Some(BlockKind::Paragraph));
}

#[test]
fn hovered_cell_comes_from_target_path_then_geometry() {
    let editor = Editor::from_blocks(vec![Node::paragraph("intro"), Node::table(2, 3)]);
    let layout = layout_for(&editor);
    let table = layout.blocks[1].table.clone().expect("table layout");
    let mut overlay = BlockOverlay::default();

    let center = table.cell(1, 2).expect("cell").center();
    overlay.on_pointer_move(
        &editor,
        &layout,
        &move_to(center, HitTarget::Tree(vec![1, 1, 2, 0, 0]), 0),
    );
    let cell = overlay.hover().cell().copied().expect("cell hovered");
    assert_eq!((cell.block, cell.row, cell.col), (1, 1, 2));

    let center = table.cell(0, 1).expect("cell").center();
    overlay.on_pointer_move(&editor, &layout, &move_to(center, HitTarget::None, 5));
    let cell = overlay.hover().cell().copied().expect("cell hovered");
    assert_eq!((cell.row, cell.col), (0, 1));

    // A path naming a cell the table does not have is ignored.
    overlay.on_pointer_move(
        &editor,
        &layout,
        &move_to(center, HitTarget::Tree(vec![1, 7, 7]), 10),
    );
    assert!(overlay.hover().cell().is_none());
    assert_eq!(overlay.hover().current().map(|h| h.block), Some(1));
}

#[test]
fn open_menu_and_control_hover_hold_the_hover() {
    let editor = common::paragraphs(&["a", "b"]);
    let layout = layout_for(&editor);
    let mut overlay = BlockOverlay::default();

    overlay.on_pointer_move(&editor, &layout, &move_to(inside(&layout, 0, 5.0), HitTarget::Tree(vec![0]), 0));
    overlay.on_pointer_move(&editor, &layout, &move_to(FAR_AWAY, HitTarget::None, 100));
    overlay.on_hover_ui_enter();
    assert!(!overlay.hover().is_clear_pending());
    // Moving over the control itself leaves hover alone.
    overlay.on_pointer_move(
        &editor,
        &layout,
        &move_to(Point::new(50.0, 5.0), HitTarget::Control(Control::DragHandle), 150),
    );
    assert!(!overlay.tick(5_000));
    assert_eq!(overlay.hover().current().map(|h| h.block), Some(0));

    overlay.open_menu(0);
    overlay.on_hover_ui_leave(6_000);
    assert!(!overlay.tick(60_000));
    assert!(overlay.hover().current().is_some());

    overlay.close_menu(61_000);
    assert!(!overlay.tick(61_699));
    assert!(overlay.tick(61_700));
    assert!(overlay.hover().current().is_none());
}

#[test]
fn only_one_block_is_marked_hovered() {
    let editor = common::paragraphs(&["a", "b", "c"]);
    let layout = layout_for(&editor);
    let mut overlay = BlockOverlay::default();

    overlay.on_pointer_move(&editor, &layout, &move_to(inside(&layout, 0, 5.0), HitTarget::Tree(vec![0]), 0));
    let before = overlay.decorations();
    overlay.on_pointer_move(&editor, &layout, &move_to(inside(&layout, 2, 5.0), HitTarget::Tree(vec![2]), 5));
    let after = overlay.decorations();

    assert_eq!(after.blocks_with(Decoration::Hovered), vec![2]);
    assert_eq!(after.diff(&before).len(), 2);
}

#[test]
fn non_finite_pointer_is_treated_as_no_hover() {
    let editor = common::paragraphs(&["a"]);
    let layout = layout_for(&editor);
    let mut overlay = BlockOverlay::default();
    overlay.on_pointer_move(
        &editor,
        &layout,
        &move_to(Point::new(f64::NAN, 5.0), HitTarget::Tree(vec![0]), 0),
    );
    assert!(overlay.hover().current().is_none());
}
