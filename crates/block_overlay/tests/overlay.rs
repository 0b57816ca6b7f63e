mod common;

use common::{inside, layout_for, paragraphs};
use plate_block_overlay::{
    BlockOverlay, HitTarget, MenuSide, OverlayConfig, PanelSide, Point, PointerEvent, Rect, Size,
    color_panel, hover_menu,
};
use plate_core::{Editor, Node};

const MENU: Size = Size { width: 240.0, height: 300.0 };
const PANEL: Size = Size { width: 180.0, height: 160.0 };

#[test]
fn menu_flips_above_a_block_near_the_bottom() {
    let config = OverlayConfig::default();
    let viewport = Size::new(1200.0, 800.0);
    let block = Rect::new(100.0, 640.0, 700.0, 680.0);

    let menu = hover_menu(block, MENU, viewport, &config).expect("placement");
    assert_eq!(menu.side, MenuSide::Above);
    assert!(menu.top < block.top);
    assert!(menu.top + menu.height <= block.top);
    assert_eq!(menu.max_height, 420.0);
}

#[test]
fn menu_stays_below_when_above_is_even_tighter() {
    let config = OverlayConfig::default();
    let viewport = Size::new(1200.0, 300.0);
    let block = Rect::new(100.0, 100.0, 700.0, 140.0);

    let menu = hover_menu(block, MENU, viewport, &config).expect("placement");
    assert_eq!(menu.side, MenuSide::Below);
    // Only 146px of room below, which becomes the cap.
    assert_eq!(menu.max_height, 146.0);
    assert_eq!(menu.height, 146.0);
    assert!(menu.top + menu.height <= viewport.height - config.screen_margin_px);
}

#[test]
fn short_menu_space_is_floored_at_the_minimum_height() {
    let config = OverlayConfig::default();
    let viewport = Size::new(1200.0, 200.0);
    let block = Rect::new(100.0, 60.0, 700.0, 100.0);
    let menu = hover_menu(block, MENU, viewport, &config).expect("placement");
    assert_eq!(menu.max_height, 140.0);
}

#[test]
fn color_panel_mirrors_the_menu_vertically() {
    let config = OverlayConfig::default();
    let viewport = Size::new(1200.0, 800.0);

    let below = hover_menu(Rect::new(100.0, 100.0, 300.0, 140.0), MENU, viewport, &config)
        .expect("placement");
    let panel = color_panel(&below, PANEL, viewport, &config).expect("panel");
    assert_eq!(panel.side, PanelSide::Right);
    assert_eq!(panel.left, below.left + below.width + config.menu_gap_px);
    assert_eq!(panel.top, below.top);

    let above = hover_menu(Rect::new(100.0, 640.0, 300.0, 680.0), MENU, viewport, &config)
        .expect("placement");
    let panel = color_panel(&above, PANEL, viewport, &config).expect("panel");
    assert_eq!(panel.top + PANEL.height, above.top + above.height);
}

#[test]
fn engine_places_gutter_menu_and_panel_from_fresh_layout() {
    let editor = paragraphs(&["a", "b", "c"]);
    let mut layout = layout_for(&editor);
    let mut overlay = BlockOverlay::default();
    overlay.on_pointer_move(
        &editor,
        &layout,
        &PointerEvent::new(1, inside(&layout, 1, 5.0), HitTarget::Tree(vec![1]), 0),
    );
    overlay.open_menu(1);
    assert!(overlay.open_color_panel());

    let placed = overlay.overlay_layout(&layout, MENU, PANEL);
    let gutter = placed.gutter.expect("gutter");
    assert_eq!(gutter.add_button, Point::new(44.0, 50.0));
    assert_eq!(gutter.drag_handle, Point::new(66.0, 50.0));
    assert_eq!(placed.menu.map(|m| m.top), Some(96.0));
    assert!(placed.color_panel.is_some());
    assert!(placed.row_quick_menu.is_none());

    // Scrolling moves everything; nothing is cached between calls.
    for block in &mut layout.blocks {
        block.rect.top -= 30.0;
        block.rect.bottom -= 30.0;
    }
    let placed = overlay.overlay_layout(&layout, MENU, PANEL);
    assert_eq!(placed.gutter.map(|g| g.add_button.y), Some(20.0));
    assert_eq!(placed.menu.map(|m| m.top), Some(66.0));

    overlay.close_menu(10);
    assert!(!overlay.is_color_panel_open());
    assert!(overlay.overlay_layout(&layout, MENU, PANEL).menu.is_none());
}

#[test]
fn quick_menus_anchor_to_the_hovered_cell() {
    let editor = Editor::from_blocks(vec![Node::paragraph("intro"), Node::table(2, 3)]);
    let layout = layout_for(&editor);
    let cell = layout.blocks[1].table.as_ref().and_then(|t| t.cell(1, 2)).expect("cell");
    let mut overlay = BlockOverlay::default();
    overlay.on_pointer_move(
        &editor,
        &layout,
        &PointerEvent::new(1, cell.center(), HitTarget::Tree(vec![1, 1, 2]), 0),
    );

    let placed = overlay.overlay_layout(&layout, MENU, PANEL);
    assert_eq!(placed.row_quick_menu, Some(Point::new(80.0, 91.0)));
    assert_eq!(placed.column_quick_menu, Some(Point::new(340.0, 30.0)));
    assert!(placed.resize_preview.is_none());
}

#[test]
fn missing_geometry_hides_controls() {
    let editor = paragraphs(&["a", "b"]);
    let mut layout = layout_for(&editor);
    let mut overlay = BlockOverlay::default();
    overlay.on_pointer_move(
        &editor,
        &layout,
        &PointerEvent::new(1, inside(&layout, 1, 5.0), HitTarget::Tree(vec![1]), 0),
    );
    overlay.open_menu(1);
    layout.blocks[1].rect.top = f64::NAN;

    let placed = overlay.overlay_layout(&layout, MENU, PANEL);
    assert!(placed.gutter.is_none());
    assert!(placed.menu.is_none());
}
