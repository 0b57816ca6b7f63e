//! Placement of the floating block controls.
//!
//! Everything here is a pure function of the current rectangles; callers
//! recompute on every scroll or resize instead of caching results.

use serde::Serialize;

use crate::config::OverlayConfig;
use crate::geometry::{Point, Rect, Size};

/// Add-block button and drag handle, side by side in the gutter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GutterControls {
    pub add_button: Point,
    pub drag_handle: Point,
}

pub fn gutter_controls(shell: Rect, block: Rect, config: &OverlayConfig) -> Option<GutterControls> {
    if !shell.is_finite() || !block.is_finite() {
        return None;
    }
    let x = (shell.left - config.gutter_offset_px).max(config.screen_margin_px);
    let y = block.top;
    Some(GutterControls {
        add_button: Point::new(x, y),
        drag_handle: Point::new(x + config.gutter_button_gap_px, y),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuSide {
    Below,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MenuPlacement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    /// Rendered height: the menu's natural height capped at `max_height`.
    pub height: f64,
    pub max_height: f64,
    pub side: MenuSide,
}

impl MenuPlacement {
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.left, self.top, self.width, self.height)
    }
}

/// Places the hover/context menu for `anchor`, below by default and above
/// when the space below is short and the space above is larger.
pub fn hover_menu(
    anchor: Rect,
    menu: Size,
    viewport: Size,
    config: &OverlayConfig,
) -> Option<MenuPlacement> {
    if !anchor.is_finite() || !menu.is_finite() || !viewport.is_finite() {
        return None;
    }
    let gap = config.menu_gap_px;
    let margin = config.screen_margin_px;

    let space_below = viewport.height - anchor.bottom - gap - margin;
    let space_above = anchor.top - gap - margin;
    let side = if space_below < config.menu_flip_threshold_px && space_above > space_below {
        MenuSide::Above
    } else {
        MenuSide::Below
    };

    let available = match side {
        MenuSide::Below => space_below,
        MenuSide::Above => space_above,
    };
    let max_height = available
        .min(config.menu_max_height_px)
        .max(config.menu_min_height_px);
    let height = menu.height.max(0.0).min(max_height);

    let top = match side {
        MenuSide::Below => anchor.bottom + gap,
        MenuSide::Above => anchor.top - gap - height,
    };
    let max_top = (viewport.height - margin - height).max(margin);
    let top = top.clamp(margin, max_top);

    let width = menu.width.max(0.0);
    let max_left = (viewport.width - margin - width).max(margin);
    let left = anchor.left.clamp(margin, max_left);

    Some(MenuPlacement {
        left,
        top,
        width,
        height,
        max_height,
        side,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelSide {
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelPlacement {
    pub left: f64,
    pub top: f64,
    pub side: PanelSide,
}

/// Color sub-panel beside an open menu. Vertically it lines up with the
/// menu's top edge, or its bottom edge when the menu opened upwards.
pub fn color_panel(
    menu: &MenuPlacement,
    panel: Size,
    viewport: Size,
    config: &OverlayConfig,
) -> Option<PanelPlacement> {
    if !menu.rect().is_finite() || !panel.is_finite() || !viewport.is_finite() {
        return None;
    }
    let gap = config.menu_gap_px;
    let margin = config.screen_margin_px;

    let right_left = menu.left + menu.width + gap;
    let (left, side) = if right_left + panel.width <= viewport.width - margin {
        (right_left, PanelSide::Right)
    } else {
        ((menu.left - gap - panel.width).max(margin), PanelSide::Left)
    };

    let top = match menu.side {
        MenuSide::Below => menu.top,
        MenuSide::Above => menu.top + menu.height - panel.height,
    };
    let max_top = (viewport.height - margin - panel.height).max(margin);

    Some(PanelPlacement {
        left,
        top: top.clamp(margin, max_top),
        side,
    })
}

/// Row actions sit left of the table, level with the hovered cell's center.
pub fn row_quick_menu(cell: Rect, table: Rect, config: &OverlayConfig) -> Option<Point> {
    if !cell.is_finite() || !table.is_finite() {
        return None;
    }
    let icon = config.quick_menu_icon_px;
    Some(Point::new(table.left - icon, cell.center().y - icon / 2.0))
}

/// Column actions sit above the table, centered on the hovered cell.
pub fn column_quick_menu(cell: Rect, table: Rect, config: &OverlayConfig) -> Option<Point> {
    if !cell.is_finite() || !table.is_finite() {
        return None;
    }
    let icon = config.quick_menu_icon_px;
    Some(Point::new(cell.center().x - icon / 2.0, table.top - icon))
}
