use serde::{Deserialize, Serialize};

use crate::schedule::Millis;

/// Tunables for the overlay engine. Every field has a default, so a JSON
/// document only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Pointer travel before a drag-handle press turns into a reorder.
    pub drag_threshold_px: f64,
    pub hover_clear_delay_ms: Millis,
    pub table_hover_clear_delay_ms: Millis,

    pub table_zone_side_margin_px: f64,
    pub table_zone_top_margin_px: f64,
    pub table_zone_footer_buffer_px: f64,
    /// Right hit-zone margin as a fraction of the last column's width.
    pub table_zone_right_cell_factor: f64,

    pub axis_lock_threshold_px: f64,
    pub row_snap_min_px: f64,
    pub row_snap_max_px: f64,
    pub col_snap_min_px: f64,
    pub col_snap_max_px: f64,

    pub gutter_offset_px: f64,
    pub gutter_button_gap_px: f64,
    pub screen_margin_px: f64,
    pub menu_flip_threshold_px: f64,
    pub menu_min_height_px: f64,
    pub menu_max_height_px: f64,
    pub menu_gap_px: f64,
    pub quick_menu_icon_px: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 5.0,
            hover_clear_delay_ms: 700,
            table_hover_clear_delay_ms: 1400,
            table_zone_side_margin_px: 24.0,
            table_zone_top_margin_px: 12.0,
            table_zone_footer_buffer_px: 16.0,
            table_zone_right_cell_factor: 0.8,
            axis_lock_threshold_px: 10.0,
            row_snap_min_px: 26.0,
            row_snap_max_px: 52.0,
            col_snap_min_px: 72.0,
            col_snap_max_px: 180.0,
            gutter_offset_px: 56.0,
            gutter_button_gap_px: 22.0,
            screen_margin_px: 8.0,
            menu_flip_threshold_px: 220.0,
            menu_min_height_px: 140.0,
            menu_max_height_px: 420.0,
            menu_gap_px: 6.0,
            quick_menu_icon_px: 20.0,
        }
    }
}

impl OverlayConfig {
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            OverlayConfig::from_json_str(r#"{ "drag_threshold_px": 8, "hover_clear_delay_ms": 500 }"#)
                .unwrap();
        assert_eq!(config.drag_threshold_px, 8.0);
        assert_eq!(config.hover_clear_delay_ms, 500);
        assert_eq!(config.table_hover_clear_delay_ms, 1400);
        assert_eq!(config.row_snap_min_px, 26.0);
    }

    #[test]
    fn pretty_json_round_trips() {
        let config = OverlayConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(OverlayConfig::from_json_str(&json).unwrap(), config);
    }
}
