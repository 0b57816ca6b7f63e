use plate_core::Path;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::grid_resize::GridHandle;
use crate::schedule::Millis;

pub type PointerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
}

/// Floating block-control UI the pointer can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    AddBlock,
    DragHandle,
    GridHandle(GridHandle),
    HoverMenu,
    ColorPanel,
    RowQuickMenu,
    ColumnQuickMenu,
}

/// What lies under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTarget {
    /// A rendered document element, identified by its document path.
    Tree(Path),
    Control(Control),
    #[default]
    None,
}

impl HitTarget {
    pub fn tree_path(&self) -> Option<&[usize]> {
        match self {
            HitTarget::Tree(path) => Some(path),
            HitTarget::Control(_) | HitTarget::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub position: Point,
    #[serde(default)]
    pub target: HitTarget,
    #[serde(default)]
    pub button: PointerButton,
    #[serde(default)]
    pub shift: bool,
    pub time: Millis,
}

impl PointerEvent {
    pub fn new(pointer_id: PointerId, position: Point, target: HitTarget, time: Millis) -> Self {
        Self {
            pointer_id,
            position,
            target,
            button: PointerButton::Primary,
            shift: false,
            time,
        }
    }

    pub fn shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}
