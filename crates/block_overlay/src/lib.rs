mod bulk;
mod config;
mod decorations;
mod engine;
mod error;
mod geometry;
mod grid_resize;
mod hover;
mod layout;
mod overlay;
mod pointer;
mod reorder;
mod schedule;
mod selection;
mod surface;

pub use bulk::*;
pub use config::OverlayConfig;
pub use decorations::*;
pub use engine::*;
pub use error::OverlayError;
pub use geometry::*;
pub use grid_resize::*;
pub use hover::*;
pub use layout::*;
pub use overlay::*;
pub use pointer::*;
pub use reorder::*;
pub use schedule::*;
pub use selection::*;
pub use surface::*;
