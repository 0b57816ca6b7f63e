mod core;
mod normalize;
mod ops;
mod table;

pub use crate::core::*;
pub use crate::ops::*;
pub use crate::table::*;
