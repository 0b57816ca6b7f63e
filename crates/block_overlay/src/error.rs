use plate_core::{ApplyError, TableError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("block {0} no longer exists")]
    StaleBlock(usize),

    #[error("block {0} is not a table")]
    NotATable(usize),

    #[error("cell ({row}, {col}) of table {table} no longer exists")]
    StaleCell { table: usize, row: usize, col: usize },

    #[error("document is read-only")]
    ReadOnly,

    #[error("layout produced non-finite geometry")]
    InvalidGeometry,

    #[error("edit rejected: {0}")]
    Apply(#[from] ApplyError),

    #[error("table edit rejected: {0}")]
    Table(#[from] TableError),
}
