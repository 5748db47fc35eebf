// File: crates/chart-index/src/error.rs
// Summary: Error type shared by series construction, calendar tables and options loading.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// A value channel disagrees with the x channel in length.
    #[error("length mismatch: `{channel}` has {actual} samples, expected {expected}")]
    LengthMismatch {
        channel: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A calendar unit names a parent that does not appear earlier in the table.
    #[error("calendar unit `{unit}` declares unknown parent `{parent}`")]
    UnknownParent {
        unit: &'static str,
        parent: &'static str,
    },

    /// Two calendar units share a name or the same unit and multiple.
    #[error("calendar unit `{unit}` duplicates an earlier entry")]
    DuplicateUnit { unit: &'static str },

    #[error("invalid index options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
