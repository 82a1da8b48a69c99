//! Error types for ql-core

use thiserror::Error;

/// Core error type for Quill
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Extending or remapping a schema produced a duplicate column id
    #[error("[C001] Duplicate column '{column}' in schema")]
    DuplicateColumn { column: String },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
