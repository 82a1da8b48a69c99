//! Error types for ql-rel

use thiserror::Error;

/// Query compilation error type.
///
/// Every error aborts the whole compilation; no partial schema or SQL is
/// ever returned and nothing is retried.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Q001: Table name not present in the catalog
    #[error("[Q001] Unknown table '{table}'")]
    UnknownTable { table: String },

    /// Q002: Referenced column absent from the inferred input schema
    #[error("[Q002] Unknown column '{column}' in {context}")]
    UnknownColumn { column: String, context: String },

    /// Q003: concat operands disagree on columns or types
    #[error("[Q003] Schema mismatch in concat: {detail}")]
    SchemaMismatch { detail: String },

    /// Q004: Join type other than LeftOuter
    #[error("[Q004] Unsupported join type '{join_type}'")]
    UnsupportedJoin { join_type: String },

    /// Q005: extend expression without an explicit type and not a handled form
    #[error("[Q005] Cannot infer column type for extend expression: {expr}")]
    TypeInferenceFailed { expr: String },

    /// Q006: Operator tag not known to inference or lowering
    #[error("[Q006] Invalid operator '{operator}'")]
    InvalidOperator { operator: String },

    /// Q007: Malformed wire payload
    #[error("[Q007] Invalid wire payload: {detail}")]
    InvalidWire { detail: String },

    /// Q008: Core error propagation
    #[error("[Q008] Core error: {0}")]
    Core(#[from] ql_core::CoreError),

    /// Q009: JSON serialization/deserialization error
    #[error("[Q009] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for QueryError
pub type QueryResult<T> = Result<T, QueryError>;
