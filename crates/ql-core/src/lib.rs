//! ql-core: shared vocabulary for the Quill query compiler
//!
//! This crate provides the column type registry, SQL dialect abstraction,
//! relation schemas and materialized table values. It has no query logic;
//! the IR, schema inference and SQL compilation live in ql-rel.

pub mod dialect;
pub mod error;
pub mod schema;
pub mod table;
pub mod types;

pub use dialect::{
    default_dialect, duckdb_dialect, sqlite_dialect, CoreColumnTypes, Dialect, DuckDbDialect,
    SqliteDialect,
};
pub use error::{CoreError, CoreResult};
pub use schema::{ColumnMetadata, Schema, TableInfo, TableInfoMap};
pub use table::{Row, Scalar, TableRep};
pub use types::{AggFn, ColumnKind, ColumnType};
