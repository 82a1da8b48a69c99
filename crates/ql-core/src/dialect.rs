//! SQL dialect abstraction
//!
//! A dialect is an immutable value injected into every compilation call.
//! It owns the mapping from portable column kinds to concrete SQL type
//! names, identifier quoting, and string-literal escaping. No ambient
//! global dialect exists; `default_dialect` is only for diagnostic
//! messages formed before a dialect is known.

use std::sync::OnceLock;

use crate::types::{ColumnKind, ColumnType};

/// The six core column types every dialect must provide
#[derive(Debug, Clone, PartialEq)]
pub struct CoreColumnTypes {
    pub string: ColumnType,
    pub integer: ColumnType,
    pub real: ColumnType,
    pub boolean: ColumnType,
    pub date: ColumnType,
    pub timestamp: ColumnType,
}

impl CoreColumnTypes {
    /// The core type for a given kind
    pub fn for_kind(&self, kind: ColumnKind) -> &ColumnType {
        match kind {
            ColumnKind::String => &self.string,
            ColumnKind::Integer => &self.integer,
            ColumnKind::Real => &self.real,
            ColumnKind::Boolean => &self.boolean,
            ColumnKind::Date => &self.date,
            ColumnKind::Timestamp => &self.timestamp,
        }
    }
}

/// Trait for SQL dialect implementations
pub trait Dialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Core column types for this dialect
    fn core_types(&self) -> &CoreColumnTypes;

    /// Quote a column or table identifier
    fn quote_col(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Escape a string for embedding in a single-quoted SQL literal
    fn escape_string(&self, s: &str) -> String {
        s.replace('\'', "''")
    }

    /// Render a boolean literal
    fn render_bool(&self, val: bool) -> &'static str;
}

/// SQLite dialect: dynamic typing with TEXT/INTEGER/REAL storage classes,
/// booleans and temporal values stored as INTEGER/TEXT.
pub struct SqliteDialect {
    core_types: CoreColumnTypes,
}

impl SqliteDialect {
    pub fn new() -> Self {
        Self {
            core_types: CoreColumnTypes {
                string: ColumnType::new("TEXT", ColumnKind::String),
                integer: ColumnType::new("INTEGER", ColumnKind::Integer),
                real: ColumnType::new("REAL", ColumnKind::Real),
                boolean: ColumnType::new("INTEGER", ColumnKind::Boolean),
                date: ColumnType::new("TEXT", ColumnKind::Date),
                timestamp: ColumnType::new("TEXT", ColumnKind::Timestamp),
            },
        }
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn core_types(&self) -> &CoreColumnTypes {
        &self.core_types
    }

    fn render_bool(&self, val: bool) -> &'static str {
        if val {
            "1"
        } else {
            "0"
        }
    }
}

/// DuckDB dialect
pub struct DuckDbDialect {
    core_types: CoreColumnTypes,
}

impl DuckDbDialect {
    pub fn new() -> Self {
        Self {
            core_types: CoreColumnTypes {
                string: ColumnType::new("VARCHAR", ColumnKind::String),
                integer: ColumnType::new("BIGINT", ColumnKind::Integer),
                real: ColumnType::new("DOUBLE", ColumnKind::Real),
                boolean: ColumnType::new("BOOLEAN", ColumnKind::Boolean),
                date: ColumnType::new("DATE", ColumnKind::Date),
                timestamp: ColumnType::new("TIMESTAMP", ColumnKind::Timestamp),
            },
        }
    }
}

impl Default for DuckDbDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn core_types(&self) -> &CoreColumnTypes {
        &self.core_types
    }

    fn render_bool(&self, val: bool) -> &'static str {
        if val {
            "TRUE"
        } else {
            "FALSE"
        }
    }
}

/// Shared SQLite dialect instance
pub fn sqlite_dialect() -> &'static SqliteDialect {
    static INSTANCE: OnceLock<SqliteDialect> = OnceLock::new();
    INSTANCE.get_or_init(SqliteDialect::new)
}

/// Shared DuckDB dialect instance
pub fn duckdb_dialect() -> &'static DuckDbDialect {
    static INSTANCE: OnceLock<DuckDbDialect> = OnceLock::new();
    INSTANCE.get_or_init(DuckDbDialect::new)
}

/// Dialect used for diagnostics formed before a dialect is known
pub fn default_dialect() -> &'static dyn Dialect {
    sqlite_dialect()
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
