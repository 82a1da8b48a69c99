//! Table values: scalars, rows and materialized results

use serde::{Deserialize, Serialize};

use crate::schema::Schema;
use crate::types::ColumnKind;

/// A single cell value.
///
/// Serialized untagged so rows read as plain JSON arrays
/// (`[null, true, 42, "x"]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

impl Scalar {
    /// Returns true for the SQL null value
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// The column kind a literal of this value would have, or `None` for
    /// null (whose type cannot be inferred).
    pub fn const_kind(&self) -> Option<ColumnKind> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(_) => Some(ColumnKind::Boolean),
            Scalar::Int(_) => Some(ColumnKind::Integer),
            Scalar::Real(_) => Some(ColumnKind::Real),
            Scalar::Str(_) => Some(ColumnKind::String),
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Real(x) => write!(f, "{x}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Real(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

/// One result row, aligned with `schema.columns`
pub type Row = Vec<Scalar>;

/// A materialized query result: schema plus row data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRep {
    pub schema: Schema,
    pub row_data: Vec<Row>,
}

impl TableRep {
    pub fn new(schema: Schema, row_data: Vec<Row>) -> Self {
        Self { schema, row_data }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.row_data.len()
    }

    /// Whether the result has no rows
    pub fn is_empty(&self) -> bool {
        self.row_data.is_empty()
    }

    /// Get a cell by row index and column id
    pub fn get(&self, row: usize, col_id: &str) -> Option<&Scalar> {
        let idx = self.schema.column_index(col_id)?;
        self.row_data.get(row)?.get(idx)
    }
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
