//! Column types and the aggregate-function registry

use serde::{Deserialize, Serialize};

use crate::table::Scalar;

/// Aggregate functions accepted by groupBy compilation.
///
/// `Null` and `NullStr` are sentinels: the aggregated column renders as a
/// SQL `null` for every group. `NullStr` exists because some dialects need
/// a string-typed null to keep UNION legs type-compatible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFn {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    Uniq,
    Null,
    #[serde(rename = "nullstr")]
    NullStr,
    Any,
    Mode,
}

impl std::fmt::Display for AggFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AggFn::Sum => "sum",
            AggFn::Avg => "avg",
            AggFn::Min => "min",
            AggFn::Max => "max",
            AggFn::Count => "count",
            AggFn::Uniq => "uniq",
            AggFn::Null => "null",
            AggFn::NullStr => "nullstr",
            AggFn::Any => "any",
            AggFn::Mode => "mode",
        };
        f.write_str(s)
    }
}

/// Value domain of a column, independent of any dialect's type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    String,
    Integer,
    Real,
    Boolean,
    Date,
    Timestamp,
}

impl ColumnKind {
    /// Default aggregate for columns of this kind: numerics sum, strings
    /// and booleans collapse to their unique value, temporal kinds render
    /// as null.
    pub fn default_agg(&self) -> AggFn {
        match self {
            ColumnKind::Integer | ColumnKind::Real => AggFn::Sum,
            ColumnKind::String | ColumnKind::Boolean => AggFn::Uniq,
            ColumnKind::Date | ColumnKind::Timestamp => AggFn::Null,
        }
    }
}

/// A dialect column type: the dialect's SQL type name plus the portable
/// kind it maps to and the aggregate used when groupBy gets a bare column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnType {
    /// Type name as it appears in DDL and CAST expressions (e.g. `TEXT`)
    pub sql_type_name: String,
    /// Portable value domain
    pub kind: ColumnKind,
    /// Aggregate applied when no explicit one is given
    pub default_agg: AggFn,
}

impl ColumnType {
    /// Create a column type with the kind's default aggregate
    pub fn new(sql_type_name: &str, kind: ColumnKind) -> Self {
        Self {
            sql_type_name: sql_type_name.to_string(),
            kind,
            default_agg: kind.default_agg(),
        }
    }

    /// Returns true if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Integer | ColumnKind::Real)
    }

    /// Returns true if this is a string type
    pub fn is_string(&self) -> bool {
        matches!(self.kind, ColumnKind::String)
    }

    /// Render a cell value for display. Nulls render as the empty string.
    pub fn string_render(&self, val: &Scalar) -> String {
        match val {
            Scalar::Null => String::new(),
            other => other.to_string(),
        }
    }
}
