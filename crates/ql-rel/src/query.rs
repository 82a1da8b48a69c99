//! Relational query IR and the fluent builder
//!
//! `QueryRep` is the canonical tagged tree; the `operator` tag is the
//! discriminator and the sole source of dispatch in inference and
//! lowering. Trees are persistent: builder methods wrap the current rep
//! as the `from` of a new node, subtrees are shared via `Arc` and never
//! mutated.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ql_core::{AggFn, ColumnType, Scalar};

use crate::filter::FilterExp;

/// Join kinds in the operator vocabulary. Only `LeftOuter` is supported
/// by inference and lowering; the rest exist so the error path is
/// exercised rather than a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    LeftOuter,
    Inner,
    RightOuter,
    FullOuter,
}

impl std::fmt::Display for JoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JoinType::LeftOuter => write!(f, "LEFT OUTER"),
            JoinType::Inner => write!(f, "INNER"),
            JoinType::RightOuter => write!(f, "RIGHT OUTER"),
            JoinType::FullOuter => write!(f, "FULL OUTER"),
        }
    }
}

/// One aggregation in a groupBy: either a bare column (aggregate chosen
/// from the column type's default) or an explicit (fn, column) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggSpec {
    Default(String),
    Explicit(AggFn, String),
}

impl AggSpec {
    /// The column id this aggregation is over (also its output id)
    pub fn col_id(&self) -> &str {
        match self {
            AggSpec::Default(col) => col,
            AggSpec::Explicit(_, col) => col,
        }
    }
}

impl From<&str> for AggSpec {
    fn from(col: &str) -> Self {
        AggSpec::Default(col.to_string())
    }
}

impl From<String> for AggSpec {
    fn from(col: String) -> Self {
        AggSpec::Default(col)
    }
}

impl From<(AggFn, &str)> for AggSpec {
    fn from((agg, col): (AggFn, &str)) -> Self {
        AggSpec::Explicit(agg, col.to_string())
    }
}

/// Renaming/relabeling entry for mapColumns. A `None` id keeps the
/// column id and only touches metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ColumnMapInfo {
    /// Rename to a new column id
    pub fn renamed(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            display_name: None,
        }
    }

    /// Keep the id, change the display name
    pub fn relabeled(display_name: &str) -> Self {
        Self {
            id: None,
            display_name: Some(display_name.to_string()),
        }
    }
}

/// Expression forms accepted by extend.
///
/// The set is deliberately closed: a form outside it has no type
/// inference rule and no SQL rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "expType")]
pub enum ColumnExtendExp {
    ColRef {
        #[serde(rename = "colName")]
        col_name: String,
    },
    ConstVal {
        val: Scalar,
    },
    AsString {
        exp: Box<ColumnExtendExp>,
    },
}

impl ColumnExtendExp {
    pub fn col(name: impl Into<String>) -> Self {
        ColumnExtendExp::ColRef {
            col_name: name.into(),
        }
    }

    pub fn constant(val: impl Into<Scalar>) -> Self {
        ColumnExtendExp::ConstVal { val: val.into() }
    }

    pub fn as_string(inner: ColumnExtendExp) -> Self {
        ColumnExtendExp::AsString {
            exp: Box::new(inner),
        }
    }
}

/// Options accepted by extend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendOpts {
    /// Explicit column type; skips inference when present
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    /// Display name; defaults to the column id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ExtendOpts {
    pub fn with_type(column_type: ColumnType) -> Self {
        Self {
            column_type: Some(column_type),
            display_name: None,
        }
    }
}

/// The relational operator tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QueryRep {
    Table {
        table_name: String,
    },
    Project {
        cols: Vec<String>,
        from: Arc<QueryRep>,
    },
    Filter {
        fexp: FilterExp,
        from: Arc<QueryRep>,
    },
    GroupBy {
        cols: Vec<String>,
        aggs: Vec<AggSpec>,
        from: Arc<QueryRep>,
    },
    MapColumns {
        cmap: HashMap<String, ColumnMapInfo>,
        from: Arc<QueryRep>,
    },
    MapColumnsByIndex {
        cmap: HashMap<usize, ColumnMapInfo>,
        from: Arc<QueryRep>,
    },
    Concat {
        from: Arc<QueryRep>,
        target: Arc<QueryRep>,
    },
    Sort {
        keys: Vec<(String, bool)>,
        from: Arc<QueryRep>,
    },
    Extend {
        col_id: String,
        col_exp: ColumnExtendExp,
        opts: ExtendOpts,
        from: Arc<QueryRep>,
    },
    Join {
        lhs: Arc<QueryRep>,
        rhs: Arc<QueryRep>,
        on: Vec<String>,
        join_type: JoinType,
    },
}

impl QueryRep {
    /// The operator tag as it appears on the wire
    pub fn operator(&self) -> &'static str {
        match self {
            QueryRep::Table { .. } => "table",
            QueryRep::Project { .. } => "project",
            QueryRep::Filter { .. } => "filter",
            QueryRep::GroupBy { .. } => "groupBy",
            QueryRep::MapColumns { .. } => "mapColumns",
            QueryRep::MapColumnsByIndex { .. } => "mapColumnsByIndex",
            QueryRep::Concat { .. } => "concat",
            QueryRep::Sort { .. } => "sort",
            QueryRep::Extend { .. } => "extend",
            QueryRep::Join { .. } => "join",
        }
    }
}

/// Fluent query builder over a shared [`QueryRep`] tree.
///
/// The builder performs no validation: unknown tables, missing columns
/// and schema mismatches surface during schema inference or SQL
/// lowering, never at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExp {
    rep: Arc<QueryRep>,
}

/// Seed a query at a base table
pub fn table_query(table_name: impl Into<String>) -> QueryExp {
    QueryExp::from_rep(Arc::new(QueryRep::Table {
        table_name: table_name.into(),
    }))
}

impl QueryExp {
    pub(crate) fn from_rep(rep: Arc<QueryRep>) -> Self {
        Self { rep }
    }

    /// The underlying IR node
    pub fn rep(&self) -> &QueryRep {
        &self.rep
    }

    /// Shared handle on the underlying IR node
    pub fn rep_arc(&self) -> Arc<QueryRep> {
        Arc::clone(&self.rep)
    }

    fn wrap(&self, rep: QueryRep) -> QueryExp {
        QueryExp::from_rep(Arc::new(rep))
    }

    /// Keep only `cols`, in the given order
    pub fn project<S: Into<String>>(&self, cols: impl IntoIterator<Item = S>) -> QueryExp {
        self.wrap(QueryRep::Project {
            cols: cols.into_iter().map(Into::into).collect(),
            from: self.rep_arc(),
        })
    }

    /// Keep only rows satisfying `fexp`
    pub fn filter(&self, fexp: FilterExp) -> QueryExp {
        self.wrap(QueryRep::Filter {
            fexp,
            from: self.rep_arc(),
        })
    }

    /// Group on `cols`, aggregating each entry of `aggs`
    pub fn group_by<C, A>(
        &self,
        cols: impl IntoIterator<Item = C>,
        aggs: impl IntoIterator<Item = A>,
    ) -> QueryExp
    where
        C: Into<String>,
        A: Into<AggSpec>,
    {
        self.wrap(QueryRep::GroupBy {
            cols: cols.into_iter().map(Into::into).collect(),
            aggs: aggs.into_iter().map(Into::into).collect(),
            from: self.rep_arc(),
        })
    }

    /// Distinct values of one column: groupBy on it with no aggregations
    pub fn distinct(&self, col: impl Into<String>) -> QueryExp {
        self.group_by([col.into()], Vec::<AggSpec>::new())
    }

    /// Rename/relabel columns by id
    pub fn map_columns(&self, cmap: HashMap<String, ColumnMapInfo>) -> QueryExp {
        self.wrap(QueryRep::MapColumns {
            cmap,
            from: self.rep_arc(),
        })
    }

    /// Rename/relabel columns by ordinal position
    pub fn map_columns_by_index(&self, cmap: HashMap<usize, ColumnMapInfo>) -> QueryExp {
        self.wrap(QueryRep::MapColumnsByIndex {
            cmap,
            from: self.rep_arc(),
        })
    }

    /// Append the rows of `target` (schemas must agree)
    pub fn concat(&self, target: &QueryExp) -> QueryExp {
        self.wrap(QueryRep::Concat {
            from: self.rep_arc(),
            target: target.rep_arc(),
        })
    }

    /// Order rows by `(column, ascending)` keys
    pub fn sort<S: Into<String>>(&self, keys: impl IntoIterator<Item = (S, bool)>) -> QueryExp {
        self.wrap(QueryRep::Sort {
            keys: keys.into_iter().map(|(c, asc)| (c.into(), asc)).collect(),
            from: self.rep_arc(),
        })
    }

    /// Append a computed column
    pub fn extend(
        &self,
        col_id: impl Into<String>,
        col_exp: ColumnExtendExp,
        opts: ExtendOpts,
    ) -> QueryExp {
        self.wrap(QueryRep::Extend {
            col_id: col_id.into(),
            col_exp,
            opts,
            from: self.rep_arc(),
        })
    }

    /// Left-outer join on the given column(s)
    pub fn join<S: Into<String>>(
        &self,
        rhs: &QueryExp,
        on: impl IntoIterator<Item = S>,
        join_type: JoinType,
    ) -> QueryExp {
        self.wrap(QueryRep::Join {
            lhs: self.rep_arc(),
            rhs: rhs.rep_arc(),
            on: on.into_iter().map(Into::into).collect(),
            join_type,
        })
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
