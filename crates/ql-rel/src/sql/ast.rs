//! SQL AST emitted by lowering and consumed by the pretty-printer
//!
//! A query is a list of SELECT statements; sibling statements render as
//! UNION ALL legs. The shape is deliberately flat — fusion in lowering
//! keeps the nesting shallow, so most queries are a single SELECT.

use serde::{Deserialize, Serialize};

use ql_core::{AggFn, ColumnType, Scalar};

use crate::filter::FilterExp;
use crate::query::JoinType;

/// A column-level expression in a SELECT list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlColExp {
    /// Bare column reference
    Col(String),
    /// Literal value
    Const(Scalar),
    /// Aggregate applied to a column
    Agg(AggFn, String),
    /// `count(*)` (used by the count wrapper)
    CountAll,
    /// Cast to the dialect's string type
    CastString(Box<SqlColExp>),
}

/// One entry of a SELECT list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectItem {
    pub col_exp: SqlColExp,
    pub col_type: ColumnType,
    pub alias: Option<String>,
}

impl SelectItem {
    /// A bare, unaliased column
    pub fn bare(col: &str, col_type: ColumnType) -> Self {
        Self {
            col_exp: SqlColExp::Col(col.to_string()),
            col_type,
            alias: None,
        }
    }

    /// The output column id this item binds: its alias when set, else
    /// the bare column name. Aggregates and constants always carry an
    /// alias, so `None` only arises for malformed items.
    pub fn output_id(&self) -> Option<&str> {
        match (&self.alias, &self.col_exp) {
            (Some(a), _) => Some(a),
            (None, SqlColExp::Col(c)) => Some(c),
            _ => None,
        }
    }

    /// True for a bare unaliased column reference — the shape groupBy
    /// fusion requires of every existing item.
    pub fn is_bare_col(&self) -> bool {
        self.alias.is_none() && matches!(self.col_exp, SqlColExp::Col(_))
    }
}

/// ORDER BY key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub col: String,
    pub asc: bool,
}

/// FROM clause of a SELECT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlFrom {
    /// Base table reference
    Table(String),
    /// Derived table (wrapped subquery)
    Sub(Box<SqlQueryAst>),
    /// Join of two subqueries
    Join {
        join_type: JoinType,
        lhs: Box<SqlQueryAst>,
        rhs: Box<SqlQueryAst>,
    },
}

/// One SELECT statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlSelectAst {
    pub select_cols: Vec<SelectItem>,
    pub from: SqlFrom,
    pub where_exp: Option<FilterExp>,
    /// USING column list, set only for join FROMs
    pub on: Option<Vec<String>>,
    pub group_by: Vec<String>,
    pub order_by: Vec<SortKey>,
}

impl SqlSelectAst {
    /// A SELECT over `from` with everything else empty
    pub fn new(select_cols: Vec<SelectItem>, from: SqlFrom) -> Self {
        Self {
            select_cols,
            from,
            where_exp: None,
            on: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// Pass-through items referencing this statement's output ids.
    /// Used when an operator wraps this statement as a derived table:
    /// the outer SELECT must reference aliases, never expressions.
    pub fn pass_through_cols(&self) -> Vec<SelectItem> {
        self.select_cols
            .iter()
            .map(|item| {
                let id = item.output_id().unwrap_or_default();
                SelectItem::bare(id, item.col_type.clone())
            })
            .collect()
    }
}

/// A full query: one or more SELECTs combined with UNION ALL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlQueryAst {
    pub select_stmts: Vec<SqlSelectAst>,
}

impl SqlQueryAst {
    /// A query with a single SELECT
    pub fn single(stmt: SqlSelectAst) -> Self {
        Self {
            select_stmts: vec![stmt],
        }
    }

    /// The sole SELECT, when there is exactly one
    pub fn as_single(&self) -> Option<&SqlSelectAst> {
        match self.select_stmts.as_slice() {
            [stmt] => Some(stmt),
            _ => None,
        }
    }

    /// Mutable access to the sole SELECT, when there is exactly one
    pub fn as_single_mut(&mut self) -> Option<&mut SqlSelectAst> {
        match self.select_stmts.as_mut_slice() {
            [stmt] => Some(stmt),
            _ => None,
        }
    }

    /// Pass-through items for wrapping this query as a derived table.
    /// All UNION legs share one output schema, so the first leg's ids
    /// stand for the whole query.
    pub fn pass_through_cols(&self) -> Vec<SelectItem> {
        self.select_stmts
            .first()
            .map(SqlSelectAst::pass_through_cols)
            .unwrap_or_default()
    }
}
