//! SQL pretty-printer
//!
//! Renders the SQL AST to a dialect-specific string. The printer owns
//! identifier quoting, literal escaping, UNION ALL formatting and the
//! offset/limit suffix; lowering never sees any of it.

use ql_core::{AggFn, Dialect, Scalar};

use crate::filter::{BinRelOp, BoolOp, FilterExp, RelExp, SubExp, UnaryRelOp, ValExp};
use crate::sql::ast::{SelectItem, SqlColExp, SqlFrom, SqlQueryAst, SqlSelectAst};

/// Render a query AST to SQL. `offset`/`limit` of `-1` mean none.
pub fn pp_sql_query_ast(
    dialect: &dyn Dialect,
    ast: &SqlQueryAst,
    offset: i64,
    limit: i64,
) -> String {
    let mut sql = ast
        .select_stmts
        .iter()
        .map(|stmt| pp_select(dialect, stmt))
        .collect::<Vec<_>>()
        .join(" UNION ALL ");
    if limit >= 0 {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    if offset >= 0 {
        sql.push_str(&format!(" OFFSET {offset}"));
    }
    sql
}

impl SqlQueryAst {
    /// Render without paging
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        pp_sql_query_ast(dialect, self, -1, -1)
    }

    /// Render with an offset/limit suffix (`-1` = none)
    pub fn to_sql_paged(&self, dialect: &dyn Dialect, offset: i64, limit: i64) -> String {
        pp_sql_query_ast(dialect, self, offset, limit)
    }
}

fn pp_select(dialect: &dyn Dialect, stmt: &SqlSelectAst) -> String {
    let cols = stmt
        .select_cols
        .iter()
        .map(|item| pp_select_item(dialect, item))
        .collect::<Vec<_>>()
        .join(", ");
    let mut sql = format!(
        "SELECT {cols} FROM {}",
        pp_from(dialect, &stmt.from, stmt.on.as_deref())
    );
    if let Some(fexp) = &stmt.where_exp {
        let rendered = pp_filter_exp(dialect, fexp);
        if !rendered.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&rendered);
        }
    }
    if !stmt.group_by.is_empty() {
        let keys = stmt
            .group_by
            .iter()
            .map(|c| dialect.quote_col(c))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" GROUP BY ");
        sql.push_str(&keys);
    }
    if !stmt.order_by.is_empty() {
        let keys = stmt
            .order_by
            .iter()
            .map(|k| {
                format!(
                    "{} {}",
                    dialect.quote_col(&k.col),
                    if k.asc { "ASC" } else { "DESC" }
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys);
    }
    sql
}

fn pp_from(dialect: &dyn Dialect, from: &SqlFrom, on: Option<&[String]>) -> String {
    match from {
        SqlFrom::Table(name) => dialect.quote_col(name),
        SqlFrom::Sub(sub) => format!("({})", sub.to_sql(dialect)),
        SqlFrom::Join {
            join_type,
            lhs,
            rhs,
        } => {
            let using = on
                .filter(|cols| !cols.is_empty())
                .map(|cols| {
                    let quoted = cols
                        .iter()
                        .map(|c| dialect.quote_col(c))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!(" USING ({quoted})")
                })
                .unwrap_or_default();
            format!(
                "({}) {join_type} JOIN ({}){using}",
                lhs.to_sql(dialect),
                rhs.to_sql(dialect)
            )
        }
    }
}

fn pp_select_item(dialect: &dyn Dialect, item: &SelectItem) -> String {
    let exp = pp_col_exp(dialect, &item.col_exp);
    match &item.alias {
        // A bare column aliased to its own name needs no AS clause
        Some(alias) if !matches!(&item.col_exp, SqlColExp::Col(c) if c == alias) => {
            format!("{exp} AS {}", dialect.quote_col(alias))
        }
        _ => exp,
    }
}

fn pp_col_exp(dialect: &dyn Dialect, exp: &SqlColExp) -> String {
    match exp {
        SqlColExp::Col(col) => dialect.quote_col(col),
        SqlColExp::Const(val) => pp_literal(dialect, val),
        SqlColExp::Agg(agg_fn, col) => pp_agg(dialect, *agg_fn, col),
        SqlColExp::CountAll => "count(*)".to_string(),
        SqlColExp::CastString(inner) => format!(
            "CAST({} AS {})",
            pp_col_exp(dialect, inner),
            dialect.core_types().string.sql_type_name
        ),
    }
}

fn pp_agg(dialect: &dyn Dialect, agg_fn: AggFn, col: &str) -> String {
    let qcol = dialect.quote_col(col);
    match agg_fn {
        AggFn::Sum | AggFn::Avg | AggFn::Min | AggFn::Max | AggFn::Count => {
            format!("{agg_fn}({qcol})")
        }
        // uniq: the group's single value when all rows agree, else null
        AggFn::Uniq => {
            format!("CASE WHEN min({qcol}) = max({qcol}) THEN min({qcol}) ELSE NULL END")
        }
        AggFn::Null | AggFn::NullStr => "NULL".to_string(),
        AggFn::Any => format!("min({qcol})"),
        AggFn::Mode => format!("mode({qcol})"),
    }
}

fn pp_literal(dialect: &dyn Dialect, val: &Scalar) -> String {
    match val {
        Scalar::Null => "NULL".to_string(),
        Scalar::Bool(b) => dialect.render_bool(*b).to_string(),
        Scalar::Int(n) => n.to_string(),
        Scalar::Real(x) => x.to_string(),
        Scalar::Str(s) => format!("'{}'", dialect.escape_string(s)),
    }
}

/// Render a filter tree. An empty argument list renders as the empty
/// string and the caller drops the WHERE clause.
pub fn pp_filter_exp(dialect: &dyn Dialect, fexp: &FilterExp) -> String {
    let sep = match fexp.op {
        BoolOp::And => " AND ",
        BoolOp::Or => " OR ",
    };
    fexp.op_args
        .iter()
        .map(|arg| pp_sub_exp(dialect, arg))
        .collect::<Vec<_>>()
        .join(sep)
}

fn pp_sub_exp(dialect: &dyn Dialect, sub: &SubExp) -> String {
    match sub {
        SubExp::Rel(rel) => format!("({})", pp_rel_exp(dialect, rel)),
        SubExp::Filter(fexp) => format!("({})", pp_filter_exp(dialect, fexp)),
    }
}

fn pp_rel_exp(dialect: &dyn Dialect, rel: &RelExp) -> String {
    match rel {
        RelExp::BinRelExp { op, lhs, rhs } => match op {
            BinRelOp::Eq => pp_infix(dialect, "=", lhs, rhs),
            BinRelOp::Ne => pp_infix(dialect, "<>", lhs, rhs),
            BinRelOp::Gt => pp_infix(dialect, ">", lhs, rhs),
            BinRelOp::Ge => pp_infix(dialect, ">=", lhs, rhs),
            BinRelOp::Lt => pp_infix(dialect, "<", lhs, rhs),
            BinRelOp::Le => pp_infix(dialect, "<=", lhs, rhs),
            BinRelOp::Like => pp_infix(dialect, "LIKE", lhs, rhs),
            BinRelOp::Begins => pp_like_pattern(dialect, lhs, rhs, "", "%"),
            BinRelOp::Ends => pp_like_pattern(dialect, lhs, rhs, "%", ""),
            BinRelOp::Contains => pp_like_pattern(dialect, lhs, rhs, "%", "%"),
        },
        RelExp::UnaryRelExp { op, arg } => {
            let rendered = pp_val_exp(dialect, arg);
            match op {
                UnaryRelOp::IsNull => format!("{rendered} IS NULL"),
                UnaryRelOp::IsNotNull => format!("{rendered} IS NOT NULL"),
            }
        }
    }
}

fn pp_infix(dialect: &dyn Dialect, op: &str, lhs: &ValExp, rhs: &ValExp) -> String {
    format!(
        "{} {op} {}",
        pp_val_exp(dialect, lhs),
        pp_val_exp(dialect, rhs)
    )
}

/// BEGINS/ENDS/CONTAINS render as LIKE with `%` affixes folded into the
/// escaped literal. A non-string rhs falls back to a plain LIKE.
fn pp_like_pattern(
    dialect: &dyn Dialect,
    lhs: &ValExp,
    rhs: &ValExp,
    prefix: &str,
    suffix: &str,
) -> String {
    match rhs {
        ValExp::ConstVal {
            val: Scalar::Str(s),
        } => format!(
            "{} LIKE '{prefix}{}{suffix}'",
            pp_val_exp(dialect, lhs),
            dialect.escape_string(s)
        ),
        other => pp_infix(dialect, "LIKE", lhs, other),
    }
}

fn pp_val_exp(dialect: &dyn Dialect, val: &ValExp) -> String {
    match val {
        ValExp::ColRef { col_name } => dialect.quote_col(col_name),
        ValExp::ConstVal { val } => pp_literal(dialect, val),
    }
}

#[cfg(test)]
#[path = "print_test.rs"]
mod tests;
