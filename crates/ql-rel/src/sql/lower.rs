//! IR-to-SQL-AST lowering
//!
//! Recursive dispatch on the `operator` tag. The guiding rule: fuse an
//! operator into the subquery's outer SELECT whenever that SELECT still
//! presents the minimal shape the operator needs; otherwise wrap the
//! subquery as a derived table whose outer SELECT references only the
//! subquery's output aliases. Fusion never crosses a `where` or a
//! non-empty `group by`.

use ql_core::{AggFn, ColumnType, Dialect, Schema, TableInfoMap};

use crate::error::{QueryError, QueryResult};
use crate::infer::{get_or_infer_column_type, get_query_schema};
use crate::query::{AggSpec, ColumnExtendExp, ColumnMapInfo, JoinType, QueryExp, QueryRep};
use crate::sql::ast::{SelectItem, SortKey, SqlColExp, SqlFrom, SqlQueryAst, SqlSelectAst};
use crate::sql::print::pp_sql_query_ast;

/// Compile a query into a SQL AST
pub fn query_to_sql(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    query: &QueryRep,
) -> QueryResult<SqlQueryAst> {
    match query {
        QueryRep::Table { table_name } => lower_table(table_map, table_name),
        QueryRep::Project { cols, from } => lower_project(dialect, table_map, cols, from),
        QueryRep::Filter { fexp, from } => lower_filter(dialect, table_map, fexp, from),
        QueryRep::GroupBy { cols, aggs, from } => {
            lower_group_by(dialect, table_map, cols, aggs, from)
        }
        QueryRep::MapColumns { cmap, from } => {
            let mut sub = query_to_sql(dialect, table_map, from)?;
            remap_select_aliases(&mut sub, |_, col_id| col_id.and_then(|c| cmap.get(c)));
            Ok(sub)
        }
        QueryRep::MapColumnsByIndex { cmap, from } => {
            let mut sub = query_to_sql(dialect, table_map, from)?;
            remap_select_aliases(&mut sub, |index, _| cmap.get(&index));
            Ok(sub)
        }
        QueryRep::Concat { from, target } => {
            // Operand schemas must agree; inference owns that check.
            get_query_schema(dialect, table_map, query)?;
            let mut lhs = query_to_sql(dialect, table_map, from)?;
            let rhs = query_to_sql(dialect, table_map, target)?;
            lhs.select_stmts.extend(rhs.select_stmts);
            Ok(lhs)
        }
        QueryRep::Sort { keys, from } => lower_sort(dialect, table_map, keys, from),
        QueryRep::Extend {
            col_id,
            col_exp,
            opts,
            from,
        } => {
            let in_schema = get_query_schema(dialect, table_map, from)?;
            let col_type = get_or_infer_column_type(dialect, &in_schema, col_exp, opts)?;
            lower_extend(dialect, table_map, col_id, col_exp, col_type, from)
        }
        QueryRep::Join {
            lhs,
            rhs,
            on,
            join_type,
        } => lower_join(dialect, table_map, query, lhs, rhs, on, *join_type),
    }
}

/// Wrap a query as `SELECT count(*) AS rowCount FROM (<sql>)`
pub fn query_to_count_sql(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    query: &QueryRep,
) -> QueryResult<SqlQueryAst> {
    let sub = query_to_sql(dialect, table_map, query)?;
    let count_col = SelectItem {
        col_exp: SqlColExp::CountAll,
        col_type: dialect.core_types().integer.clone(),
        alias: Some("rowCount".to_string()),
    };
    Ok(SqlQueryAst::single(SqlSelectAst::new(
        vec![count_col],
        SqlFrom::Sub(Box::new(sub)),
    )))
}

fn lower_table(table_map: &TableInfoMap, table_name: &str) -> QueryResult<SqlQueryAst> {
    let info = table_map
        .get(table_name)
        .ok_or_else(|| QueryError::UnknownTable {
            table: table_name.to_string(),
        })?;
    let select_cols = bare_schema_cols(&info.schema);
    Ok(SqlQueryAst::single(SqlSelectAst::new(
        select_cols,
        SqlFrom::Table(table_name.to_string()),
    )))
}

fn lower_project(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    cols: &[String],
    from: &QueryRep,
) -> QueryResult<SqlQueryAst> {
    let mut sub = query_to_sql(dialect, table_map, from)?;
    // Projection narrows every UNION leg the same way, keeping each
    // leg's expression/alias/type for the retained columns.
    for stmt in &mut sub.select_stmts {
        let mut items = Vec::with_capacity(cols.len());
        for col in cols {
            let item = stmt
                .select_cols
                .iter()
                .find(|it| it.output_id() == Some(col.as_str()))
                .cloned()
                .ok_or_else(|| QueryError::UnknownColumn {
                    column: col.clone(),
                    context: "project".to_string(),
                })?;
            items.push(item);
        }
        stmt.select_cols = items;
    }
    Ok(sub)
}

fn lower_filter(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    fexp: &crate::filter::FilterExp,
    from: &QueryRep,
) -> QueryResult<SqlQueryAst> {
    let mut sub = query_to_sql(dialect, table_map, from)?;
    let fusible = matches!(
        sub.as_single(),
        Some(stmt) if stmt.where_exp.is_none() && stmt.group_by.is_empty()
    );
    if fusible {
        if let Some(stmt) = sub.as_single_mut() {
            stmt.where_exp = Some(fexp.clone());
        }
        return Ok(sub);
    }
    let mut outer = SqlSelectAst::new(sub.pass_through_cols(), SqlFrom::Sub(Box::new(sub)));
    outer.where_exp = Some(fexp.clone());
    Ok(SqlQueryAst::single(outer))
}

fn lower_group_by(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    cols: &[String],
    aggs: &[AggSpec],
    from: &QueryRep,
) -> QueryResult<SqlQueryAst> {
    let in_schema = get_query_schema(dialect, table_map, from)?;

    let mut select_gb_cols = Vec::with_capacity(cols.len());
    for col in cols {
        let ty = group_col_type(&in_schema, col)?;
        select_gb_cols.push(SelectItem::bare(col, ty));
    }

    let mut agg_exprs = Vec::with_capacity(aggs.len());
    for agg in aggs {
        let col = agg.col_id();
        let ty = group_col_type(&in_schema, col)?;
        let mut agg_fn = match agg {
            AggSpec::Default(_) => ty.default_agg,
            AggSpec::Explicit(f, _) => *f,
        };
        // A string column cannot carry a plain null aggregate: some
        // dialects type bare null as integer, breaking UNION legs.
        if agg_fn == AggFn::Null && ty.is_string() {
            agg_fn = AggFn::NullStr;
        }
        agg_exprs.push(SelectItem {
            col_exp: SqlColExp::Agg(agg_fn, col.to_string()),
            col_type: ty,
            alias: Some(col.to_string()),
        });
    }

    let mut select_cols = select_gb_cols;
    select_cols.extend(agg_exprs);

    let mut sub = query_to_sql(dialect, table_map, from)?;
    let fusible = matches!(
        sub.as_single(),
        Some(stmt) if stmt.select_cols.iter().all(SelectItem::is_bare_col)
            && stmt.where_exp.is_none()
            && stmt.group_by.is_empty()
            && stmt.order_by.is_empty()
    );
    if fusible {
        if let Some(stmt) = sub.as_single_mut() {
            stmt.select_cols = select_cols;
            stmt.group_by = cols.to_vec();
        }
        return Ok(sub);
    }
    let mut outer = SqlSelectAst::new(select_cols, SqlFrom::Sub(Box::new(sub)));
    outer.group_by = cols.to_vec();
    Ok(SqlQueryAst::single(outer))
}

fn lower_sort(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    keys: &[(String, bool)],
    from: &QueryRep,
) -> QueryResult<SqlQueryAst> {
    let sort_keys: Vec<SortKey> = keys
        .iter()
        .map(|(col, asc)| SortKey {
            col: col.clone(),
            asc: *asc,
        })
        .collect();
    let mut sub = query_to_sql(dialect, table_map, from)?;
    let fusible = matches!(sub.as_single(), Some(stmt) if stmt.order_by.is_empty());
    if fusible {
        if let Some(stmt) = sub.as_single_mut() {
            stmt.order_by = sort_keys;
        }
        return Ok(sub);
    }
    let mut outer = SqlSelectAst::new(sub.pass_through_cols(), SqlFrom::Sub(Box::new(sub)));
    outer.order_by = sort_keys;
    Ok(SqlQueryAst::single(outer))
}

fn lower_extend(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    col_id: &str,
    col_exp: &ColumnExtendExp,
    col_type: ColumnType,
    from: &QueryRep,
) -> QueryResult<SqlQueryAst> {
    let mut sub = query_to_sql(dialect, table_map, from)?;

    // A constant needs nothing from the subquery's scope, so it can ride
    // along in any single SELECT.
    if let ColumnExtendExp::ConstVal { val } = col_exp {
        if let Some(stmt) = sub.as_single_mut() {
            stmt.select_cols.push(SelectItem {
                col_exp: SqlColExp::Const(val.clone()),
                col_type,
                alias: Some(col_id.to_string()),
            });
            return Ok(sub);
        }
    }

    let mut select_cols = sub.pass_through_cols();
    select_cols.push(SelectItem {
        col_exp: lower_extend_exp(col_exp),
        col_type,
        alias: Some(col_id.to_string()),
    });
    Ok(SqlQueryAst::single(SqlSelectAst::new(
        select_cols,
        SqlFrom::Sub(Box::new(sub)),
    )))
}

fn lower_join(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    query: &QueryRep,
    lhs: &QueryRep,
    rhs: &QueryRep,
    on: &[String],
    join_type: JoinType,
) -> QueryResult<SqlQueryAst> {
    // Inference validates the join type and computes the output schema.
    let out_schema = get_query_schema(dialect, table_map, query)?;
    let lhs_ast = query_to_sql(dialect, table_map, lhs)?;
    let rhs_ast = query_to_sql(dialect, table_map, rhs)?;
    let mut stmt = SqlSelectAst::new(
        bare_schema_cols(&out_schema),
        SqlFrom::Join {
            join_type,
            lhs: Box::new(lhs_ast),
            rhs: Box::new(rhs_ast),
        },
    );
    stmt.on = Some(on.to_vec());
    Ok(SqlQueryAst::single(stmt))
}

/// Column-per-item SELECT list straight off a schema
fn bare_schema_cols(schema: &Schema) -> Vec<SelectItem> {
    schema
        .columns
        .iter()
        .map(|col| {
            let ty = schema.column_type(col).expect("schema invariant").clone();
            SelectItem::bare(col, ty)
        })
        .collect()
}

fn group_col_type(in_schema: &Schema, col: &str) -> QueryResult<ColumnType> {
    in_schema
        .column_type(col)
        .cloned()
        .ok_or_else(|| QueryError::UnknownColumn {
            column: col.to_string(),
            context: "groupBy".to_string(),
        })
}

/// Rewrite output aliases across every SELECT; mapColumns and
/// mapColumnsByIndex differ only in the lookup key.
fn remap_select_aliases<'a, F>(ast: &mut SqlQueryAst, lookup: F)
where
    F: Fn(usize, Option<&str>) -> Option<&'a ColumnMapInfo>,
{
    for stmt in &mut ast.select_stmts {
        for (index, item) in stmt.select_cols.iter_mut().enumerate() {
            let out_id = item.output_id().map(str::to_owned);
            if let Some(entry) = lookup(index, out_id.as_deref()) {
                if let Some(new_id) = &entry.id {
                    item.alias = Some(new_id.clone());
                }
            }
        }
    }
}

fn lower_extend_exp(exp: &ColumnExtendExp) -> SqlColExp {
    match exp {
        ColumnExtendExp::ColRef { col_name } => SqlColExp::Col(col_name.clone()),
        ColumnExtendExp::ConstVal { val } => SqlColExp::Const(val.clone()),
        ColumnExtendExp::AsString { exp } => {
            SqlColExp::CastString(Box::new(lower_extend_exp(exp)))
        }
    }
}

impl QueryExp {
    /// Infer this query's output schema
    pub fn get_schema(
        &self,
        dialect: &dyn Dialect,
        table_map: &TableInfoMap,
    ) -> QueryResult<Schema> {
        get_query_schema(dialect, table_map, self.rep())
    }

    /// Compile to a SQL string
    pub fn to_sql(&self, dialect: &dyn Dialect, table_map: &TableInfoMap) -> QueryResult<String> {
        let ast = query_to_sql(dialect, table_map, self.rep())?;
        Ok(pp_sql_query_ast(dialect, &ast, -1, -1))
    }

    /// Compile to a SQL string with offset/limit (`-1` = none)
    pub fn to_sql_paged(
        &self,
        dialect: &dyn Dialect,
        table_map: &TableInfoMap,
        offset: i64,
        limit: i64,
    ) -> QueryResult<String> {
        let ast = query_to_sql(dialect, table_map, self.rep())?;
        Ok(pp_sql_query_ast(dialect, &ast, offset, limit))
    }

    /// Compile to a `count(*)` SQL string over this query
    pub fn to_count_sql(
        &self,
        dialect: &dyn Dialect,
        table_map: &TableInfoMap,
    ) -> QueryResult<String> {
        let ast = query_to_count_sql(dialect, table_map, self.rep())?;
        Ok(pp_sql_query_ast(dialect, &ast, -1, -1))
    }
}

#[cfg(test)]
#[path = "lower_test.rs"]
mod tests;
