//! Schema inference — computes the output schema of a query tree
//!
//! Recursive dispatch on the `operator` tag, given a catalog of
//! base-table schemas and a dialect. Purely functional: inputs are never
//! mutated and any error aborts the whole inference.

use ql_core::{ColumnMetadata, ColumnType, Dialect, Schema, TableInfoMap};

use crate::error::{QueryError, QueryResult};
use crate::query::{ColumnExtendExp, ColumnMapInfo, ExtendOpts, JoinType, QueryRep};

/// Infer the output schema of `query` against `table_map`
pub fn get_query_schema(
    dialect: &dyn Dialect,
    table_map: &TableInfoMap,
    query: &QueryRep,
) -> QueryResult<Schema> {
    match query {
        QueryRep::Table { table_name } => table_map
            .get(table_name)
            .map(|info| info.schema.clone())
            .ok_or_else(|| QueryError::UnknownTable {
                table: table_name.clone(),
            }),

        QueryRep::Project { cols, from } => {
            let in_schema = get_query_schema(dialect, table_map, from)?;
            let mut out = Schema::empty();
            for col in cols {
                let meta = in_schema.metadata(col).ok_or_else(|| unknown_col(col, "project"))?;
                out = out.extend(col, meta.clone())?;
            }
            Ok(out)
        }

        QueryRep::Filter { from, .. } => get_query_schema(dialect, table_map, from),

        QueryRep::GroupBy { cols, aggs, from } => {
            let in_schema = get_query_schema(dialect, table_map, from)?;
            let mut out = Schema::empty();
            for col in cols {
                let meta = in_schema.metadata(col).ok_or_else(|| unknown_col(col, "groupBy"))?;
                out = out.extend(col, meta.clone())?;
            }
            // Aggregated columns keep the metadata of the column they
            // aggregate over.
            for agg in aggs {
                let col = agg.col_id();
                let meta = in_schema.metadata(col).ok_or_else(|| unknown_col(col, "groupBy"))?;
                out = out.extend(col, meta.clone())?;
            }
            Ok(out)
        }

        QueryRep::MapColumns { cmap, from } => {
            let in_schema = get_query_schema(dialect, table_map, from)?;
            remap_schema(&in_schema, |_, col_id| cmap.get(col_id))
        }

        QueryRep::MapColumnsByIndex { cmap, from } => {
            let in_schema = get_query_schema(dialect, table_map, from)?;
            remap_schema(&in_schema, |index, _| cmap.get(&index))
        }

        QueryRep::Concat { from, target } => {
            let from_schema = get_query_schema(dialect, table_map, from)?;
            let target_schema = get_query_schema(dialect, table_map, target)?;
            if !from_schema.compatible_with(&target_schema) {
                return Err(QueryError::SchemaMismatch {
                    detail: format!(
                        "columns [{}] vs [{}]",
                        from_schema.columns.join(", "),
                        target_schema.columns.join(", ")
                    ),
                });
            }
            Ok(from_schema)
        }

        QueryRep::Sort { from, .. } => get_query_schema(dialect, table_map, from),

        QueryRep::Extend {
            col_id,
            col_exp,
            opts,
            from,
        } => {
            let in_schema = get_query_schema(dialect, table_map, from)?;
            let col_type = get_or_infer_column_type(dialect, &in_schema, col_exp, opts)?;
            let display_name = opts.display_name.clone().unwrap_or_else(|| col_id.clone());
            Ok(in_schema.extend(col_id, ColumnMetadata::new(col_type, &display_name))?)
        }

        QueryRep::Join {
            lhs,
            rhs,
            on,
            join_type,
        } => {
            if *join_type != JoinType::LeftOuter {
                return Err(QueryError::UnsupportedJoin {
                    join_type: join_type.to_string(),
                });
            }
            let lhs_schema = get_query_schema(dialect, table_map, lhs)?;
            let rhs_schema = get_query_schema(dialect, table_map, rhs)?;
            // lhs columns first, then rhs columns that are neither join
            // keys nor already present on the left. lhs metadata wins.
            let mut out = lhs_schema.clone();
            for col in &rhs_schema.columns {
                if on.contains(col) || lhs_schema.contains(col) {
                    continue;
                }
                let meta = rhs_schema.metadata(col).expect("schema invariant");
                out = out.extend(col, meta.clone())?;
            }
            Ok(out)
        }
    }
}

/// Shared remap routine for mapColumns / mapColumnsByIndex; the two
/// operators differ only in how `lookup` keys into the map.
fn remap_schema<'a, F>(in_schema: &Schema, lookup: F) -> QueryResult<Schema>
where
    F: Fn(usize, &str) -> Option<&'a ColumnMapInfo>,
{
    let mut out = Schema::empty();
    for (index, col_id) in in_schema.columns.iter().enumerate() {
        let meta = in_schema.metadata(col_id).expect("schema invariant");
        match lookup(index, col_id) {
            Some(entry) => {
                let new_id = entry.id.as_deref().unwrap_or(col_id);
                let mut new_meta = meta.clone();
                if let Some(display_name) = &entry.display_name {
                    new_meta.display_name = display_name.clone();
                }
                out = out.extend(new_id, new_meta)?;
            }
            None => {
                out = out.extend(col_id, meta.clone())?;
            }
        }
    }
    Ok(out)
}

/// Resolve the type of an extend column: an explicit `opts.type` wins,
/// otherwise the type is inferred from the expression form.
pub fn get_or_infer_column_type(
    dialect: &dyn Dialect,
    in_schema: &Schema,
    col_exp: &ColumnExtendExp,
    opts: &ExtendOpts,
) -> QueryResult<ColumnType> {
    if let Some(ty) = &opts.column_type {
        return Ok(ty.clone());
    }
    match col_exp {
        ColumnExtendExp::ColRef { col_name } => in_schema
            .column_type(col_name)
            .cloned()
            .ok_or_else(|| unknown_col(col_name, "extend")),
        ColumnExtendExp::AsString { .. } => Ok(dialect.core_types().string.clone()),
        ColumnExtendExp::ConstVal { val } => match val.const_kind() {
            Some(kind) => Ok(dialect.core_types().for_kind(kind).clone()),
            None => Err(QueryError::TypeInferenceFailed {
                expr: format!("{col_exp:?}"),
            }),
        },
    }
}

fn unknown_col(column: &str, context: &str) -> QueryError {
    QueryError::UnknownColumn {
        column: column.to_string(),
        context: context.to_string(),
    }
}

#[cfg(test)]
#[path = "infer_test.rs"]
mod tests;
