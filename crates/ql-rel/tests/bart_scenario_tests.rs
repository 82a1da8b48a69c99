//! End-to-end compilation scenarios over the BART compensation schema:
//! build queries with the fluent API, then assert on inferred schemas,
//! SQL-AST shape and rendered SQL.

use std::collections::HashMap;

use ql_core::{
    sqlite_dialect, AggFn, ColumnKind, ColumnMetadata, Dialect, Schema, TableInfo, TableInfoMap,
};
use ql_rel::{
    col, const_val, query_to_count_sql, query_to_sql, table_query, FilterExp, QueryExp, SelectItem,
    SqlColExp, SqlFrom,
};

const BART_COLUMNS: [(&str, ColumnKind); 14] = [
    ("Name", ColumnKind::String),
    ("Title", ColumnKind::String),
    ("Base", ColumnKind::Integer),
    ("OT", ColumnKind::Integer),
    ("Other", ColumnKind::Integer),
    ("MDV", ColumnKind::Integer),
    ("ER", ColumnKind::Integer),
    ("EE", ColumnKind::Integer),
    ("DC", ColumnKind::Integer),
    ("Misc", ColumnKind::Integer),
    ("TCOE", ColumnKind::Integer),
    ("Source", ColumnKind::String),
    ("JobFamily", ColumnKind::String),
    ("Union", ColumnKind::String),
];

fn bart_schema() -> Schema {
    let d = sqlite_dialect();
    Schema::new(
        BART_COLUMNS
            .iter()
            .map(|(name, kind)| {
                (
                    name.to_string(),
                    ColumnMetadata::new(d.core_types().for_kind(*kind).clone(), name),
                )
            })
            .collect(),
    )
}

fn bart_table_map() -> TableInfoMap {
    let mut map = HashMap::new();
    map.insert(
        "bart".to_string(),
        TableInfo {
            schema: bart_schema(),
        },
    );
    map
}

fn schema_of(q: &QueryExp) -> Schema {
    q.get_schema(sqlite_dialect(), &bart_table_map())
        .expect("schema inference failed")
}

fn sql_of(q: &QueryExp) -> String {
    q.to_sql(sqlite_dialect(), &bart_table_map())
        .expect("sql compilation failed")
}

fn projected() -> QueryExp {
    table_query("bart").project(["JobFamily", "Title", "Union", "Name", "Base", "TCOE"])
}

#[test]
fn scenario_base_table() {
    let schema = schema_of(&table_query("bart"));
    let expected: Vec<&str> = BART_COLUMNS.iter().map(|(name, _)| *name).collect();
    assert_eq!(schema.columns, expected);
}

#[test]
fn scenario_projection() {
    let schema = schema_of(&projected());
    assert_eq!(
        schema.columns,
        vec!["JobFamily", "Title", "Union", "Name", "Base", "TCOE"]
    );
    assert_eq!(
        sql_of(&projected()),
        "SELECT \"JobFamily\", \"Title\", \"Union\", \"Name\", \"Base\", \"TCOE\" FROM \"bart\""
    );
}

#[test]
fn scenario_group_by_job_family_and_title() {
    let q = projected().group_by(["JobFamily", "Title"], ["TCOE"]);
    let schema = schema_of(&q);
    assert_eq!(schema.columns, vec!["JobFamily", "Title", "TCOE"]);
    assert_eq!(
        sql_of(&q),
        "SELECT \"JobFamily\", \"Title\", sum(\"TCOE\") AS \"TCOE\" FROM \"bart\" \
         GROUP BY \"JobFamily\", \"Title\""
    );
}

#[test]
fn scenario_group_by_with_default_aggs() {
    let q = projected().group_by(["JobFamily"], ["Title", "Union", "Name", "Base", "TCOE"]);
    let schema = schema_of(&q);
    assert_eq!(
        schema.columns,
        vec!["JobFamily", "Title", "Union", "Name", "Base", "TCOE"]
    );
    let ast = query_to_sql(sqlite_dialect(), &bart_table_map(), q.rep()).unwrap();
    let stmt = ast.as_single().expect("fused single select");
    // String columns default to uniq, numeric columns to sum
    let aggs: Vec<_> = stmt.select_cols[1..]
        .iter()
        .map(|item| match &item.col_exp {
            SqlColExp::Agg(agg_fn, col) => (*agg_fn, col.as_str()),
            other => panic!("expected aggregate, got {other:?}"),
        })
        .collect();
    assert_eq!(
        aggs,
        vec![
            (AggFn::Uniq, "Title"),
            (AggFn::Uniq, "Union"),
            (AggFn::Uniq, "Name"),
            (AggFn::Sum, "Base"),
            (AggFn::Sum, "TCOE"),
        ]
    );
}

#[test]
fn scenario_filter_by_job_family() {
    let q = projected().filter(
        FilterExp::and().eq(col("JobFamily"), const_val("Executive Management")),
    );
    assert_eq!(schema_of(&q), schema_of(&projected()));
    assert_eq!(
        sql_of(&q),
        "SELECT \"JobFamily\", \"Title\", \"Union\", \"Name\", \"Base\", \"TCOE\" FROM \"bart\" \
         WHERE (\"JobFamily\" = 'Executive Management')"
    );
}

#[test]
fn scenario_filter_with_quoted_literal() {
    let q = projected().filter(FilterExp::and().eq(
        col("Title"),
        const_val("Department Manager Gov't & Comm Rel"),
    ));
    let sql = sql_of(&q);
    assert!(
        sql.contains("\"Title\" = 'Department Manager Gov''t & Comm Rel'"),
        "single quote not doubled in: {sql}"
    );
}

#[test]
fn projection_is_idempotent() {
    let cols = ["JobFamily", "Title", "Union", "Name", "Base", "TCOE"];
    let once = table_query("bart").project(cols);
    let twice = once.project(cols);
    assert_eq!(schema_of(&once), schema_of(&twice));
    assert_eq!(sql_of(&once), sql_of(&twice));
}

#[test]
fn concat_is_schema_associative() {
    let q1 = projected();
    let q2 = projected();
    let q3 = projected();
    let left = q1.concat(&q2).concat(&q3);
    let right = q1.concat(&q2.concat(&q3));
    assert_eq!(schema_of(&left), schema_of(&right));
    let left_ast = query_to_sql(sqlite_dialect(), &bart_table_map(), left.rep()).unwrap();
    let right_ast = query_to_sql(sqlite_dialect(), &bart_table_map(), right.rep()).unwrap();
    assert_eq!(left_ast.select_stmts.len(), 3);
    assert_eq!(left_ast, right_ast);
}

#[test]
fn distinct_matches_projection_columns() {
    let d = table_query("bart").distinct("JobFamily");
    let p = table_query("bart").project(["JobFamily"]);
    assert_eq!(schema_of(&d).columns, schema_of(&p).columns);
    assert_eq!(
        sql_of(&d),
        "SELECT \"JobFamily\" FROM \"bart\" GROUP BY \"JobFamily\""
    );
}

#[test]
fn fusion_keeps_chains_in_one_select() {
    // project, groupBy and sort all land in the same SELECT
    let q = projected()
        .group_by(["JobFamily"], ["TCOE"])
        .sort([("TCOE", false)]);
    let ast = query_to_sql(sqlite_dialect(), &bart_table_map(), q.rep()).unwrap();
    let stmt = ast.as_single().expect("expected one fused select");
    assert_eq!(stmt.from, SqlFrom::Table("bart".to_string()));
    assert_eq!(stmt.group_by, vec!["JobFamily"]);
    assert_eq!(stmt.order_by.len(), 1);
}

#[test]
fn fusion_stops_at_where_boundary() {
    let q = projected()
        .filter(FilterExp::and().gt(col("TCOE"), const_val(0)))
        .group_by(["JobFamily"], ["TCOE"]);
    let ast = query_to_sql(sqlite_dialect(), &bart_table_map(), q.rep()).unwrap();
    let stmt = ast.as_single().expect("single outer select");
    assert!(
        matches!(stmt.from, SqlFrom::Sub(_)),
        "groupBy over a filtered select must wrap"
    );
}

#[test]
fn no_pass_through_only_nesting() {
    // Every derived table in this AST must exist for a reason: a
    // where/groupBy/orderBy boundary, never a plain pass-through.
    fn check(ast: &ql_rel::SqlQueryAst) {
        for stmt in &ast.select_stmts {
            if let SqlFrom::Sub(inner) = &stmt.from {
                let outer_plain = stmt.where_exp.is_none()
                    && stmt.group_by.is_empty()
                    && stmt.order_by.is_empty()
                    && stmt.select_cols.iter().all(SelectItem::is_bare_col)
                    && stmt.select_cols.len()
                        == inner.pass_through_cols().len();
                assert!(!outer_plain, "found pure pass-through SELECT: {stmt:?}");
                check(inner);
            }
        }
    }
    let q = projected()
        .filter(FilterExp::and().gt(col("TCOE"), const_val(0)))
        .group_by(["JobFamily"], ["TCOE"])
        .sort([("TCOE", false)]);
    let ast = query_to_sql(sqlite_dialect(), &bart_table_map(), q.rep()).unwrap();
    check(&ast);
}

#[test]
fn count_wrapper_shape() {
    let q = projected().filter(FilterExp::and().gt(col("TCOE"), const_val(0)));
    let ast = query_to_count_sql(sqlite_dialect(), &bart_table_map(), q.rep()).unwrap();
    let stmt = ast.as_single().expect("single select");
    assert_eq!(stmt.select_cols.len(), 1);
    assert!(matches!(stmt.select_cols[0].col_exp, SqlColExp::CountAll));
    assert_eq!(stmt.select_cols[0].alias.as_deref(), Some("rowCount"));
    let sql = q
        .to_count_sql(sqlite_dialect(), &bart_table_map())
        .unwrap();
    assert!(sql.starts_with("SELECT count(*) AS \"rowCount\" FROM (SELECT"));
}

#[test]
fn schema_agreement_with_emitted_ast() {
    // The inferred schema and the outer SELECT list must name the same
    // columns in the same order, for a representative mix of operators.
    let queries = vec![
        table_query("bart"),
        projected(),
        projected().group_by(["JobFamily"], ["TCOE"]),
        projected().filter(FilterExp::and().is_not_null(col("Name"))),
        projected().sort([("Base", true)]),
        projected()
            .filter(FilterExp::and().gt(col("TCOE"), const_val(0)))
            .group_by(["JobFamily"], ["TCOE"]),
    ];
    for q in queries {
        let schema = schema_of(&q);
        let ast = query_to_sql(sqlite_dialect(), &bart_table_map(), q.rep()).unwrap();
        for stmt in &ast.select_stmts {
            let ids: Vec<_> = stmt
                .select_cols
                .iter()
                .map(|item| item.output_id().expect("item without output id"))
                .collect();
            assert_eq!(ids, schema.columns, "schema/AST divergence for {:?}", q.rep());
        }
    }
}

#[test]
fn wire_round_trip_of_scenario_query() {
    let q = projected()
        .group_by(["JobFamily", "Title"], ["TCOE"])
        .sort([("TCOE", false)]);
    let json = ql_rel::encode_query(&q).unwrap();
    let back = ql_rel::decode_query(&json).unwrap();
    assert_eq!(back, q);
    assert_eq!(sql_of(&back), sql_of(&q));
}
