//! ql-rel: relational query IR, schema inference and SQL compilation
//!
//! Queries are built by chaining algebraic operators over abstract table
//! references. The crate computes the output schema of any query from a
//! catalog of base-table schemas, compiles the query into a SQL AST —
//! fusing adjacent operators into one SELECT when semantically safe —
//! and pretty-prints the AST per dialect. Queries and results round-trip
//! through a tagged JSON wire form.
//!
//! Everything here is purely functional over immutable inputs: no shared
//! mutable state, no suspension points, safe to call from any thread.

pub mod error;
pub mod filter;
pub mod infer;
pub mod query;
pub mod sql;
pub mod wire;

pub use error::{QueryError, QueryResult};
pub use filter::{
    and, col, const_val, or, BinRelOp, BoolOp, FilterExp, RelExp, SubExp, UnaryRelOp, ValExp,
};
pub use infer::{get_or_infer_column_type, get_query_schema};
pub use query::{
    table_query, AggSpec, ColumnExtendExp, ColumnMapInfo, ExtendOpts, JoinType, QueryExp, QueryRep,
};
pub use sql::{
    pp_sql_query_ast, query_to_count_sql, query_to_sql, SelectItem, SortKey, SqlColExp, SqlFrom,
    SqlQueryAst, SqlSelectAst,
};
pub use wire::{
    decode_query, decode_query_request, decode_table_rep, encode_query, encode_query_request,
    encode_table_rep, revive, QueryRequest, Revived,
};
