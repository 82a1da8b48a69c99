//! SQL abstract syntax: AST shape, IR-to-AST lowering, pretty-printing

pub mod ast;
pub mod lower;
pub mod print;

pub use ast::{SelectItem, SortKey, SqlColExp, SqlFrom, SqlQueryAst, SqlSelectAst};
pub use lower::{query_to_count_sql, query_to_sql};
pub use print::pp_sql_query_ast;
