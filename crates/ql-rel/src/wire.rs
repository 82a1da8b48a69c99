//! JSON wire form and the revival protocol
//!
//! Queries travel as `{ "expType": "QueryExp", "_rep": … }` with nested
//! filter/operand nodes likewise `expType`-tagged. Revival is a single
//! dispatch keyed on the discriminator — a dictionary, not a class
//! hierarchy — and an unrecognized `expType` is logged and passed
//! through untouched rather than rejected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use ql_core::TableRep;

use crate::error::{QueryError, QueryResult};
use crate::filter::{FilterExp, RelExp, ValExp};
use crate::query::{QueryExp, QueryRep};

#[derive(Serialize, Deserialize)]
#[serde(tag = "expType")]
enum QueryWire {
    QueryExp {
        #[serde(rename = "_rep")]
        rep: Arc<QueryRep>,
    },
}

impl Serialize for QueryExp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        QueryWire::QueryExp {
            rep: self.rep_arc(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QueryExp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let QueryWire::QueryExp { rep } = QueryWire::deserialize(deserializer)?;
        Ok(QueryExp::from_rep(rep))
    }
}

/// A query plus paging/count options, as sent by a remote caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: QueryExp,
    /// Whether the response should also carry the filtered row count
    #[serde(default)]
    pub filter_row_count: bool,
    #[serde(default = "no_page")]
    pub offset: i64,
    #[serde(default = "no_page")]
    pub limit: i64,
}

fn no_page() -> i64 {
    -1
}

impl QueryRequest {
    pub fn new(query: QueryExp) -> Self {
        Self {
            query,
            filter_row_count: false,
            offset: -1,
            limit: -1,
        }
    }
}

/// A node reconstructed by [`revive`]
#[derive(Debug, Clone, PartialEq)]
pub enum Revived {
    Query(QueryExp),
    Filter(FilterExp),
    Rel(RelExp),
    Val(ValExp),
    /// Unrecognized `expType` or untagged value, passed through verbatim
    Raw(Value),
}

impl Revived {
    fn kind(&self) -> &'static str {
        match self {
            Revived::Query(_) => "QueryExp",
            Revived::Filter(_) => "FilterExp",
            Revived::Rel(_) => "RelExp",
            Revived::Val(_) => "ValExp",
            Revived::Raw(_) => "raw value",
        }
    }
}

/// Reconstruct a typed node from a JSON value, dispatching on its
/// `expType` discriminator.
pub fn revive(value: Value) -> QueryResult<Revived> {
    let Some(tag) = value.get("expType").and_then(Value::as_str).map(str::to_owned) else {
        return Ok(Revived::Raw(value));
    };
    match tag.as_str() {
        "QueryExp" => Ok(Revived::Query(serde_json::from_value(value)?)),
        "FilterExp" => Ok(Revived::Filter(serde_json::from_value(value)?)),
        "BinRelExp" | "UnaryRelExp" => Ok(Revived::Rel(serde_json::from_value(value)?)),
        "ColRef" | "ConstVal" => Ok(Revived::Val(serde_json::from_value(value)?)),
        other => {
            log::warn!("revive: unrecognized expType '{other}', passing value through");
            Ok(Revived::Raw(value))
        }
    }
}

/// Serialize a query to its wire envelope
pub fn encode_query(query: &QueryExp) -> QueryResult<String> {
    Ok(serde_json::to_string(query)?)
}

/// Decode a query wire envelope
pub fn decode_query(json: &str) -> QueryResult<QueryExp> {
    let value: Value = serde_json::from_str(json)?;
    validate_operators(&value)?;
    match revive(value)? {
        Revived::Query(query) => Ok(query),
        other => Err(QueryError::InvalidWire {
            detail: format!("expected a QueryExp envelope, got {}", other.kind()),
        }),
    }
}

/// Serialize a query request
pub fn encode_query_request(request: &QueryRequest) -> QueryResult<String> {
    Ok(serde_json::to_string(request)?)
}

/// Decode a query request
pub fn decode_query_request(json: &str) -> QueryResult<QueryRequest> {
    let value: Value = serde_json::from_str(json)?;
    validate_operators(&value)?;
    Ok(serde_json::from_value(value)?)
}

/// Serialize a table result
pub fn encode_table_rep(rep: &TableRep) -> QueryResult<String> {
    Ok(serde_json::to_string(rep)?)
}

/// Decode a table result, rebuilding its `schema` payload into a Schema
pub fn decode_table_rep(json: &str) -> QueryResult<TableRep> {
    Ok(serde_json::from_str(json)?)
}

const KNOWN_OPERATORS: [&str; 10] = [
    "table",
    "project",
    "filter",
    "groupBy",
    "mapColumns",
    "mapColumnsByIndex",
    "concat",
    "sort",
    "extend",
    "join",
];

/// Reject payloads carrying an operator tag outside the IR vocabulary.
/// The typed enums would refuse them anyway; checking up front turns an
/// opaque serde error into `InvalidOperator` naming the tag.
fn validate_operators(value: &Value) -> QueryResult<()> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(op)) = map.get("operator") {
                if !KNOWN_OPERATORS.contains(&op.as_str()) {
                    return Err(QueryError::InvalidOperator {
                        operator: op.clone(),
                    });
                }
            }
            map.values().try_for_each(validate_operators)
        }
        Value::Array(items) => items.iter().try_for_each(validate_operators),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
