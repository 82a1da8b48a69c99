//! Schemas: ordered column ids with per-column metadata

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::ColumnType;

/// Per-column metadata carried by a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// The column's dialect type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Human-facing name; defaults to the column id
    pub display_name: String,
}

impl ColumnMetadata {
    pub fn new(column_type: ColumnType, display_name: &str) -> Self {
        Self {
            column_type,
            display_name: display_name.to_string(),
        }
    }
}

/// Schema of a relation: ordered column ids plus a metadata entry per id.
///
/// Invariants: ids are unique within a schema and every id in `columns`
/// has an entry in `column_metadata`. Schemas are persistent values —
/// `extend` returns a new schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Ordered list of column ids
    pub columns: Vec<String>,
    /// Metadata keyed by column id
    pub column_metadata: HashMap<String, ColumnMetadata>,
}

impl Schema {
    /// Create an empty schema
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            column_metadata: HashMap::new(),
        }
    }

    /// Create a schema from (id, metadata) pairs, preserving order
    pub fn new(cols: Vec<(String, ColumnMetadata)>) -> Self {
        let columns: Vec<String> = cols.iter().map(|(id, _)| id.clone()).collect();
        let column_metadata = cols.into_iter().collect();
        Self {
            columns,
            column_metadata,
        }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether a column id is present
    pub fn contains(&self, col_id: &str) -> bool {
        self.column_metadata.contains_key(col_id)
    }

    /// Metadata for a column id
    pub fn metadata(&self, col_id: &str) -> Option<&ColumnMetadata> {
        self.column_metadata.get(col_id)
    }

    /// Type of a column id
    pub fn column_type(&self, col_id: &str) -> Option<&ColumnType> {
        self.metadata(col_id).map(|m| &m.column_type)
    }

    /// Display name of a column id
    pub fn display_name(&self, col_id: &str) -> Option<&str> {
        self.metadata(col_id).map(|m| m.display_name.as_str())
    }

    /// Ordinal position of a column id
    pub fn column_index(&self, col_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == col_id)
    }

    /// Return a new schema with `col_id` appended.
    ///
    /// Fails with `DuplicateColumn` if the id is already present.
    pub fn extend(&self, col_id: &str, metadata: ColumnMetadata) -> CoreResult<Schema> {
        if self.contains(col_id) {
            return Err(CoreError::DuplicateColumn {
                column: col_id.to_string(),
            });
        }
        let mut next = self.clone();
        next.columns.push(col_id.to_string());
        next.column_metadata.insert(col_id.to_string(), metadata);
        Ok(next)
    }

    /// Structural compatibility: same ordered ids with the same column
    /// type per id. Display names are not compared — two results can be
    /// concatenated even when their labels differ.
    pub fn compatible_with(&self, other: &Schema) -> bool {
        self.columns == other.columns
            && self
                .columns
                .iter()
                .all(|c| self.column_type(c) == other.column_type(c))
    }
}

/// Catalog entry for a base table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema: Schema,
}

/// Catalog of base-table schemas, supplied by the driver on every
/// compilation call and treated as read-only.
pub type TableInfoMap = HashMap<String, TableInfo>;

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
