//! Catalog rows and the points built from them.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::config::CatalogConfig;
use crate::error::CatalogError;

/// Sparse vector stored as parallel index/weight sequences.
///
/// Zero weights are never stored, so an all-zero vector has empty sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SparseVector {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseVector {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, f32)>) -> Self {
        let (indices, values) = pairs.into_iter().filter(|(_, w)| *w != 0.0).unzip();
        Self { indices, values }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Scalar payload value attached to a point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<&Value> for PayloadValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => PayloadValue::Null,
            Value::Bool(b) => PayloadValue::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(PayloadValue::Integer)
                .or_else(|| n.as_f64().map(PayloadValue::Float))
                .unwrap_or(PayloadValue::Null),
            Value::String(s) => PayloadValue::Text(s.clone()),
            // nested values are kept as their JSON text
            other => PayloadValue::Text(other.to_string()),
        }
    }
}

impl PayloadValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PayloadValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One input row of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Row position in the input file; doubles as the point id.
    pub position: u64,
    pub fields: BTreeMap<String, PayloadValue>,
    pub dense: Option<Vec<f32>>,
    pub sparse: Option<SparseVector>,
}

impl Record {
    /// Build a record from a row rendered as a JSON object.
    ///
    /// Payload columns missing from the row read as null. Vector columns that
    /// are missing or null leave the corresponding vector unset.
    pub fn from_json_row(
        position: usize,
        row: &Value,
        layout: &CatalogConfig,
    ) -> Result<Self, CatalogError> {
        let Value::Object(columns) = row else {
            return Err(CatalogError::InvalidRow {
                row: position,
                reason: "expected an object".to_string(),
            });
        };

        let fields = layout
            .payload_columns
            .iter()
            .map(|name| {
                let value = columns
                    .get(name)
                    .map(PayloadValue::from)
                    .unwrap_or(PayloadValue::Null);
                (name.clone(), value)
            })
            .collect();

        let dense = match columns.get(&layout.dense_column) {
            None | Some(Value::Null) => None,
            Some(value) => Some(float_list(position, &layout.dense_column, value)?),
        };

        let indices = columns
            .get(&layout.sparse_indices_column)
            .filter(|v| !v.is_null());
        let values = columns
            .get(&layout.sparse_values_column)
            .filter(|v| !v.is_null());
        let sparse = match (indices, values) {
            (Some(indices), Some(values)) => {
                let indices = index_list(position, &layout.sparse_indices_column, indices)?;
                let values = float_list(position, &layout.sparse_values_column, values)?;
                if indices.len() != values.len() {
                    return Err(CatalogError::InvalidRow {
                        row: position,
                        reason: format!(
                            "sparse vector has {} indices but {} values",
                            indices.len(),
                            values.len()
                        ),
                    });
                }
                Some(SparseVector::from_pairs(indices.into_iter().zip(values)))
            }
            _ => None,
        };

        Ok(Self {
            position: position as u64,
            fields,
            dense,
            sparse,
        })
    }
}

fn float_list(row: usize, column: &str, value: &Value) -> Result<Vec<f32>, CatalogError> {
    let invalid = || CatalogError::InvalidRow {
        row,
        reason: format!("column {column} is not a list of numbers"),
    };
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32).ok_or_else(invalid))
        .collect()
}

fn index_list(row: usize, column: &str, value: &Value) -> Result<Vec<u32>, CatalogError> {
    let invalid = || CatalogError::InvalidRow {
        row,
        reason: format!("column {column} is not a list of indices"),
    };
    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|i| u32::try_from(i).ok())
                .ok_or_else(invalid)
        })
        .collect()
}

/// Unit stored in the vector collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub id: u64,
    pub dense: Vec<f32>,
    pub sparse: SparseVector,
    pub payload: BTreeMap<String, PayloadValue>,
}

impl Point {
    /// Text used to embed this point: non-empty string payload fields joined by newlines.
    pub fn embedding_text(&self, text_columns: &[String]) -> String {
        text_columns
            .iter()
            .filter_map(|c| self.payload.get(c).and_then(PayloadValue::as_str))
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<Record> for Point {
    fn from(record: Record) -> Self {
        Self {
            id: record.position,
            dense: record.dense.unwrap_or_default(),
            sparse: record.sparse.unwrap_or_default(),
            payload: record.fields,
        }
    }
}
