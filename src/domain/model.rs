use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field map of a record, in the order the store returned the keys.
pub type Fields = IndexMap<String, FieldValue>;

/// A single cell value as stored in a table.
///
/// Deserializes from any JSON value. Object keys keep their original order so
/// that re-encoding produces the same text the store sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<FieldValue>),
    Object(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// Text for a flat-file cell.
    ///
    /// Lists and objects become compact JSON so a consumer can parse them back;
    /// null becomes the empty string.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(_) | FieldValue::Object(_) => {
                // Only strings, numbers and nested values can appear here,
                // none of which serde_json refuses to encode.
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value.into())
    }
}

/// One row of a table, normalized from the store's response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(rename = "createdTime")]
    pub created_time: String,
}

impl Record {
    pub fn new(id: impl Into<String>, created_time: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
            created_time: created_time.into(),
        }
    }
}

/// A table to export and the CSV file it is written to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub filename: String,
}
