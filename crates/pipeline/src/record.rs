//! The accumulating analysis state threaded through a pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StepError;

/// Mapping from field name to value for one analysis run.
///
/// A field absent from the record has not been produced yet. Fields are only
/// ever inserted or overwritten; there is no removal. Values are arbitrary
/// JSON so that steps may produce labels, lists, numbers or nested objects
/// without a schema.
///
/// Steps return their output as a partial `Record` which the engine folds into
/// the running one with [`Record::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed record for analysing raw text: `{text}`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new().with_field("text", text.into())
    }

    /// Seed record for analysing a document at a URL: `{url}`.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new().with_field("url", url.into())
    }

    /// Builder-style insert.
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Inserts or overwrites a single field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Returns the value of `field`, or `None` if it has not been produced.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the value of a field the caller requires.
    pub fn require(&self, field: &str) -> Result<&Value, StepError> {
        self.get(field).ok_or_else(|| StepError::MissingField {
            field: field.to_owned(),
        })
    }

    /// Returns a required field that must hold a string.
    pub fn require_str(&self, field: &str) -> Result<&str, StepError> {
        self.require(field)?
            .as_str()
            .ok_or_else(|| StepError::InvalidField {
                field: field.to_owned(),
                expected: "a string",
            })
    }

    /// Returns `field` as a string slice if present and a string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Returns `field` as a list of strings if present and an array of strings.
    ///
    /// Non-string array items are skipped.
    pub fn get_str_list(&self, field: &str) -> Option<Vec<&str>> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }

    /// Returns `true` if `field` has been produced.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Folds `partial` into this record.
    ///
    /// Every key of `partial` is inserted or overwritten (last write wins);
    /// keys not present in `partial` are left untouched.
    pub fn merge(&mut self, partial: Record) {
        self.fields.extend(partial.fields);
    }

    /// Iterates over field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over `(field, value)` pairs in sorted field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field has been produced.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the record, returning the underlying map.
    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.fields
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string_pretty(&self.fields).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}
