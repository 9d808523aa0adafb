//! Boundary normalization: loosely-typed JSON rows into [`Record`]s.
//!
//! The backend serializes Eloquent models, so numbers may arrive as strings,
//! booleans as 0/1, and related models as nested objects. Everything is
//! resolved here once so the pipeline never has to guess at field shapes.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::text::fold_search;
use crate::types::{Record, RecordId, SortValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    Text,
    Number,
    Date,
}

/// Which JSON field feeds which sort mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub mode: String,
    pub field: String,
    pub kind: KeyKind,
}

/// Field mapping for one kind of record. Field names may be dotted paths
/// into nested objects (`site.name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub id_field: String,
    pub name_field: String,
    pub search_fields: Vec<String>,
    pub category_field: Option<String>,
    pub featured_field: Option<String>,
    pub sort_fields: Vec<SortField>,
}

impl RecordSchema {
    pub fn new(name_field: impl Into<String>) -> Self {
        Self {
            id_field: "id".to_string(),
            name_field: name_field.into(),
            search_fields: Vec::new(),
            category_field: None,
            featured_field: None,
            sort_fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn search<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn category(mut self, field: impl Into<String>) -> Self {
        self.category_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn featured(mut self, field: impl Into<String>) -> Self {
        self.featured_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, mode: impl Into<String>, field: impl Into<String>, kind: KeyKind) -> Self {
        self.sort_fields.push(SortField { mode: mode.into(), field: field.into(), kind });
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.id_field.trim().is_empty() {
            return Err(Error::InvalidSchema("id field must not be empty".to_string()));
        }
        if self.name_field.trim().is_empty() {
            return Err(Error::InvalidSchema("name field must not be empty".to_string()));
        }
        let mut modes = HashSet::new();
        for sort in &self.sort_fields {
            if sort.mode.trim().is_empty() || sort.field.trim().is_empty() {
                return Err(Error::InvalidSchema("sort mode and field must not be empty".to_string()));
            }
            if !modes.insert(sort.mode.as_str()) {
                return Err(Error::InvalidSchema(format!("sort mode '{}' mapped twice", sort.mode)));
            }
        }
        Ok(())
    }
}

/// Records ready for the pipeline plus how many raw rows were rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub records: Vec<Record>,
    pub dropped: usize,
}

/// Normalize a fetched collection, dropping rows without a usable id and
/// later duplicates of an id already seen.
pub fn normalize_collection(values: &[Value], schema: &RecordSchema) -> Normalized {
    let mut seen = HashSet::new();
    let mut out = Normalized::default();
    for (index, value) in values.iter().enumerate() {
        let Some(record) = normalize_record(value, schema) else {
            debug!(index, "row has no usable id");
            out.dropped += 1;
            continue;
        };
        if !seen.insert(record.id.clone()) {
            debug!(index, id = %record.id, "duplicate id");
            out.dropped += 1;
            continue;
        }
        out.records.push(record);
    }
    if out.dropped > 0 {
        warn!(dropped = out.dropped, kept = out.records.len(), "dropped malformed rows from collection");
    }
    out
}

/// `None` only when the row is not an object or carries no usable id;
/// every other missing field takes its default.
#[must_use]
pub fn normalize_record(value: &Value, schema: &RecordSchema) -> Option<Record> {
    if !value.is_object() {
        return None;
    }
    let id = lookup(value, &schema.id_field).and_then(parse_id)?;
    let display_name = lookup(value, &schema.name_field)
        .and_then(text_of)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let mut record = Record::new(id, display_name);
    if !schema.search_fields.is_empty() {
        let parts: Vec<String> = schema
            .search_fields
            .iter()
            .filter_map(|field| lookup(value, field).and_then(text_of))
            .filter(|s| !s.trim().is_empty())
            .collect();
        record.search_text = fold_search(&parts.join("\n"));
    }
    if let Some(field) = &schema.category_field {
        if let Some(text) = lookup(value, field).and_then(text_of) {
            record = record.with_category(text);
        }
    }
    if let Some(field) = &schema.featured_field {
        record.featured = lookup(value, field).is_some_and(parse_flag);
    }
    for sort in &schema.sort_fields {
        let Some(raw) = lookup(value, &sort.field) else { continue };
        let parsed = match sort.kind {
            KeyKind::Text => text_of(raw)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(SortValue::Text),
            KeyKind::Number => parse_number(raw).map(SortValue::Number),
            KeyKind::Date => parse_date(raw).map(SortValue::Date),
        };
        if let Some(v) = parsed {
            record.sort_keys.insert(sort.mode.clone(), v);
        }
    }
    record.raw = value.clone();
    Some(record)
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let found = path.split('.').try_fold(value, |node, segment| node.get(segment))?;
    (!found.is_null()).then_some(found)
}

fn parse_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.is_finite()).map(|f| f as i64))
            .map(RecordId::Number),
        Value::String(s) if !s.trim().is_empty() => Some(RecordId::Text(s.trim().to_string())),
        _ => None,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(text_of).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

fn parse_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    }
}
