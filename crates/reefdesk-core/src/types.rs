//! Domain types used by the collection pipeline and its collaborators.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::fold_search;

/// Page size used when a view does not configure one.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(12) {
    Some(n) => n,
    None => panic!("default page size must be non-zero"),
};

/// Stable record identity as issued by the backend.
///
/// Numeric ids order before textual ids; this is the tie-break order used by
/// every comparator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl Ord for RecordId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Number(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Number(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for RecordId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A comparable value a record exposes for one sort mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
}

impl SortValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Finite numbers only; NaN and infinities read as missing.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// One normalized item of a fetched collection.
///
/// - `search_text`: folded concatenation of the searchable fields
/// - `category`: lowercased discrete key (difficulty, status, ...)
/// - `sort_keys`: sort-mode name to comparable value
/// - `raw`: the original JSON object, kept for renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub display_name: String,
    pub search_text: String,
    pub category: Option<String>,
    pub sort_keys: BTreeMap<String, SortValue>,
    pub featured: bool,
    pub raw: serde_json::Value,
}

impl Record {
    /// A record whose only searchable text is its display name.
    pub fn new(id: impl Into<RecordId>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            id: id.into(),
            search_text: fold_search(&display_name),
            display_name,
            category: None,
            sort_keys: BTreeMap::new(),
            featured: false,
            raw: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn with_search_text<S: AsRef<str>>(mut self, parts: &[S]) -> Self {
        let joined = parts.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\n");
        self.search_text = fold_search(&joined);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl AsRef<str>) -> Self {
        let key = category.as_ref().trim().to_lowercase();
        self.category = (!key.is_empty()).then_some(key);
        self
    }

    #[must_use]
    pub fn with_sort_key(mut self, mode: impl Into<String>, value: SortValue) -> Self {
        self.sort_keys.insert(mode.into(), value);
        self
    }

    #[must_use]
    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    #[must_use]
    pub fn sort_key(&self, mode: &str) -> Option<&SortValue> {
        self.sort_keys.get(mode)
    }

    /// `folded_term` must already be trimmed and folded; empty matches all.
    #[must_use]
    pub fn matches_term(&self, folded_term: &str) -> bool {
        folded_term.is_empty() || self.search_text.contains(folded_term)
    }
}

/// Category/status/difficulty filter chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// `"all"` (any case) or blank selects everything; anything else is a key.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let key = input.trim().to_lowercase();
        if key.is_empty() || key == "all" {
            Self::All
        } else {
            Self::Only(key)
        }
    }

    /// A record without a category only ever matches `All`.
    #[must_use]
    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => category == Some(wanted.as_str()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for CategoryFilter {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(key) => f.write_str(key),
        }
    }
}

/// Fixed, ordered enumeration of the category values a view knows about.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CategorySet(Vec<String>);

impl CategorySet {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys: Vec<String> = Vec::new();
        for value in values {
            let key = value.as_ref().trim().to_lowercase();
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self(keys)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }
}

/// User-controlled parameters of one list view.
///
/// `page` is 1-indexed and signed; out-of-range requests are clamped by the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub search_term: String,
    pub category: CategoryFilter,
    pub sort_mode: String,
    pub page: i64,
    pub page_size: NonZeroUsize,
}

impl QueryState {
    pub fn new(page_size: NonZeroUsize, sort_mode: impl Into<String>) -> Self {
        Self {
            search_term: String::new(),
            category: CategoryFilter::All,
            sort_mode: sort_mode.into(),
            page: 1,
            page_size,
        }
    }

    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, mode: impl Into<String>) -> Self {
        self.sort_mode = mode.into();
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, "name")
    }
}
