//! Comparator tables: sort-mode name to ordering rule.
//!
//! Every rule orders by a primary key, puts records lacking that key last,
//! and falls back to `id` ascending. Unknown modes leave input order alone.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use reefdesk_core::text::CollationKey;
use reefdesk_core::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// What a rank table looks up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankSource {
    Category,
    SortKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparator {
    /// Display name, accent- and case-insensitive.
    Name,
    /// Fixed ordinal table; values outside it sort last.
    Rank { source: RankSource, ranks: HashMap<String, u32> },
    Numeric(String),
    Date(String),
    /// Free text under a sort key, collated like names.
    Text(String),
    /// Featured records first.
    Featured,
}

impl Comparator {
    /// Rank table where the first value ranks 1, the next 2, and so on.
    pub fn rank<I, S>(source: RankSource, ordered: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ranks = HashMap::new();
        for value in ordered {
            let next = u32::try_from(ranks.len() + 1).unwrap_or(u32::MAX);
            ranks.entry(rank_label(value.as_ref())).or_insert(next);
        }
        Self::Rank { source, ranks }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub comparator: Comparator,
    pub direction: SortDirection,
}

impl SortSpec {
    #[must_use]
    pub fn ascending(comparator: Comparator) -> Self {
        Self { comparator, direction: SortDirection::Ascending }
    }

    #[must_use]
    pub fn descending(comparator: Comparator) -> Self {
        Self { comparator, direction: SortDirection::Descending }
    }

    fn key_of(&self, record: &Record) -> Option<Key> {
        match &self.comparator {
            Comparator::Name => name_key(&record.display_name),
            Comparator::Rank { source, ranks } => {
                let label = match source {
                    RankSource::Category => record.category.as_deref(),
                    RankSource::SortKey(mode) => record.sort_key(mode).and_then(|v| v.as_text()),
                }?;
                ranks.get(&rank_label(label)).copied().map(Key::Rank)
            }
            Comparator::Numeric(mode) => record.sort_key(mode).and_then(|v| v.as_number()).map(Key::Number),
            Comparator::Date(mode) => record.sort_key(mode).and_then(|v| v.as_date()).map(Key::Date),
            Comparator::Text(mode) => record.sort_key(mode).and_then(|v| v.as_text()).and_then(name_key),
            Comparator::Featured => Some(Key::Flag(record.featured)),
        }
    }

    /// Primary-key ordering only: present keys by direction, missing keys last.
    fn compare_keys(&self, a: Option<&Key>, b: Option<&Key>) -> Ordering {
        match (a, b) {
            (Some(x), Some(y)) => self.direction.apply(x.cmp_same(y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Sort mode name to rule, for one view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortTable {
    specs: BTreeMap<String, SortSpec>,
}

impl SortTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(mut self, name: impl Into<String>, spec: SortSpec) -> Self {
        self.specs.insert(name.into(), spec);
        self
    }

    #[must_use]
    pub fn get(&self, mode: &str) -> Option<&SortSpec> {
        self.specs.get(mode)
    }

    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Order `records` in place by `mode`. Unrecognized modes keep input order.
    pub fn sort(&self, records: &mut Vec<&Record>, mode: &str) {
        let Some(spec) = self.get(mode) else { return };
        let mut keyed: Vec<(Option<Key>, &Record)> =
            records.drain(..).map(|r| (spec.key_of(r), r)).collect();
        keyed.sort_by(|(ka, a), (kb, b)| {
            spec.compare_keys(ka.as_ref(), kb.as_ref()).then_with(|| a.id.cmp(&b.id))
        });
        records.extend(keyed.into_iter().map(|(_, r)| r));
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Key {
    Name(CollationKey),
    Rank(u32),
    Number(f64),
    Date(DateTime<Utc>),
    Flag(bool),
}

impl Key {
    fn cmp_same(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Name(a), Self::Name(b)) => a.cmp(b),
            (Self::Rank(a), Self::Rank(b)) => a.cmp(b),
            // finite by construction; -0.0 and 0.0 tie
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            // true before false
            (Self::Flag(a), Self::Flag(b)) => b.cmp(a),
            _ => Ordering::Equal,
        }
    }
}

fn name_key(raw: &str) -> Option<Key> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| Key::Name(CollationKey::new(raw)))
}

fn rank_label(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_labels_ignore_spacing_and_case() {
        assert_eq!(rank_label("Open Water"), "open_water");
        assert_eq!(rank_label(" advanced-open_water "), "advanced_open_water");
    }

    #[test]
    fn first_listed_value_ranks_lowest() {
        let Comparator::Rank { ranks, .. } =
            Comparator::rank(RankSource::Category, ["beginner", "intermediate", "beginner"])
        else {
            panic!("expected a rank comparator");
        };
        assert_eq!(ranks.get("beginner"), Some(&1));
        assert_eq!(ranks.get("intermediate"), Some(&2));
        assert_eq!(ranks.len(), 2);
    }
}
