//! The collection pipeline: filter, sort, paginate, count.
//!
//! Pure functions of `(collection, QueryState)`. Nothing here fails: odd
//! input (stale pages, unknown sort modes, records missing optional fields)
//! is normalized instead.

use std::num::NonZeroUsize;

use reefdesk_core::text::normalize_term;
use reefdesk_core::{CategoryFilter, CategorySet, QueryState, Record};
use serde::Serialize;

use crate::sort::SortTable;

/// A list view's fixed configuration: its category enumeration and comparator table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionView {
    categories: CategorySet,
    sorts: SortTable,
}

impl CollectionView {
    #[must_use]
    pub fn new(categories: CategorySet, sorts: SortTable) -> Self {
        Self { categories, sorts }
    }

    #[must_use]
    pub fn compute<'a>(&self, collection: &'a [Record], query: &QueryState) -> ResultView<'a> {
        let mut filtered_sorted = filter_records(collection, query);
        self.sorts.sort(&mut filtered_sorted, &query.sort_mode);
        let window = paginate(filtered_sorted.len(), query.page_size, query.page);
        let summary = Summary::over(&self.categories, &filtered_sorted);
        ResultView { filtered_sorted, window, summary }
    }
}

/// Free-function form of [`CollectionView::compute`].
#[must_use]
pub fn compute_result_view<'a>(
    view: &CollectionView,
    collection: &'a [Record],
    query: &QueryState,
) -> ResultView<'a> {
    view.compute(collection, query)
}

/// The retain predicate. `folded_term` must come from [`normalize_term`].
#[must_use]
pub fn matches(record: &Record, folded_term: &str, category: &CategoryFilter) -> bool {
    record.matches_term(folded_term) && category.matches(record.category.as_deref())
}

/// Records passing the search and category filters, in input order.
#[must_use]
pub fn filter_records<'a>(collection: &'a [Record], query: &QueryState) -> Vec<&'a Record> {
    let term = normalize_term(&query.search_term);
    collection.iter().filter(|r| matches(r, &term, &query.category)).collect()
}

/// Resolved page bounds within a filtered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Clamped 1-indexed page; 1 when there are no pages.
    pub page: usize,
    pub total_pages: usize,
    pub start: usize,
    pub end: usize,
}

/// Clamp `requested` into `[1, max(1, total_pages)]` and compute slice bounds.
#[must_use]
pub fn paginate(total_count: usize, page_size: NonZeroUsize, requested: i64) -> PageWindow {
    let size = page_size.get();
    let total_pages = total_count.div_ceil(size);
    if total_pages == 0 {
        return PageWindow { page: 1, total_pages: 0, start: 0, end: 0 };
    }
    let last = i64::try_from(total_pages).unwrap_or(i64::MAX);
    let page = usize::try_from(requested.clamp(1, last)).unwrap_or(1);
    let start = (page - 1) * size;
    let end = (start + size).min(total_count);
    PageWindow { page, total_pages, start, end }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub key: String,
    pub count: usize,
}

/// Badge counts, always taken over the filtered sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub featured: usize,
    /// One entry per enumerated category, in enumeration order, zeros included.
    pub by_category: Vec<CategoryCount>,
}

impl Summary {
    fn over(categories: &CategorySet, records: &[&Record]) -> Self {
        let featured = records.iter().filter(|r| r.featured).count();
        let by_category = categories
            .iter()
            .map(|key| CategoryCount {
                key: key.to_string(),
                count: records.iter().filter(|r| r.category.as_deref() == Some(key)).count(),
            })
            .collect();
        Self { featured, by_category }
    }

    #[must_use]
    pub fn count_for(&self, key: &str) -> usize {
        self.by_category.iter().find(|c| c.key == key).map_or(0, |c| c.count)
    }
}

/// Derived output of one pipeline run, borrowing from the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView<'a> {
    filtered_sorted: Vec<&'a Record>,
    window: PageWindow,
    summary: Summary,
}

impl<'a> ResultView<'a> {
    #[must_use]
    pub fn filtered_sorted(&self) -> &[&'a Record] {
        &self.filtered_sorted
    }

    #[must_use]
    pub fn page_items(&self) -> &[&'a Record] {
        &self.filtered_sorted[self.window.start..self.window.end]
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.filtered_sorted.len()
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.window.total_pages
    }

    /// The page actually shown, after clamping.
    #[must_use]
    pub fn page(&self) -> usize {
        self.window.page
    }

    #[must_use]
    pub fn window(&self) -> PageWindow {
        self.window
    }

    #[must_use]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Nothing matched: render the "no results" state, not a blank page.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filtered_sorted.is_empty()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.window.page < self.window.total_pages
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.window.page > 1
    }
}
