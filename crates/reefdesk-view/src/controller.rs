use reefdesk_core::{CategoryFilter, QueryState, Record};
use tracing::debug;

use crate::pipeline::{CollectionView, ResultView};

/// Owns one view's collection and query state.
///
/// Each setter is one user action: it mutates the query and hands back the
/// recomputed [`ResultView`]. Changing the search term or the category filter
/// also returns to page 1.
#[derive(Debug, Clone)]
pub struct QueryController {
    view: CollectionView,
    initial: QueryState,
    query: QueryState,
    collection: Vec<Record>,
}

impl QueryController {
    #[must_use]
    pub fn new(view: CollectionView, query: QueryState) -> Self {
        Self { view, initial: query.clone(), query, collection: Vec::new() }
    }

    #[must_use]
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    #[must_use]
    pub fn collection(&self) -> &[Record] {
        &self.collection
    }

    #[must_use]
    pub fn view(&self) -> ResultView<'_> {
        let result = self.view.compute(&self.collection, &self.query);
        debug!(
            total = result.total_count(),
            page = result.page(),
            pages = result.total_pages(),
            "recomputed result view"
        );
        result
    }

    /// Swap in a freshly fetched collection; the query is kept as is.
    pub fn set_collection(&mut self, records: Vec<Record>) -> ResultView<'_> {
        self.collection = records;
        self.view()
    }

    pub fn clear_collection(&mut self) {
        self.collection.clear();
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) -> ResultView<'_> {
        self.query.search_term = term.into();
        self.query.page = 1;
        self.view()
    }

    pub fn set_category_filter(&mut self, category: CategoryFilter) -> ResultView<'_> {
        self.query.category = category;
        self.query.page = 1;
        self.view()
    }

    pub fn set_sort_mode(&mut self, mode: impl Into<String>) -> ResultView<'_> {
        self.query.sort_mode = mode.into();
        self.view()
    }

    pub fn set_page(&mut self, page: i64) -> ResultView<'_> {
        self.query.page = page;
        self.view()
    }

    /// Step forward from the page currently shown (after clamping).
    pub fn next_page(&mut self) -> ResultView<'_> {
        let shown = i64::try_from(self.view().page()).unwrap_or(i64::MAX);
        self.set_page(shown.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> ResultView<'_> {
        let shown = i64::try_from(self.view().page()).unwrap_or(1);
        self.set_page(shown - 1)
    }

    /// Back to the state the view was mounted with. The collection is kept.
    pub fn reset_query(&mut self) -> ResultView<'_> {
        self.query = self.initial.clone();
        self.view()
    }
}
