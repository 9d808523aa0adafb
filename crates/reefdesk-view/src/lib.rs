//! reefdesk-view
//!
//! The reusable list-view pipeline: a [`CollectionView`] (category enumeration
//! + comparator table) turns a collection and a [`reefdesk_core::QueryState`]
//! into a [`ResultView`]; a [`QueryController`] owns the state behind one page.
pub mod controller;
pub mod pipeline;
pub mod profiles;
pub mod sort;

pub use controller::QueryController;
pub use pipeline::{
    compute_result_view, filter_records, matches, paginate, CategoryCount, CollectionView, PageWindow, ResultView,
    Summary,
};
pub use profiles::{builtin_profiles, profile, ViewProfile, PROFILE_NAMES};
pub use sort::{Comparator, RankSource, SortDirection, SortSpec, SortTable};
