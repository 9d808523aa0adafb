#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod schema;
pub mod text;
pub mod traits;
pub mod types;

pub use error::{Error, FetchError, Result};
pub use schema::{normalize_collection, normalize_record, KeyKind, Normalized, RecordSchema, SortField};
pub use traits::{CollectionSource, FetchedCollection, SessionContext, StaticSession};
pub use types::{CategoryFilter, CategorySet, QueryState, Record, RecordId, SortValue, DEFAULT_PAGE_SIZE};
