//! reefdesk-fetch
//!
//! Collection acquisition for the list views: the HTTP [`HttpCollectionSource`],
//! response envelope decoding and the [`Panel`] that ties a loader to a
//! [`reefdesk_view::QueryController`].
pub mod client;
pub mod envelope;
pub mod loader;

pub use client::{HttpCollectionSource, StaticSource};
pub use envelope::{decode_page, Page};
pub use loader::{CollectionLoader, LoadState, Panel, PanelStatus, Ticket};
