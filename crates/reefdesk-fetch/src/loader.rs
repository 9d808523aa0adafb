//! Acquisition state for one list view.
//!
//! Every request is issued under a generation [`Ticket`]. Only the newest
//! ticket may settle the loader, so a slow response to a superseded request
//! is dropped instead of overwriting the newer collection.

use reefdesk_core::{normalize_collection, CollectionSource, FetchError, FetchedCollection, RecordSchema};
use reefdesk_view::{QueryController, ResultView, ViewProfile};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading {
        generation: u64,
    },
    /// `truncated`: the source hit its page cap, so the collection is partial.
    Ready {
        count: usize,
        dropped: usize,
        truncated: bool,
    },
    Failed(FetchError),
}

/// One issued request. Stale once a newer ticket has been issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    endpoint: String,
    params: Vec<(String, String)>,
}

impl Ticket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

pub struct CollectionLoader<S> {
    source: S,
    endpoint: String,
    params: Vec<(String, String)>,
    generation: u64,
    state: LoadState,
}

impl<S: CollectionSource> CollectionLoader<S> {
    pub fn new(source: S, endpoint: impl Into<String>) -> Self {
        Self { source, endpoint: endpoint.into(), params: Vec::new(), generation: 0, state: LoadState::Idle }
    }

    /// Extra query parameters sent with every request, e.g. `status=approved`.
    #[must_use]
    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Issue a new request, superseding any in flight.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        if let LoadState::Loading { generation } = self.state {
            debug!(endpoint = %self.endpoint, superseded = generation, "superseding in-flight request");
        }
        self.state = LoadState::Loading { generation: self.generation };
        Ticket { generation: self.generation, endpoint: self.endpoint.clone(), params: self.params.clone() }
    }

    /// Re-issue the last request after a failure. `None` when nothing failed.
    pub fn retry(&mut self) -> Option<Ticket> {
        match self.state {
            LoadState::Failed(_) => Some(self.begin()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        matches!(self.state, LoadState::Loading { generation } if generation == ticket.generation)
    }

    pub async fn fetch(&self, ticket: &Ticket) -> Result<FetchedCollection, FetchError> {
        self.source.fetch_collection(&ticket.endpoint, &ticket.params).await
    }

    fn settle(&mut self, state: LoadState) {
        self.state = state;
    }
}

/// What a list panel should render right now.
#[derive(Debug)]
pub enum PanelStatus<'a> {
    Idle,
    Loading,
    Failed(&'a FetchError),
    NoResults,
    Results(ResultView<'a>),
}

/// A list view wired to its backend collection.
pub struct Panel<S> {
    schema: RecordSchema,
    loader: CollectionLoader<S>,
    controller: QueryController,
}

impl<S: CollectionSource> Panel<S> {
    pub fn new(profile: &ViewProfile, source: S) -> Self {
        Self {
            schema: profile.schema.clone(),
            loader: CollectionLoader::new(source, profile.endpoint),
            controller: profile.controller(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.loader = self.loader.with_params(params);
        self
    }

    #[must_use]
    pub fn loader(&self) -> &CollectionLoader<S> {
        &self.loader
    }

    #[must_use]
    pub fn controller(&self) -> &QueryController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut QueryController {
        &mut self.controller
    }

    pub fn begin(&mut self) -> Ticket {
        self.loader.begin()
    }

    pub async fn fetch(&self, ticket: &Ticket) -> Result<FetchedCollection, FetchError> {
        self.loader.fetch(ticket).await
    }

    /// Apply a finished request. A failure clears the collection so nothing
    /// stale is shown next to the error. Returns `false` for a stale ticket.
    pub fn apply(&mut self, ticket: &Ticket, outcome: Result<FetchedCollection, FetchError>) -> bool {
        if !self.loader.is_current(ticket) {
            debug!(endpoint = %ticket.endpoint, generation = ticket.generation, "discarding stale response");
            return false;
        }
        let state = match outcome {
            Ok(FetchedCollection { rows, truncated }) => {
                let normalized = normalize_collection(&rows, &self.schema);
                let count = normalized.records.len();
                info!(endpoint = %ticket.endpoint, count, dropped = normalized.dropped, "collection loaded");
                if truncated {
                    warn!(endpoint = %ticket.endpoint, count, "collection is incomplete");
                }
                let _ = self.controller.set_collection(normalized.records);
                LoadState::Ready { count, dropped: normalized.dropped, truncated }
            }
            Err(err) => {
                error!(endpoint = %ticket.endpoint, error = %err, "collection load failed");
                self.controller.clear_collection();
                LoadState::Failed(err)
            }
        };
        self.loader.settle(state);
        true
    }

    /// Issue, await and apply one request.
    pub async fn load(&mut self) -> bool {
        let ticket = self.begin();
        let outcome = self.loader.fetch(&ticket).await;
        self.apply(&ticket, outcome)
    }

    /// Re-run the last request if it failed.
    pub async fn retry(&mut self) -> bool {
        let Some(ticket) = self.loader.retry() else {
            return false;
        };
        let outcome = self.loader.fetch(&ticket).await;
        self.apply(&ticket, outcome)
    }

    #[must_use]
    pub fn status(&self) -> PanelStatus<'_> {
        match self.loader.state() {
            LoadState::Idle => PanelStatus::Idle,
            LoadState::Loading { .. } => PanelStatus::Loading,
            LoadState::Failed(err) => PanelStatus::Failed(err),
            LoadState::Ready { .. } => {
                let view = self.controller.view();
                if view.is_empty() {
                    PanelStatus::NoResults
                } else {
                    PanelStatus::Results(view)
                }
            }
        }
    }
}
