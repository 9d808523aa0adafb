use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::FetchError;

/// Raw rows of one collection. `truncated` is set when the source stopped
/// before the backend ran out of pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedCollection {
    pub rows: Vec<Value>,
    pub truncated: bool,
}

impl FetchedCollection {
    #[must_use]
    pub fn complete(rows: Vec<Value>) -> Self {
        Self { rows, truncated: false }
    }
}

/// Where raw collections come from: the backend REST API in production, canned
/// rows in tests. Implementations must reject rather than hand back an empty
/// or stale collection when the request fails.
pub trait CollectionSource: Send + Sync {
    fn fetch_collection<'a>(
        &'a self,
        endpoint: &'a str,
        params: &'a [(String, String)],
    ) -> BoxFuture<'a, Result<FetchedCollection, FetchError>>;
}

/// Session data injected into whatever needs to authenticate requests.
pub trait SessionContext: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()) }
    }
}

impl SessionContext for StaticSession {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
