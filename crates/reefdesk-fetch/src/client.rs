use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reefdesk_core::config::ApiSettings;
use reefdesk_core::{CollectionSource, Error, FetchError, FetchedCollection, SessionContext};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::envelope::decode_page;

/// Collection source backed by the resort's REST API.
pub struct HttpCollectionSource {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionContext>,
    max_pages: usize,
}

impl HttpCollectionSource {
    pub fn new(settings: &ApiSettings, session: Arc<dyn SessionContext>) -> reefdesk_core::Result<Self> {
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|e| Error::InvalidConfig(format!("api.base_url '{base}': {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        Ok(Self { client, base_url, session, max_pages: settings.max_pages.max(1) })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(String, String)]) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| FetchError::Transport { endpoint: endpoint.to_string(), reason: e.to_string() })?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    async fn get_json(&self, url: Url, endpoint: &str) -> Result<Value, FetchError> {
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = self.session.bearer_token() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(|e| transport(endpoint, &e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { endpoint: endpoint.to_string(), status: status.as_u16() });
        }
        let body = response.bytes().await.map_err(|e| transport(endpoint, &e))?;
        serde_json::from_slice(&body)
            .map_err(|e| FetchError::MalformedJson { endpoint: endpoint.to_string(), reason: e.to_string() })
    }

    /// Fetch every row of `endpoint`, following paginator links up to `max_pages`.
    /// Rows gathered before the cap are returned with `truncated` set.
    pub async fn fetch_all(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<FetchedCollection, FetchError> {
        let mut url = self.endpoint_url(endpoint, params)?;
        let mut rows = Vec::new();
        for page_no in 1..=self.max_pages {
            let page = decode_page(self.get_json(url.clone(), endpoint).await?, endpoint)?;
            rows.extend(page.rows);
            let Some(next) = page.next else {
                info!(endpoint, rows = rows.len(), pages = page_no, "collection fetched");
                return Ok(FetchedCollection::complete(rows));
            };
            url = url
                .join(&next)
                .map_err(|e| FetchError::UnexpectedShape { endpoint: endpoint.to_string(), reason: e.to_string() })?;
            debug!(endpoint, page_no, next = %url, "following next page");
        }
        warn!(endpoint, max_pages = self.max_pages, rows = rows.len(), "stopped following pagination");
        Ok(FetchedCollection { rows, truncated: true })
    }
}

impl CollectionSource for HttpCollectionSource {
    fn fetch_collection<'a>(
        &'a self,
        endpoint: &'a str,
        params: &'a [(String, String)],
    ) -> BoxFuture<'a, Result<FetchedCollection, FetchError>> {
        self.fetch_all(endpoint, params).boxed()
    }
}

fn transport(endpoint: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout { endpoint: endpoint.to_string() }
    } else {
        FetchError::Transport { endpoint: endpoint.to_string(), reason: err.to_string() }
    }
}

/// In-memory collections keyed by endpoint, for offline browsing and tests.
/// Unknown endpoints answer like a missing route.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    collections: HashMap<String, Vec<Value>>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, endpoint: impl Into<String>, rows: Vec<Value>) -> Self {
        self.collections.insert(endpoint.into(), rows);
        self
    }
}

impl CollectionSource for StaticSource {
    fn fetch_collection<'a>(
        &'a self,
        endpoint: &'a str,
        _params: &'a [(String, String)],
    ) -> BoxFuture<'a, Result<FetchedCollection, FetchError>> {
        let outcome = self
            .collections
            .get(endpoint)
            .cloned()
            .map(FetchedCollection::complete)
            .ok_or_else(|| FetchError::Status { endpoint: endpoint.to_string(), status: 404 });
        futures::future::ready(outcome).boxed()
    }
}
