//! Catalog search client and bag discovery
//!
//! The catalog search endpoint returns pages of `{"results": [...], "next": url|null}`.
//! Discovery follows `next` with an explicit cursor and refuses to revisit a page.

use crate::error::DiscoveryError;
use crate::models::{Bag, SearchPage};
use crate::utils::{retry_transient, RetryPolicy};
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

const SEARCH_PATH: &str = "/api/catalog/data/catalog/digital_objects/.json";
const USER_AGENT: &str = concat!("etd-harvest/", env!("CARGO_PKG_VERSION"));

/// Build the first search page URL for a project/bag-name filter
///
/// Filter shape: `{"filter":{"project":P,"bag":{"$regex":R}}}`
pub fn search_url(base_url: &str, project: &str, bag_pattern: &str) -> Result<String, DiscoveryError> {
    let filter = serde_json::json!({
        "filter": {
            "project": project,
            "bag": { "$regex": bag_pattern }
        }
    });

    let endpoint = format!("{}{}", base_url.trim_end_matches('/'), SEARCH_PATH);
    let url = reqwest::Url::parse_with_params(&endpoint, &[("query", filter.to_string())])
        .map_err(|e| DiscoveryError::Parse {
            url: endpoint.clone(),
            message: e.to_string(),
        })?;

    Ok(url.into())
}

/// Request URL without its query string, for logs and errors
///
/// Values that do not parse as URLs are returned unchanged.
pub fn loggable_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.into()
        }
        Err(_) => url.to_string(),
    }
}

/// Source of catalog search pages
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<SearchPage, DiscoveryError>;
}

/// HTTP client for the catalog search endpoint
pub struct CatalogClient {
    http_client: reqwest::Client,
    retry: RetryPolicy,
}

impl CatalogClient {
    pub fn new(retry: RetryPolicy) -> Result<Self, DiscoveryError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DiscoveryError::Network {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self { http_client, retry })
    }

    async fn fetch_once(&self, url: &str) -> Result<SearchPage, DiscoveryError> {
        let shown = loggable_url(url);
        debug!(url = %shown, "Fetching catalog page");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| DiscoveryError::Network {
                url: shown.clone(),
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Http {
                status: status.as_u16(),
                url: shown,
            });
        }

        let body = response.text().await.map_err(|e| DiscoveryError::Network {
            url: shown.clone(),
            message: e.without_url().to_string(),
        })?;

        serde_json::from_str(&body).map_err(|e| DiscoveryError::Parse {
            url: shown,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PageSource for CatalogClient {
    async fn fetch_page(&self, url: &str) -> Result<SearchPage, DiscoveryError> {
        retry_transient("catalog page", self.retry, || self.fetch_once(url)).await
    }
}

/// Lazy, per-run sequence of bags matching the search filter
pub struct BagDiscovery<S> {
    source: S,
    start_url: String,
    cancel: CancellationToken,
}

impl<S: PageSource> BagDiscovery<S> {
    pub fn new(source: S, start_url: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            source,
            start_url: start_url.into(),
            cancel,
        }
    }

    /// Stream bags in page order
    ///
    /// Each call starts again from the first page. The first error ends the
    /// stream; a `next` URL that was already visited is a
    /// [`DiscoveryError::PaginationLoop`].
    pub fn bags(&self) -> impl Stream<Item = Result<Bag, DiscoveryError>> + '_ {
        async_stream::try_stream! {
            let mut visited: HashSet<String> = HashSet::new();
            let mut cursor = Some(self.start_url.clone());
            let mut page_number = 0usize;

            while let Some(url) = cursor.take() {
                if self.cancel.is_cancelled() {
                    Err::<(), _>(DiscoveryError::Cancelled)?;
                }
                if !visited.insert(url.clone()) {
                    Err::<(), _>(DiscoveryError::PaginationLoop { url: loggable_url(&url) })?;
                }

                page_number += 1;
                let page = self.source.fetch_page(&url).await?;
                debug!(
                    page = page_number,
                    results = page.results.len(),
                    has_next = page.next.is_some(),
                    "Catalog page received"
                );

                cursor = page.next.filter(|next| !next.trim().is_empty());
                for bag in page.results {
                    yield bag;
                }
            }
        }
    }

    /// Materialize every bag; any page failure fails the whole list
    pub async fn collect(&self) -> Result<Vec<Bag>, DiscoveryError> {
        let bags: Vec<Bag> = self.bags().try_collect().await?;
        info!(bags = bags.len(), "Catalog discovery complete");
        Ok(bags)
    }
}
