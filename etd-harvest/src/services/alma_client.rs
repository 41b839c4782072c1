//! Bibliographic service (Alma) client
//!
//! Fetches `{base}/almaws/v1/bibs/{mmsid}?expand=None&apikey={key}` and returns
//! the XML body as a [`BibRecord`]. The API key is injected at construction and
//! never logged.

use crate::error::{is_transient_status, BibFetchError};
use crate::models::BibRecord;
use crate::utils::{retry_transient, RetryPolicy};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};

const BIBS_PATH: &str = "/almaws/v1/bibs";
const USER_AGENT: &str = concat!("etd-harvest/", env!("CARGO_PKG_VERSION"));

/// Source of raw bib records keyed by MMS ID
#[async_trait]
pub trait BibRecordSource: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<BibRecord, BibFetchError>;
}

/// Alma bibs API client with rate limiting and retry
pub struct AlmaClient {
    http_client: reqwest::Client,
    rate_limiter: DefaultDirectRateLimiter,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl AlmaClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        requests_per_second: u32,
        retry: RetryPolicy,
    ) -> Result<Self, BibFetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BibFetchError::permanent("", e.to_string()))?;

        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            http_client,
            rate_limiter,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            retry,
        })
    }

    fn record_url(&self, identifier: &str) -> String {
        format!("{}{}/{}", self.base_url, BIBS_PATH, identifier)
    }

    async fn fetch_once(&self, identifier: &str) -> Result<BibRecord, BibFetchError> {
        self.rate_limiter.until_ready().await;

        let url = self.record_url(identifier);
        debug!(mmsid = %identifier, url = %url, "Querying bibliographic service");

        let response = self
            .http_client
            .get(&url)
            .query(&[("expand", "None"), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                // reqwest errors embed the full URL, key included
                BibFetchError::transient(identifier, format!("network error: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let cause = format!("HTTP {}", status.as_u16());
            return Err(if is_transient_status(status) {
                BibFetchError::transient(identifier, cause)
            } else {
                BibFetchError::permanent(identifier, cause)
            });
        }

        let body = response.text().await.map_err(|e| {
            BibFetchError::transient(identifier, format!("body read failed: {}", e.without_url()))
        })?;

        let record = BibRecord::parse(identifier, body)?;
        info!(mmsid = %identifier, bytes = record.xml().len(), "Retrieved bib record");
        Ok(record)
    }
}

#[async_trait]
impl BibRecordSource for AlmaClient {
    async fn fetch(&self, identifier: &str) -> Result<BibRecord, BibFetchError> {
        retry_transient("bib record", self.retry, || self.fetch_once(identifier)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_url_strips_trailing_slash() {
        let client = AlmaClient::new(
            "https://alma.example.com/",
            "secret".to_string(),
            10,
            RetryPolicy::default(),
        )
        .unwrap();

        assert_eq!(
            client.record_url("99123456"),
            "https://alma.example.com/almaws/v1/bibs/99123456"
        );
    }

    #[test]
    fn test_zero_rate_falls_back_to_one_per_second() {
        assert!(AlmaClient::new("https://a.test", "k".into(), 0, RetryPolicy::default()).is_ok());
    }
}
