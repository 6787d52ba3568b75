//! Remote document fetching for `pdfUrl` requests.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// Trait for byte sources that can retrieve a document by URL
#[async_trait]
pub trait ByteFetcher: Send + Sync {
    /// Fetch the full body at `url`.
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Plain HTTP(S) fetcher
pub struct HttpFetcher {
    client: Client,
    max_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeout, user agent and size limit.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::FetchRequest(format!("could not build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }
}

#[async_trait]
impl ByteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        debug!("Fetching PDF from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::FetchRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Fetching {} returned HTTP {}", url, status);
            return Err(Error::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length()
            && length > self.max_bytes
        {
            return Err(Error::FetchTooLarge {
                limit: self.max_bytes,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::FetchRequest(format!("could not read response body: {e}")))?;

        check_body(url, body, self.max_bytes)
    }
}

/// Reject empty or oversized bodies.
pub(crate) fn check_body(url: &str, body: Bytes, max_bytes: u64) -> Result<Bytes> {
    if body.is_empty() {
        return Err(Error::FetchEmpty(url.to_string()));
    }

    if u64::try_from(body.len()).unwrap_or(u64::MAX) > max_bytes {
        return Err(Error::FetchTooLarge { limit: max_bytes });
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_body() {
        let url = "https://example.com/a.pdf";
        assert!(matches!(check_body(url, Bytes::new(), 10), Err(Error::FetchEmpty(_))));
        assert!(matches!(
            check_body(url, Bytes::from_static(b"0123456789AB"), 10),
            Err(Error::FetchTooLarge { limit: 10 })
        ));
        assert!(check_body(url, Bytes::from_static(b"%PDF-"), 10).is_ok());
    }

    #[test]
    fn test_http_fetcher_builds_from_default_config() {
        assert!(HttpFetcher::new(&FetchConfig::default()).is_ok());
    }
}
