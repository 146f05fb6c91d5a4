use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::ScrapeError;

const ATTEMPTS: u32 = 3;
const BACKOFF: Duration = Duration::from_secs(7);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches one page at a time with a bounded retry on transport
/// failures. Knows nothing about what the page contains.
pub struct PageFetcher {
    client: Client,
    attempts: u32,
    backoff: Duration,
}

impl PageFetcher {
    /// Build a fetcher with the caller-supplied header set. Header
    /// contents are configuration, not fetcher logic.
    pub fn new(headers: HeaderMap) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            attempts: ATTEMPTS,
            backoff: BACKOFF,
        }
    }

    /// `None` means the page is unavailable and should be skipped.
    ///
    /// Only transport failures are retried; the HTTP status is never
    /// inspected, so an error body flows downstream as-is and fails
    /// extraction there instead.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        for attempt in 1..=self.attempts {
            match self.try_fetch(url).await {
                Ok(body) => return Some(body),
                Err(err) => {
                    warn!(url, attempt, %err, "transport failure");
                    if attempt < self.attempts {
                        info!("retrying in {:?}", self.backoff);
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
        None
    }

    async fn try_fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        response.text().await
    }
}
