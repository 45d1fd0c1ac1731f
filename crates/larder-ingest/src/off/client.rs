// Open Food Facts search client

use crate::config::{ImportConfig, USER_AGENT};
use crate::error::HttpError;
use crate::off::retry::{parse_retry_after, RetryPolicy};
use crate::off::{SearchResponse, PRODUCT_FIELDS};
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// HTTP session for the search endpoint, reused for every page
pub struct OffClient {
    client: Client,
    search_url: String,
    page_size: u32,
    retry: RetryPolicy,
}

/// One failed attempt and whether it may be repeated
struct Failure {
    error: HttpError,
    retryable: bool,
    retry_after: Option<Duration>,
}

impl Failure {
    fn transport(error: reqwest::Error) -> Self {
        Self {
            retryable: !error.is_builder(),
            error: HttpError::Transport(error),
            retry_after: None,
        }
    }
}

impl OffClient {
    pub fn new(config: &ImportConfig) -> Result<Self, HttpError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(HttpError::Client)?;

        Ok(Self {
            client,
            search_url: config.search_url(),
            page_size: config.page_size,
            retry: config.retry,
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }

    /// Fetch one page of search results (pages start at 1)
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, page: u32) -> Result<SearchResponse, HttpError> {
        let body = self.get_with_retry(page).await?;
        let response: SearchResponse = serde_json::from_slice(&body)?;

        debug!(page, products = response.products.len(), "Decoded search response");

        Ok(response)
    }

    fn query(&self, page: u32) -> [(&'static str, String); 6] {
        [
            ("search_simple", "1".to_string()),
            ("action", "process".to_string()),
            ("page_size", self.page_size.to_string()),
            ("page", page.to_string()),
            ("json", "1".to_string()),
            ("fields", PRODUCT_FIELDS.to_string()),
        ]
    }

    async fn get_with_retry(&self, page: u32) -> Result<Vec<u8>, HttpError> {
        let mut attempt = 1;

        loop {
            let failure = match self.get_once(page).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            if !failure.retryable {
                return Err(failure.error);
            }

            if attempt >= self.retry.max_attempts {
                return Err(HttpError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(failure.error),
                });
            }

            let delay = self.retry.delay_for(attempt, failure.retry_after);
            warn!(
                page,
                attempt,
                max_attempts = self.retry.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure.error,
                "Search request failed, retrying"
            );

            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn get_once(&self, page: u32) -> Result<Vec<u8>, Failure> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&self.query(page))
            .send()
            .await
            .map_err(Failure::transport)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = if RetryPolicy::honors_retry_after(status) {
                response.headers().get(RETRY_AFTER).and_then(parse_retry_after)
            } else {
                None
            };

            return Err(Failure {
                error: HttpError::Status {
                    status,
                    url: response.url().to_string(),
                },
                retryable: RetryPolicy::is_retryable_status(status),
                retry_after,
            });
        }

        let body = response.bytes().await.map_err(Failure::transport)?;
        Ok(body.to_vec())
    }
}
