use crate::types::{AggregatorError, FetchConfig, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Shared HTTP plumbing for every provider adapter.
///
/// Requests are sent once. A non-2xx status becomes `AggregatorError::HttpStatus`.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let redirect = if config.follow_redirects {
            reqwest::redirect::Policy::limited(config.max_redirects)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(redirect)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a request and return the body as text.
    pub async fn fetch_text(&self, request: RequestBuilder) -> Result<String> {
        let start_time = Instant::now();
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();

        if !status.is_success() {
            warn!("HTTP {} from {}", status, url);
            return Err(AggregatorError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_response_size_mb {
                return Err(AggregatorError::ResponseTooLarge { size_mb });
            }
        }

        let body = response.text().await?;
        debug!(
            "Fetched {} ({} bytes in {}ms)",
            url,
            body.len(),
            start_time.elapsed().as_millis()
        );
        Ok(body)
    }

    /// Send a request and deserialize the JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.fetch_text(request).await?;
        serde_json::from_str(&body)
            .map_err(|e| AggregatorError::Parse(format!("Invalid JSON response: {}", e)))
    }
}
