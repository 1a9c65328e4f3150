//! ETF2L API client.
//!
//! Low-level HTTP client: rate limiting, request serialization, status
//! handling and the pagination driver. Resource-specific operations are
//! implemented via traits on model types.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Etf2lError, Result};
use crate::pagination::{skip_page, NextPage, Page, Paged, Request};
use crate::rate_limit::{RateLimitConfig, RateLimiter};

pub const DEFAULT_API_URL: &str = "https://api-v2.etf2l.org";
const USER_AGENT: &str = concat!("etf2l-rs/", env!("CARGO_PKG_VERSION"));
const JSON: &str = "application/json";

/// Consecutive 5xx pages skipped before a recursive fetch gives up.
pub const DEFAULT_MAX_PAGE_SKIPS: u32 = 15;

/// Pause between pages of a recursive fetch.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Configuration for [`Etf2lClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin; request paths are joined onto it.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Token bucket applied to every request. `None` disables throttling.
    pub rate_limit: Option<RateLimitConfig>,
    /// Pause inserted before each follow-up page of a recursive fetch.
    pub page_delay: Duration,
    /// Consecutive server-error pages a recursive fetch may skip.
    pub max_page_skips: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(60),
            rate_limit: Some(RateLimitConfig::default()),
            page_delay: DEFAULT_PAGE_DELAY,
            max_page_skips: DEFAULT_MAX_PAGE_SKIPS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API origin
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the rate limiter
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set the pause between pages of a recursive fetch
    pub fn page_delay(mut self, delay: Duration) -> Self {
        self.config.page_delay = delay;
        self
    }

    /// Set how many consecutive failing pages may be skipped
    pub fn max_page_skips(mut self, skips: u32) -> Self {
        self.config.max_page_skips = skips;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Low-level ETF2L API client.
///
/// All calls made through one client, and through its clones, share one
/// rate limiter and run one at a time. Entity-specific operations are
/// implemented via the `Get` and `List` traits on model types.
///
/// # Example
///
/// ```no_run
/// use etf2l::Etf2lClient;
///
/// # fn example() -> etf2l::Result<()> {
/// // Default origin, rate limited to 60 requests per 10 seconds
/// let client = Etf2lClient::new()?;
///
/// // Or configure from ETF2L_* environment variables
/// let client = Etf2lClient::from_env()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Etf2lClient {
    http: Client,
    base_url: Arc<Url>,
    limiter: Option<RateLimiter>,
    call_lock: Arc<Mutex<()>>,
    page_delay: Duration,
    max_page_skips: u32,
}

impl std::fmt::Debug for Etf2lClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Etf2lClient")
            .field("base_url", &self.base_url.as_str())
            .field("limiter", &self.limiter)
            .field("page_delay", &self.page_delay)
            .field("max_page_skips", &self.max_page_skips)
            .finish_non_exhaustive()
    }
}

impl Etf2lClient {
    /// Create a client for the public API with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client from environment variables.
    ///
    /// - `ETF2L_API_URL`: API origin (defaults to `https://api-v2.etf2l.org`)
    /// - `ETF2L_RATE_LIMIT`: `requests/seconds` (e.g. `60/10`); `off`,
    ///   `false` or `0` disables throttling
    /// - `ETF2L_PAGE_DELAY_MS`: pause between pages of a recursive fetch
    /// - `ETF2L_MAX_PAGE_SKIPS`: consecutive failing pages a fetch may skip
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self> {
        let mut builder = ClientConfig::builder();

        if let Ok(url) = env::var("ETF2L_API_URL") {
            builder = builder.base_url(url);
        }

        if let Ok(value) = env::var("ETF2L_RATE_LIMIT") {
            let value = value.trim().to_ascii_lowercase();
            if matches!(value.as_str(), "off" | "false" | "0") {
                builder = builder.no_rate_limit();
            } else {
                builder = builder.rate_limit(parse_rate_limit(&value)?);
            }
        }

        if let Ok(value) = env::var("ETF2L_PAGE_DELAY_MS") {
            let millis: u64 = value.trim().parse().map_err(|_| {
                Etf2lError::InvalidConfig(format!("ETF2L_PAGE_DELAY_MS is not a number: {value}"))
            })?;
            builder = builder.page_delay(Duration::from_millis(millis));
        }

        if let Ok(value) = env::var("ETF2L_MAX_PAGE_SKIPS") {
            let skips: u32 = value.trim().parse().map_err(|_| {
                Etf2lError::InvalidConfig(format!("ETF2L_MAX_PAGE_SKIPS is not a number: {value}"))
            })?;
            builder = builder.max_page_skips(skips);
        }

        Self::with_config(builder.build())
    }

    /// Create a client from an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or the rate limit is invalid.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Etf2lError::InvalidConfig(format!(
                "base URL '{}' cannot carry paths",
                config.base_url
            )));
        }

        let limiter = config
            .rate_limit
            .as_ref()
            .map(RateLimiter::new)
            .transpose()?;

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .build()
            .map_err(Etf2lError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            limiter,
            call_lock: Arc::new(Mutex::new(())),
            page_delay: config.page_delay,
            max_page_skips: config.max_page_skips,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared rate limiter, if throttling is enabled.
    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.limiter.as_ref()
    }

    /// Run one GET against an API-relative path and decode the JSON body.
    ///
    /// Waits for the client-wide call lock and a rate-limit token first.
    /// Never retries.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        cancel: &CancellationToken,
        path: &str,
    ) -> Result<T> {
        let url = self.base_url.join(path)?;

        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Etf2lError::Cancelled),
            guard = self.call_lock.lock() => guard,
        };

        if let Some(limiter) = &self.limiter {
            limiter.acquire(cancel).await?;
        }

        let request = self
            .http
            .get(url)
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON);

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Etf2lError::Cancelled),
            body = Self::send(request, path) => body?,
        };

        serde_json::from_slice(&body).map_err(Etf2lError::DecodeFailed)
    }

    /// Fetch exactly one page and keep its pager metadata.
    pub async fn fetch_page<P: Paged>(
        &self,
        cancel: &CancellationToken,
        request: &Request,
    ) -> Result<Page<P::Item>> {
        let envelope: P = self.execute(cancel, &request.target()).await?;
        Ok(Page::from_envelope(envelope))
    }

    /// Fetch every page of a resource and concatenate the records.
    ///
    /// Stops after the first page unless the request is recursive. A
    /// recursive fetch skips pages that answer with a server error, up to
    /// `max_page_skips` in a row. Any other failure drops what was
    /// collected and returns the error.
    #[tracing::instrument(
        skip(self, cancel, request),
        fields(path = %request.path(), recursive = request.is_recursive())
    )]
    pub async fn paginate<P: Paged>(
        &self,
        cancel: &CancellationToken,
        request: Request,
    ) -> Result<Vec<P::Item>> {
        let mut request = request;
        let mut items = Vec::new();
        let mut consecutive_failures: u32 = 0;

        loop {
            let target = request.target();

            let envelope: P = match self.execute(cancel, &target).await {
                Ok(envelope) => envelope,
                Err(e) if e.is_server_error() && request.is_recursive() => {
                    consecutive_failures += 1;
                    if consecutive_failures > self.max_page_skips {
                        warn!(
                            path = %target,
                            failures = consecutive_failures,
                            "Too many consecutive server errors, giving up"
                        );
                        return Err(e);
                    }

                    let next = skip_page(&target)?;
                    warn!(path = %target, next = %next, error = %e, "Skipping page");
                    request = request.follow(next);
                    continue;
                }
                Err(e) => return Err(e),
            };
            consecutive_failures = 0;

            let info = envelope.page_info();
            let next = envelope.next_path(request.is_recursive())?;
            let records = envelope.into_items();
            debug!(
                page = info.current_page,
                last_page = info.last_page,
                records = records.len(),
                "Fetched page"
            );
            items.extend(records);

            match next {
                NextPage::End => return Ok(items),
                NextPage::Path(next) => {
                    if next == target {
                        return Err(Etf2lError::PaginationLoop { path: next });
                    }
                    self.pace(cancel).await?;
                    request = request.follow(next);
                }
            }
        }
    }

    async fn pace(&self, cancel: &CancellationToken) -> Result<()> {
        if self.page_delay.is_zero() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Etf2lError::Cancelled),
            _ = tokio::time::sleep(self.page_delay) => Ok(()),
        }
    }

    async fn send(request: RequestBuilder, path: &str) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(Etf2lError::HttpError)?;
        let response = Self::check_response(response, path).await?;
        let body = response.bytes().await.map_err(Etf2lError::HttpError)?;
        Ok(body.to_vec())
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response, path: &str) -> Result<Response> {
        let status = response.status();
        let code = status.as_u16();

        if (200..=226).contains(&code) {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(Etf2lError::NotFound {
                path: path.to_string(),
            }),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse().ok());
                Err(Etf2lError::RateLimited {
                    retry_after_secs: retry_after,
                })
            }
            _ => {
                let message = Self::extract_error_message(response, status).await;
                Err(Etf2lError::UnexpectedStatus { code, message })
            }
        }
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) if !b.trim().is_empty() => b,
            _ => return format!("HTTP {status}"),
        };

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
            let message = json
                .get("message")
                .or_else(|| json.pointer("/status/message"))
                .or_else(|| json.get("error"))
                .and_then(|m| m.as_str());
            if let Some(msg) = message {
                return msg.to_string();
            }
        }

        body
    }
}

/// Parse `requests/seconds` as used by `ETF2L_RATE_LIMIT`.
fn parse_rate_limit(value: &str) -> Result<RateLimitConfig> {
    let invalid = || {
        Etf2lError::InvalidConfig(format!(
            "ETF2L_RATE_LIMIT must look like requests/seconds: {value}"
        ))
    };

    let (requests, seconds) = value.split_once('/').ok_or_else(invalid)?;
    let requests: u32 = requests.trim().parse().map_err(|_| invalid())?;
    let seconds: u64 = seconds.trim().parse().map_err(|_| invalid())?;
    if requests == 0 || seconds == 0 {
        return Err(invalid());
    }

    Ok(RateLimitConfig::per_window(
        requests,
        Duration::from_secs(seconds),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = Etf2lClient::new().unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("Etf2lClient"));
        assert!(debug.contains("api-v2.etf2l.org"));
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.max_page_skips, 15);
        assert_eq!(config.page_delay, Duration::from_secs(1));
        assert_eq!(config.rate_limit, Some(RateLimitConfig::default()));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::builder()
            .base_url("http://localhost:8080")
            .no_rate_limit()
            .page_delay(Duration::ZERO)
            .max_page_skips(3)
            .build();

        let client = Etf2lClient::with_config(config).unwrap();
        assert!(client.rate_limiter().is_none());
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::builder().base_url("not a url").build();
        assert!(matches!(
            Etf2lClient::with_config(config),
            Err(Etf2lError::UrlError(_))
        ));
    }

    #[test]
    fn test_invalid_rate_limit() {
        let config = ClientConfig::builder()
            .rate_limit(RateLimitConfig::new(0, Duration::from_secs(1)))
            .build();
        assert!(matches!(
            Etf2lClient::with_config(config),
            Err(Etf2lError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_rate_limit() {
        let config = parse_rate_limit("60/10").unwrap();
        assert_eq!(config, RateLimitConfig::per_window(60, Duration::from_secs(10)));

        assert!(parse_rate_limit("60").is_err());
        assert!(parse_rate_limit("0/10").is_err());
        assert!(parse_rate_limit("a/b").is_err());
    }

    #[test]
    fn test_clones_share_limiter_bucket() {
        let config = ClientConfig::builder()
            .rate_limit(RateLimitConfig::new(1, Duration::from_secs(60)))
            .build();
        let client = Etf2lClient::with_config(config).unwrap();
        let clone = client.clone();

        assert!(client.rate_limiter().unwrap().check());
        assert!(!clone.rate_limiter().unwrap().check());
    }
}
