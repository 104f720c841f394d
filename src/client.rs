//! HTTP client with retry logic and rich error handling.
//!
//! The [`Client`] type talks to the Webflow Data API. Use [`ClientBuilder`]
//! to configure and create clients.

use crate::{
    collections::Collection,
    items::ItemPage,
    rate_limit::{RateLimitConfig, RateLimitInfo},
    request::GetRequest,
    retry::{RetryOnRetryable, RetryPredicate, RetryStrategy},
    Error, ErrorResponse, Response, Result, WebflowApi,
};
use async_trait::async_trait;
use http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Production API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.webflow.com";

/// Value sent in the `Accept-Version` header.
pub const API_VERSION: &str = "1.0.0";

/// A client for reading a Webflow site's CMS.
///
/// The client is cheap to clone and safe to share. Configuration is fixed at
/// construction; connection pooling is left to the underlying `reqwest`
/// client.
///
/// # Examples
///
/// ```no_run
/// use webflow::{Client, ItemLookup, RetryStrategy, WebflowApi};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), webflow::Error> {
/// let client = Client::builder("my-token", "my-site-id")
///     .timeout(Duration::from_secs(30))
///     .retry_strategy(RetryStrategy::Linear {
///         delay: Duration::from_millis(500),
///         max_retries: 3,
///     })
///     .build()?;
///
/// let posts = client.find_collection_by_slug("post").await?;
/// if let Some(posts) = posts {
///     let items = client.list_items(&posts.id, 10).await?;
///     println!("{} has {} items", posts.name, items.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    site_id: String,
    default_headers: HeaderMap,
    retry_strategy: RetryStrategy,
    retry_predicate: Box<dyn RetryPredicate>,
    timeout: Option<Duration>,
    rate_limit_config: RateLimitConfig,
}

impl Client {
    /// Creates a new `ClientBuilder` for the given API token and site.
    pub fn builder(token: impl Into<String>, site_id: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(token, site_id)
    }

    /// Creates a client with default settings.
    pub fn new(token: impl Into<String>, site_id: impl Into<String>) -> Result<Self> {
        Self::builder(token, site_id).build()
    }

    /// The site whose collections this client lists.
    pub fn site_id(&self) -> &str {
        &self.inner.site_id
    }

    /// The URL requests are made against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Makes an authenticated GET request and decodes the JSON body as `Res`.
    ///
    /// Failures the retry predicate accepts are retried according to the
    /// retry strategy. Once retries are exhausted the last error is returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use webflow::{Client, Collection, GetRequest};
    ///
    /// # async fn example() -> Result<(), webflow::Error> {
    /// let client = Client::builder("my-token", "my-site-id").build()?;
    ///
    /// let request = GetRequest::list_collections(client.site_id());
    /// let collections = client.get::<Vec<Collection>>(request).await?;
    /// println!("took {} attempt(s)", collections.attempts);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<Res>(&self, request: GetRequest) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = match self.execute_request(&request, attempt).await {
                Ok(response) => {
                    self.parse_response(response, start_time.elapsed(), attempt)
                        .await
                }
                Err(e) => Err(e),
            };

            let error = match result {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                path = %request,
                "Request failed"
            );

            if !self.inner.retry_predicate.should_retry(&error, attempt) {
                return Err(error);
            }

            let Some(backoff) = self.inner.retry_strategy.delay_for_attempt(attempt) else {
                tracing::warn!(attempts = attempt, path = %request, "Retries exhausted");
                return Err(error);
            };

            // Prefer the server's own schedule when it gives one.
            let delay = match self.server_requested_delay(&error) {
                Some(delay) => {
                    tracing::info!(
                        rate_limit_delay_ms = delay.as_millis(),
                        attempt = attempt,
                        "Rate limited - waiting before retry"
                    );
                    delay
                }
                None => {
                    tracing::info!(
                        delay_ms = backoff.as_millis(),
                        attempt = attempt,
                        "Retrying request after delay"
                    );
                    backoff
                }
            };

            tokio::time::sleep(delay).await;
        }
    }

    /// Makes a GET request to a path this crate doesn't model and returns
    /// the body undecoded.
    pub async fn get_raw(&self, path: &str, query: &[(&str, &str)]) -> Result<Box<RawValue>> {
        let request = GetRequest::from_path(path).with_query_params(query.iter().copied());
        Ok(self.get::<Box<RawValue>>(request).await?.into_data())
    }

    fn server_requested_delay(&self, error: &Error) -> Option<Duration> {
        if !self.inner.rate_limit_config.enabled {
            return None;
        }
        error.rate_limit_delay(self.inner.rate_limit_config.max_wait)
    }

    fn url_for(&self, request: &GetRequest) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::Configuration(format!(
                    "Base URL cannot have a path: {}",
                    self.inner.base_url
                ))
            })?;
            segments.pop_if_empty().extend(&request.segments);
        }

        if !request.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query_params);
        }

        Ok(url)
    }

    /// Executes a single request attempt.
    async fn execute_request(
        &self,
        request: &GetRequest,
        attempt: usize,
    ) -> Result<reqwest::Response> {
        let url = self.url_for(request)?;

        tracing::debug!(
            method = "GET",
            url = %url,
            attempt = attempt,
            "Executing HTTP request"
        );

        let mut builder = self
            .inner
            .http_client
            .get(url)
            .headers(self.inner.default_headers.clone());

        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout
            } else {
                Error::Network(e)
            }
        })
    }

    /// Classifies the response and decodes its body.
    async fn parse_response<Res>(
        &self,
        response: reqwest::Response,
        latency: Duration,
        attempts: usize,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let status = response.status();
        let headers = response.headers().clone();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            attempts = attempts,
            "Received HTTP response"
        );

        let raw_body = response.text().await?;

        if !status.is_success() {
            return Err(self.failure_from_body(status, &headers, raw_body));
        }

        match serde_json::from_str::<Res>(&raw_body) {
            Ok(data) => Ok(Response::new(
                data, raw_body, status, headers, latency, attempts,
            )),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    raw_response = %raw_body,
                    "Failed to deserialize response"
                );

                Err(Error::Decode {
                    raw_response: raw_body,
                    serde_error: e.to_string(),
                    status: Some(status),
                })
            }
        }
    }

    /// Turns a non-2xx response into an [`Error::Api`], or into an
    /// [`Error::UnexpectedErrorBody`] if the body isn't a structured error.
    fn failure_from_body(&self, status: StatusCode, headers: &HeaderMap, raw_body: String) -> Error {
        let rate_limit_info = if self.inner.rate_limit_config.enabled {
            RateLimitInfo::from_headers(headers)
        } else {
            None
        };

        match parse_error_body(&raw_body) {
            Ok(response) => {
                if status.is_client_error() {
                    tracing::error!(
                        status = status.as_u16(),
                        name = %response.name,
                        message = %response.message(),
                        "Client error (4xx)"
                    );
                } else {
                    tracing::warn!(
                        status = status.as_u16(),
                        name = %response.name,
                        message = %response.message(),
                        "Server error"
                    );
                }

                Error::Api {
                    status,
                    message: response.message().to_string(),
                    response,
                    rate_limit_info,
                }
            }
            Err(e) => {
                tracing::error!(
                    status = status.as_u16(),
                    response = %raw_body,
                    "Unreadable error response"
                );

                Error::UnexpectedErrorBody {
                    status,
                    raw_response: raw_body,
                    serde_error: e,
                    rate_limit_info,
                }
            }
        }
    }
}

/// Decodes a structured error body. Only JSON objects qualify: with every
/// field defaulted, serde would otherwise accept arrays as well.
fn parse_error_body(raw_body: &str) -> std::result::Result<ErrorResponse, String> {
    let value: serde_json::Value = serde_json::from_str(raw_body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err(format!("expected a JSON object, found {}", value));
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("site_id", &self.inner.site_id)
            .field("retry_strategy", &self.inner.retry_strategy)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl WebflowApi for Client {
    async fn list_collections(&self) -> Result<Vec<Collection>> {
        let request = GetRequest::list_collections(&self.inner.site_id);
        Ok(self.get::<Vec<Collection>>(request).await?.into_data())
    }

    async fn fetch_item_page(
        &self,
        collection_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<ItemPage> {
        let request = GetRequest::list_items(collection_id, offset, limit);
        Ok(self.get::<ItemPage>(request).await?.into_data())
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use webflow::{ClientBuilder, RetryStrategy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), webflow::Error> {
/// let client = ClientBuilder::new("my-token", "my-site-id")
///     .base_url("http://localhost:8080")?
///     .retry_strategy(RetryStrategy::ExponentialBackoff {
///         initial_delay: Duration::from_millis(100),
///         max_delay: Duration::from_secs(10),
///         max_retries: 3,
///         jitter: true,
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    token: String,
    site_id: String,
    base_url: Option<Url>,
    http_client: Option<reqwest::Client>,
    retry_strategy: RetryStrategy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    timeout: Option<Duration>,
    rate_limit_config: RateLimitConfig,
}

impl ClientBuilder {
    /// Creates a builder with default settings.
    pub fn new(token: impl Into<String>, site_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            site_id: site_id.into(),
            base_url: None,
            http_client: None,
            retry_strategy: RetryStrategy::default(),
            retry_predicate: None,
            timeout: None,
            rate_limit_config: RateLimitConfig::default(),
        }
    }

    /// Creates a builder from `WEBFLOW_API_TOKEN`, `WEBFLOW_SITE_ID` and,
    /// if set, `WEBFLOW_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the base URL is
    /// invalid.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| Error::Configuration(format!("{} is not set", name)))
        };

        let builder = Self::new(var("WEBFLOW_API_TOKEN")?, var("WEBFLOW_SITE_ID")?);
        match std::env::var("WEBFLOW_BASE_URL") {
            Ok(url) => builder.base_url(url),
            Err(_) => Ok(builder),
        }
    }

    /// Overrides the API endpoint, e.g. to point at a local test server.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sends requests through an existing `reqwest` client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the retry strategy for failed requests.
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets a custom retry predicate.
    ///
    /// By default, requests are retried based on `Error::is_retryable()`.
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the rate limit configuration.
    pub fn rate_limit_config(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit_config = config;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token can't be sent as a header or the HTTP
    /// client can't be created.
    pub fn build(self) -> Result<Client> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let mut authorization = HeaderValue::try_from(format!("Bearer {}", self.token))
            .map_err(|e| Error::Configuration(format!("Invalid API token: {}", e)))?;
        authorization.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(AUTHORIZATION, authorization);
        default_headers.insert(
            HeaderName::from_static("accept-version"),
            HeaderValue::from_static(API_VERSION),
        );

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::Configuration(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnRetryable));

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                site_id: self.site_id,
                default_headers,
                retry_strategy: self.retry_strategy,
                retry_predicate,
                timeout: self.timeout,
                rate_limit_config: self.rate_limit_config,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_keeps_base_path_and_encodes_segments() {
        let client = Client::builder("token", "site")
            .base_url("http://localhost:9000/proxy/")
            .unwrap()
            .build()
            .unwrap();

        let url = client
            .url_for(&GetRequest::list_items("a b/c", 100, 100))
            .unwrap();

        assert_eq!(
            url.as_str(),
            "http://localhost:9000/proxy/collections/a%20b%2Fc/items?offset=100&limit=100"
        );
    }

    #[test]
    fn test_url_without_query() {
        let client = Client::new("token", "mysiteid").unwrap();

        let url = client
            .url_for(&GetRequest::list_collections(client.site_id()))
            .unwrap();

        assert_eq!(url.as_str(), "https://api.webflow.com/sites/mysiteid/collections");
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let result = Client::new("bad\ntoken", "site");
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = Client::builder("token", "site").base_url("not a url");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_error_body_must_be_an_object() {
        let response = parse_error_body(r#"{"err": "ValidationError: bad id"}"#).unwrap();
        assert_eq!(response.message(), "ValidationError: bad id");

        assert!(parse_error_body("{}").is_ok());
        assert!(parse_error_body("[]").is_err());
        assert!(parse_error_body(r#"["oops"]"#).is_err());
        assert!(parse_error_body("null").is_err());
        assert!(parse_error_body("Not found").is_err());
    }

    #[test]
    fn test_builder_from_env() {
        std::env::remove_var("WEBFLOW_API_TOKEN");
        std::env::remove_var("WEBFLOW_SITE_ID");
        std::env::remove_var("WEBFLOW_BASE_URL");

        match ClientBuilder::from_env() {
            Err(Error::Configuration(msg)) => assert!(msg.contains("WEBFLOW_API_TOKEN")),
            other => panic!("Expected Configuration error, got {:?}", other.map(|_| ())),
        }

        std::env::set_var("WEBFLOW_API_TOKEN", "env-token");
        match ClientBuilder::from_env() {
            Err(Error::Configuration(msg)) => assert!(msg.contains("WEBFLOW_SITE_ID")),
            other => panic!("Expected Configuration error, got {:?}", other.map(|_| ())),
        }

        std::env::set_var("WEBFLOW_SITE_ID", "env-site");
        std::env::set_var("WEBFLOW_BASE_URL", "http://localhost:9000/");
        let client = ClientBuilder::from_env().unwrap().build().unwrap();
        assert_eq!(client.site_id(), "env-site");
        assert_eq!(client.base_url().as_str(), "http://localhost:9000/");

        std::env::remove_var("WEBFLOW_API_TOKEN");
        std::env::remove_var("WEBFLOW_SITE_ID");
        std::env::remove_var("WEBFLOW_BASE_URL");
    }

    #[test]
    fn test_debug_hides_token() {
        let client = Client::new("secret-token", "site").unwrap();
        let debug = format!("{:?}", client);

        assert!(debug.contains("site"));
        assert!(!debug.contains("secret-token"));
    }
}
