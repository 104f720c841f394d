//! Successful transport responses.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A decoded 2xx response plus details of how it was obtained.
///
/// # Examples
///
/// ```no_run
/// use webflow::{Client, GetRequest, Response};
/// use serde_json::Value;
///
/// # async fn example() -> Result<(), webflow::Error> {
/// let client = Client::builder("token", "site").build()?;
///
/// let response: Response<Value> = client.get(GetRequest::from_path("/info")).await?;
/// if response.was_retried() {
///     println!("needed {} attempts over {:?}", response.attempts, response.latency);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response body.
    pub data: T,

    /// The raw response body.
    pub raw_body: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from the first attempt until this response arrived, including
    /// any backoff between retries.
    pub latency: Duration,

    /// Attempts made, 1 if the first one succeeded.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Discards the metadata and returns the decoded body.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_response_accessors() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("59"));

        let response = Response::new(
            vec![1, 2, 3],
            "[1,2,3]".to_string(),
            StatusCode::OK,
            headers,
            Duration::from_millis(12),
            2,
        );

        assert!(response.was_retried());
        assert_eq!(response.header("x-ratelimit-remaining"), Some("59"));
        assert_eq!(response.len(), 3);
        assert_eq!(response.into_data(), vec![1, 2, 3]);
    }
}
