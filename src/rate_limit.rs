//! Rate limit header parsing.
//!
//! Webflow answers over-quota requests with HTTP 429 and reports its quota in
//! `X-RateLimit-*` headers. When the server says how long to back off, the
//! client waits that long instead of using its own backoff schedule. It still
//! never exceeds the retry strategy's attempt cap.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit data extracted from a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// When the quota resets (`X-RateLimit-Reset` / `RateLimit-Reset`).
    pub reset_at: Option<SystemTime>,

    /// How long to wait before retrying (`Retry-After`).
    pub retry_after: Option<Duration>,

    /// Requests left in the current window (`X-RateLimit-Remaining`).
    pub remaining: Option<u64>,
}

impl RateLimitInfo {
    /// Extracts rate limit information from response headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use webflow::rate_limit::RateLimitInfo;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", "60".parse().unwrap());
    /// headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers).unwrap();
    /// assert!(info.retry_after.is_some());
    /// ```
    ///
    /// Returns `None` when the headers don't describe an active limit.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let info = Self {
            reset_at: parse_rate_limit_reset(headers),
            retry_after: parse_retry_after(headers),
            remaining: parse_rate_limit_remaining(headers),
        };

        info.is_rate_limited().then_some(info)
    }

    /// Returns the server-requested delay, capped by `max_wait`.
    ///
    /// Prefers `Retry-After`, falling back to the time until `reset_at`.
    pub fn delay(&self, max_wait: Duration) -> Option<Duration> {
        if let Some(retry_after) = self.retry_after {
            return Some(retry_after.min(max_wait));
        }

        let until_reset = self.reset_at?.duration_since(SystemTime::now()).ok()?;
        Some(until_reset.min(max_wait))
    }

    /// `true` if `Retry-After` is present or no requests remain.
    pub fn is_rate_limited(&self) -> bool {
        self.retry_after.is_some() || self.remaining == Some(0)
    }
}

/// Configuration for honouring server-indicated rate limits.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether to parse rate limit headers and wait as instructed.
    pub enabled: bool,

    /// Upper bound on any single server-requested wait. Defaults to 5 minutes.
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_wait: Duration::from_secs(300),
        }
    }
}

impl RateLimitConfig {
    /// Ignore rate limit headers and always use the retry strategy's delays.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Caps server-requested waits at `max_wait`.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

/// Parses `Retry-After`, as delay-seconds or an HTTP date.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?;

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    date_time.duration_since(SystemTime::now()).ok()
}

/// Parses `X-RateLimit-Reset` or `RateLimit-Reset` as a Unix timestamp.
fn parse_rate_limit_reset(headers: &HeaderMap) -> Option<SystemTime> {
    ["x-ratelimit-reset", "ratelimit-reset"]
        .iter()
        .filter_map(|name| headers.get(*name)?.to_str().ok()?.parse::<u64>().ok())
        .map(|timestamp| UNIX_EPOCH + Duration::from_secs(timestamp))
        .next()
}

fn parse_rate_limit_remaining(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("x-ratelimit-remaining")?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("60"));

        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_parse_rate_limit_reset() {
        let mut headers = HeaderMap::new();
        let future_timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            + 120;
        headers.insert(
            "ratelimit-reset",
            HeaderValue::from_str(&future_timestamp.to_string()).unwrap(),
        );

        assert!(parse_rate_limit_reset(&headers).is_some());
    }

    #[test]
    fn test_webflow_quota_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));

        let info = RateLimitInfo::from_headers(&headers).unwrap();
        assert_eq!(info.remaining, Some(0));
        assert!(info.retry_after.is_none());
        // No reset time or Retry-After: nothing to wait on.
        assert_eq!(info.delay(Duration::from_secs(300)), None);
    }

    #[test]
    fn test_remaining_quota_is_not_a_limit() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("42"));

        assert!(RateLimitInfo::from_headers(&headers).is_none());
    }

    #[test]
    fn test_rate_limit_delay_capped_by_max_wait() {
        let info = RateLimitInfo {
            reset_at: None,
            retry_after: Some(Duration::from_secs(600)),
            remaining: Some(0),
        };

        assert_eq!(
            info.delay(Duration::from_secs(300)),
            Some(Duration::from_secs(300))
        );
    }
}
