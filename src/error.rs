//! Error types for Webflow API calls.
//!
//! Every failure a call can produce is one of the variants of [`Error`]. The
//! variants fall into four broad classes, reported by [`Error::kind`]:
//! transport failures, structured API errors, malformed success bodies, and
//! failures raised by a caller's own page handler.
//!
//! "Nothing matched" is never an error. Lookups report it as `Ok(None)`.

use crate::rate_limit::RateLimitInfo;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// The structured body Webflow returns alongside a non-2xx status.
///
/// All fields are optional on the wire; an empty JSON object still decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short human-readable summary.
    #[serde(default)]
    pub msg: String,
    /// Webflow's numeric error code.
    #[serde(default)]
    pub code: i64,
    /// Error name, e.g. `RateLimit`.
    #[serde(default)]
    pub name: String,
    /// Request path the error refers to.
    #[serde(default)]
    pub path: String,
    /// Detailed error message.
    #[serde(default)]
    pub err: String,
}

impl ErrorResponse {
    /// The message surfaced to callers: `err`, or `msg` when `err` is empty.
    pub fn message(&self) -> &str {
        if self.err.is_empty() {
            &self.msg
        } else {
            &self.err
        }
    }
}

/// The broad class an [`Error`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be built or sent, or the server's failure
    /// response could not be understood.
    Transport,
    /// The server answered with a structured error body.
    Api,
    /// A success response (or an item payload) was not the expected shape.
    Decode,
    /// A caller-supplied page handler failed.
    Callback,
}

/// The main error type for Webflow API calls.
///
/// # Examples
///
/// ```no_run
/// use webflow::{Client, Error, ErrorKind, WebflowApi};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder("token", "site").build()?;
///
/// match client.list_collections().await {
///     Ok(collections) => println!("{} collections", collections.len()),
///     Err(Error::Api { status, message, .. }) => {
///         eprintln!("Webflow refused the request ({}): {}", status, message);
///     }
///     Err(e) if e.kind() == ErrorKind::Decode => {
///         eprintln!("Unexpected payload: {:?}", e.raw_response());
///     }
///     Err(e) => eprintln!("Request failed: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Connecting, sending, or reading the body failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The client or request was configured with invalid values.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A non-2xx response whose body is not a structured error.
    #[error("Unknown API error; status code {status}: {serde_error}")]
    UnexpectedErrorBody {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// Why the body could not be read as an [`ErrorResponse`]
        serde_error: String,
        /// Rate limit information parsed from headers
        rate_limit_info: Option<RateLimitInfo>,
    },

    /// A non-2xx response carrying a structured error body.
    ///
    /// Displays as the server's message, verbatim.
    #[error("{message}")]
    Api {
        /// The HTTP status code
        status: StatusCode,
        /// The server's message (see [`ErrorResponse::message`])
        message: String,
        /// The full decoded error body
        response: ErrorResponse,
        /// Rate limit information parsed from headers
        rate_limit_info: Option<RateLimitInfo>,
    },

    /// A payload could not be decoded into the expected shape.
    ///
    /// `status` is set when the payload was a 2xx response body and unset when
    /// it was a single item handed back by pagination.
    #[error("Malformed response body: {serde_error}")]
    Decode {
        /// The payload that failed to decode
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code, if the payload was a whole response
        status: Option<StatusCode>,
    },

    /// A page handler passed to pagination returned an error.
    #[error("Page handler failed: {0}")]
    Callback(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wraps a page handler's own error.
    pub fn callback(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Callback(err.into())
    }

    /// Returns the class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_)
            | Error::Timeout
            | Error::Configuration(_)
            | Error::InvalidUrl(_)
            | Error::UnexpectedErrorBody { .. } => ErrorKind::Transport,
            Error::Api { .. } => ErrorKind::Api,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Callback(_) => ErrorKind::Callback,
        }
    }

    /// Returns `true` if this error is potentially retryable.
    ///
    /// Network errors, timeouts, 5xx and 429 responses are retryable.
    /// Everything else is a logical failure that a second attempt won't fix.
    ///
    /// # Examples
    ///
    /// ```
    /// use webflow::{Error, ErrorResponse};
    /// use http::StatusCode;
    ///
    /// let err = Error::Api {
    ///     status: StatusCode::TOO_MANY_REQUESTS,
    ///     message: "slow down".to_string(),
    ///     response: ErrorResponse::default(),
    ///     rate_limit_info: None,
    /// };
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::Api {
    ///     status: StatusCode::NOT_FOUND,
    ///     message: "no such collection".to_string(),
    ///     response: ErrorResponse::default(),
    ///     rate_limit_info: None,
    /// };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Timeout => true,
            Error::Api { status, .. } | Error::UnexpectedErrorBody { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Error::Decode { .. } => false,
            Error::Configuration(_) => false,
            Error::InvalidUrl(_) => false,
            Error::Callback(_) => false,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::UnexpectedErrorBody { status, .. } => Some(*status),
            Error::Decode { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::UnexpectedErrorBody { raw_response, .. } => Some(raw_response),
            Error::Decode { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns rate limit information if the server sent any.
    pub fn rate_limit_info(&self) -> Option<&RateLimitInfo> {
        match self {
            Error::Api {
                rate_limit_info, ..
            }
            | Error::UnexpectedErrorBody {
                rate_limit_info, ..
            } => rate_limit_info.as_ref(),
            _ => None,
        }
    }

    /// Returns the server-requested delay, capped by `max_wait`.
    pub fn rate_limit_delay(&self, max_wait: std::time::Duration) -> Option<std::time::Duration> {
        self.rate_limit_info()?.delay(max_wait)
    }
}

/// A specialized `Result` type for Webflow API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: StatusCode, body: ErrorResponse) -> Error {
        Error::Api {
            status,
            message: body.message().to_string(),
            response: body,
            rate_limit_info: None,
        }
    }

    #[test]
    fn test_api_error_displays_server_message() {
        let body = ErrorResponse {
            msg: "Rate limit hit".to_string(),
            code: 429,
            name: "RateLimit".to_string(),
            path: "/sites/abc/collections".to_string(),
            err: "rate limiting you!".to_string(),
        };
        let err = api_error(StatusCode::TOO_MANY_REQUESTS, body);

        assert_eq!(err.to_string(), "rate limiting you!");
        assert_eq!(err.kind(), ErrorKind::Api);
    }

    #[test]
    fn test_message_falls_back_to_msg() {
        let body: ErrorResponse = serde_json::from_str(r#"{"msg": "Bad request"}"#).unwrap();
        assert_eq!(body.message(), "Bad request");
        assert_eq!(body.code, 0);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::Timeout.kind(), ErrorKind::Transport);
        assert_eq!(
            Error::Configuration("bad".into()).kind(),
            ErrorKind::Transport
        );
        let err = Error::UnexpectedErrorBody {
            status: StatusCode::BAD_GATEWAY,
            raw_response: "<html>".to_string(),
            serde_error: "expected value".to_string(),
            rate_limit_info: None,
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.is_retryable());

        let err = Error::Decode {
            raw_response: "nope".to_string(),
            serde_error: "expected value at line 1 column 1".to_string(),
            status: Some(StatusCode::OK),
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!err.is_retryable());
        assert!(err.to_string().starts_with("Malformed response body"));

        let err = Error::callback("handler gave up");
        assert_eq!(err.kind(), ErrorKind::Callback);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retried() {
        let err = api_error(StatusCode::BAD_REQUEST, ErrorResponse::default());
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(err.raw_response().is_none());
    }
}
