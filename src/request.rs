//! Request description for the transport layer.

use std::fmt;

/// One GET request, relative to the client's base URL.
///
/// The path is kept as segments so identifiers are percent-encoded when the
/// URL is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetRequest {
    /// Path segments below the base URL.
    pub segments: Vec<String>,

    /// Query parameters, URL-encoded in insertion order.
    pub query_params: Vec<(String, String)>,
}

impl GetRequest {
    /// Creates a request for the given path segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query_params: Vec::new(),
        }
    }

    /// Parses a slash-separated path such as `/sites/abc/collections`.
    pub fn from_path(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    /// `GET /sites/{site_id}/collections`
    pub fn list_collections(site_id: &str) -> Self {
        Self::new(["sites", site_id, "collections"])
    }

    /// `GET /collections/{collection_id}/items?offset={offset}&limit={limit}`
    pub fn list_items(collection_id: &str, offset: usize, limit: usize) -> Self {
        Self::new(["collections", collection_id, "items"])
            .with_query_param("offset", offset.to_string())
            .with_query_param("limit", limit.to_string())
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Adds multiple query parameters to the request.
    pub fn with_query_params<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl fmt::Display for GetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
