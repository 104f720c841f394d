//! Collections and how to pick one out of a site's listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A CMS collection, as returned by `GET /sites/{site_id}/collections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique identifier.
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,

    /// Display name, e.g. `Blog Posts`.
    #[serde(default)]
    pub name: String,

    /// URL slug, e.g. `post`.
    #[serde(default)]
    pub slug: String,

    /// Name of a single item, e.g. `Blog Post`.
    #[serde(default)]
    pub singular_name: String,
}

impl Collection {
    /// Creates a collection with only its identity fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            last_updated: None,
            created_on: None,
            name: name.into(),
            slug: slug.into(),
            singular_name: String::new(),
        }
    }
}

/// First collection whose name matches, ignoring case.
pub(crate) fn find_by_name(collections: Vec<Collection>, name: &str) -> Option<Collection> {
    find_ignoring_case(collections, name, |c| c.name.as_str())
}

/// First collection whose slug matches, ignoring case.
pub(crate) fn find_by_slug(collections: Vec<Collection>, slug: &str) -> Option<Collection> {
    find_ignoring_case(collections, slug, |c| c.slug.as_str())
}

fn find_ignoring_case<F>(collections: Vec<Collection>, wanted: &str, field: F) -> Option<Collection>
where
    F: Fn(&Collection) -> &str,
{
    let wanted = wanted.to_lowercase();
    collections
        .into_iter()
        .find(|c| field(c).to_lowercase() == wanted)
}
