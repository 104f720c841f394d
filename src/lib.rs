//! # webflow - a typed, retry-aware Webflow CMS client
//!
//! Reads collections and their items from the Webflow Data API. Every call is
//! an authenticated GET that is retried with backoff on rate limiting and
//! transient failures. Item listings are paged transparently, with a hard
//! page budget so a misbehaving server can never cause an endless walk.
//!
//! ## Quick Start
//!
//! ```no_run
//! use webflow::{Client, CollectionItem, ItemLookup, WebflowApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), webflow::Error> {
//!     let client = Client::new("my-api-token", "my-site-id")?;
//!
//!     // Collections are matched by name or slug, ignoring case.
//!     if let Some(posts) = client.find_collection_by_name("blog posts").await? {
//!         // Fetch every item, following up to 10 pages after the first.
//!         for raw in client.list_items(&posts.id, 10).await? {
//!             let item = CollectionItem::from_raw(&raw)?;
//!             println!("{} ({})", item.name, item.id);
//!         }
//!     }
//!
//!     // Or go straight to one item.
//!     let lookup = ItemLookup::new().collection_slug("post").item_name("Hello");
//!     if let Some(raw) = client.get_item(&lookup).await? {
//!         println!("{}", raw.get());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Items are opaque
//!
//! Each collection has its own schema, so items are handed back as
//! [`RawItem`]s and decoded by the caller. To process pages as they arrive
//! instead of collecting the whole listing, use
//! [`WebflowApi::for_each_item_page`]:
//!
//! ```no_run
//! use serde::Deserialize;
//! use webflow::{decode_item, Client, RawItem, WebflowApi};
//!
//! #[derive(Deserialize)]
//! struct Post {
//!     name: String,
//!     #[serde(rename = "post-summary")]
//!     summary: String,
//! }
//!
//! # async fn example(client: Client) -> Result<(), webflow::Error> {
//! let mut posts = Vec::new();
//! client
//!     .for_each_item_page("580e63fc8c9a982ac9b8b745", 10, &mut |page: Vec<RawItem>| {
//!         for raw in page {
//!             posts.push(decode_item::<Post>(&raw)?);
//!         }
//!         Ok(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Not found is not an error
//!
//! Lookups return `Ok(None)` when nothing matches. [`Error`] is reserved for
//! real failures, which [`Error::kind`] sorts into transport failures,
//! structured API errors, malformed payloads and page handler failures.
//!
//! ## Testing code that uses this crate
//!
//! Depend on [`WebflowApi`] rather than [`Client`], and hand your code a
//! [`fake::FakeApi`] in tests.

mod api;
mod client;
mod collections;
mod error;
pub mod fake;
mod items;
pub mod pagination;
pub mod rate_limit;
mod request;
mod response;
pub mod retry;

pub use api::WebflowApi;
pub use client::{Client, ClientBuilder, API_VERSION, DEFAULT_BASE_URL};
pub use collections::Collection;
pub use error::{Error, ErrorKind, ErrorResponse, Result};
pub use items::{decode_item, CollectionItem, CollectionSelector, ItemLookup, ItemPage, RawItem};
pub use request::GetRequest;
pub use response::Response;
pub use retry::{RetryPredicate, RetryStrategy};
