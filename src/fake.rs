//! An in-memory [`WebflowApi`] for tests.
//!
//! [`FakeApi`] serves canned collections and items without touching the
//! network. Items are paged the way Webflow pages them, so code under test
//! exercises the same pagination and lookup logic it would against the real
//! service.
//!
//! ```
//! use webflow::fake::FakeApi;
//! use webflow::{Collection, ItemLookup, WebflowApi};
//! use serde_json::{json, value::to_raw_value};
//!
//! # async fn example() -> webflow::Result<()> {
//! let api = FakeApi::new()
//!     .with_collection(Collection::new("1", "dogs", "dogs"))
//!     .with_items("1", vec![to_raw_value(&json!({"_id": "7", "name": "rex"})).unwrap()]);
//!
//! let lookup = ItemLookup::new().collection_name("Dogs").item_name("rex");
//! assert!(api.get_item(&lookup).await?.is_some());
//! # Ok(())
//! # }
//! ```

use crate::collections::Collection;
use crate::items::{ItemPage, RawItem};
use crate::{Result, WebflowApi};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Canned collections and items, served in pages.
#[derive(Debug)]
pub struct FakeApi {
    collections: Vec<Collection>,
    items: HashMap<String, Vec<RawItem>>,
    reported_totals: HashMap<String, usize>,
    page_size: usize,
    page_fetches: AtomicUsize,
}

impl FakeApi {
    /// An empty site that serves up to 100 items per page.
    pub fn new() -> Self {
        Self {
            collections: Vec::new(),
            items: HashMap::new(),
            reported_totals: HashMap::new(),
            page_size: crate::pagination::PAGE_LIMIT,
            page_fetches: AtomicUsize::new(0),
        }
    }

    /// Appends a collection to the site's listing.
    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collections.push(collection);
        self
    }

    /// Appends items to the collection with the given ID.
    pub fn with_items(
        mut self,
        collection_id: impl Into<String>,
        items: impl IntoIterator<Item = RawItem>,
    ) -> Self {
        self.items
            .entry(collection_id.into())
            .or_default()
            .extend(items);
        self
    }

    /// Caps every page at `page_size` items (at least 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Reports `total` for the collection regardless of how many items it
    /// really has, as a misbehaving server would.
    pub fn with_reported_total(mut self, collection_id: impl Into<String>, total: usize) -> Self {
        self.reported_totals.insert(collection_id.into(), total);
        self
    }

    /// Number of item pages served so far.
    pub fn page_fetches(&self) -> usize {
        self.page_fetches.load(Ordering::SeqCst)
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebflowApi for FakeApi {
    async fn list_collections(&self) -> Result<Vec<Collection>> {
        Ok(self.collections.clone())
    }

    async fn fetch_item_page(
        &self,
        collection_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<ItemPage> {
        self.page_fetches.fetch_add(1, Ordering::SeqCst);

        let all = self
            .items
            .get(collection_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let limit = limit.min(self.page_size);
        let start = offset.min(all.len());
        let end = start.saturating_add(limit).min(all.len());
        let items = all[start..end].to_vec();

        Ok(ItemPage {
            count: items.len(),
            limit,
            offset: start,
            total: self
                .reported_totals
                .get(collection_id)
                .copied()
                .unwrap_or(all.len()),
            items,
        })
    }
}
