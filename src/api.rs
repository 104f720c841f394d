//! The operations a Webflow CMS backend offers, as a trait.
//!
//! Implementors provide the two raw reads: the collection listing and a
//! single item page. Collection lookup, pagination and item lookup are
//! provided on top of them, so [`Client`](crate::Client) and the in-memory
//! [`FakeApi`](crate::fake::FakeApi) behave identically.
//! Code that depends on this crate can take `&dyn WebflowApi` and swap in a
//! test double.

use crate::collections::{self, Collection};
use crate::items::{self, CollectionSelector, ItemLookup, ItemPage, RawItem};
use crate::pagination::{self, PageHandler, ITEM_LOOKUP_MAX_PAGES};
use crate::Result;
use async_trait::async_trait;

/// Read access to a site's collections and their items.
///
/// # Examples
///
/// ```no_run
/// use webflow::{ItemLookup, WebflowApi};
///
/// async fn latest_post(api: &dyn WebflowApi) -> webflow::Result<Option<String>> {
///     let lookup = ItemLookup::new().collection_name("Blog Posts").item_name("Launch");
///     let item = api.get_item(&lookup).await?;
///     Ok(item.map(|raw| raw.get().to_string()))
/// }
/// ```
#[async_trait]
pub trait WebflowApi: Send + Sync {
    /// Every collection of the site, in server order.
    async fn list_collections(&self) -> Result<Vec<Collection>>;

    /// One page of a collection's items, starting at `offset`.
    async fn fetch_item_page(
        &self,
        collection_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<ItemPage>;

    /// The first collection whose name matches `name`, ignoring case.
    async fn find_collection_by_name(&self, name: &str) -> Result<Option<Collection>> {
        let collections = self.list_collections().await?;
        Ok(collections::find_by_name(collections, name))
    }

    /// The first collection whose slug matches `slug`, ignoring case.
    async fn find_collection_by_slug(&self, slug: &str) -> Result<Option<Collection>> {
        let collections = self.list_collections().await?;
        Ok(collections::find_by_slug(collections, slug))
    }

    /// Walks the item listing of `collection_id`, handing each page's raw
    /// items to `on_page`.
    ///
    /// After the first page, at most `max_pages` further pages are fetched;
    /// if the listing still isn't exhausted, the walk stops without error.
    async fn for_each_item_page(
        &self,
        collection_id: &str,
        max_pages: usize,
        on_page: &mut PageHandler<'_>,
    ) -> Result<()> {
        pagination::for_each_page(self, collection_id, max_pages, on_page).await
    }

    /// Every item of `collection_id`, in delivery order, within the same
    /// page budget as [`for_each_item_page`](Self::for_each_item_page).
    async fn list_items(&self, collection_id: &str, max_pages: usize) -> Result<Vec<RawItem>> {
        let mut all = Vec::new();
        self.for_each_item_page(collection_id, max_pages, &mut |page: Vec<RawItem>| {
            all.extend(page);
            Ok(())
        })
        .await?;
        Ok(all)
    }

    /// Every item of the collection named `name`, or `None` if no collection
    /// has that name.
    async fn list_items_by_collection_name(
        &self,
        name: &str,
        max_pages: usize,
    ) -> Result<Option<Vec<RawItem>>> {
        match self.find_collection_by_name(name).await? {
            Some(collection) => Ok(Some(self.list_items(&collection.id, max_pages).await?)),
            None => Ok(None),
        }
    }

    /// Finds one item's raw payload.
    ///
    /// Returns `Ok(None)` when the lookup lacks a collection selector or an
    /// item filter, when the collection doesn't exist, or when no item
    /// matches within the first [`ITEM_LOOKUP_MAX_PAGES`] + 1 pages.
    async fn get_item(&self, lookup: &ItemLookup) -> Result<Option<RawItem>> {
        if !lookup.is_searchable() {
            tracing::debug!(?lookup, "Item lookup has nothing to search");
            return Ok(None);
        }

        let collection_id = match lookup.collection_selector() {
            Some(CollectionSelector::Name(name)) => {
                self.find_collection_by_name(name).await?.map(|c| c.id)
            }
            Some(CollectionSelector::Slug(slug)) => {
                self.find_collection_by_slug(slug).await?.map(|c| c.id)
            }
            Some(CollectionSelector::Id(id)) => Some(id.to_string()),
            None => None,
        };

        let Some(collection_id) = collection_id else {
            tracing::debug!(?lookup, "No collection matches item lookup");
            return Ok(None);
        };

        let all = self.list_items(&collection_id, ITEM_LOOKUP_MAX_PAGES).await?;
        items::find_item(all, lookup)
    }
}
