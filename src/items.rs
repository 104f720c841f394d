//! Collection items: opaque payloads, the default item schema, and item lookup.
//!
//! Items are passed around as [`RawItem`]s, the exact JSON the server sent.
//! Callers decode them into whatever schema their collection uses;
//! [`CollectionItem`] covers the fields every Webflow item has.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};

/// One item's undecoded JSON payload.
pub type RawItem = Box<RawValue>;

/// One page of `GET /collections/{collection_id}/items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemPage {
    /// Items in this page, in server order. A missing or `null` list is empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<RawItem>,

    /// Number of items in this page.
    #[serde(default)]
    pub count: usize,

    /// Page size that was requested.
    #[serde(default)]
    pub limit: usize,

    /// Position of this page's first item in the full listing.
    #[serde(default)]
    pub offset: usize,

    /// Total items the server claims the collection holds.
    #[serde(default)]
    pub total: usize,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<RawItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawItem>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The fields shared by items of every collection.
///
/// Collection-specific fields land in [`CollectionItem::fields`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    #[serde(rename = "_id", default)]
    pub id: String,

    /// ID of the collection this item belongs to.
    #[serde(rename = "_cid", default)]
    pub collection_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(rename = "_archived", default)]
    pub archived: bool,

    #[serde(rename = "_draft", default)]
    pub draft: bool,

    #[serde(rename = "created-on", default)]
    pub created_on: Option<DateTime<Utc>>,

    #[serde(rename = "updated-on", default)]
    pub updated_on: Option<DateTime<Utc>>,

    #[serde(rename = "published-on", default)]
    pub published_on: Option<DateTime<Utc>>,

    /// Every other field of the item.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CollectionItem {
    /// Decodes an opaque payload into the default item schema.
    pub fn from_raw(raw: &RawValue) -> Result<Self> {
        decode_item(raw)
    }
}

/// Decodes one item payload into `T`, reporting failure as [`Error::Decode`].
pub fn decode_item<T: DeserializeOwned>(raw: &RawValue) -> Result<T> {
    serde_json::from_str(raw.get()).map_err(|e| Error::Decode {
        raw_response: raw.get().to_string(),
        serde_error: e.to_string(),
        status: None,
    })
}

/// Selectors for [`WebflowApi::get_item`](crate::WebflowApi::get_item).
///
/// An empty string means "not given". At least one collection selector and
/// at least one item filter must be given for the lookup to search anything.
///
/// # Examples
///
/// ```
/// use webflow::ItemLookup;
///
/// let lookup = ItemLookup::new()
///     .collection_slug("posts")
///     .item_name("Hello world");
/// assert!(lookup.is_searchable());
///
/// assert!(!ItemLookup::new().item_id("42").is_searchable());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemLookup {
    /// Collection name, matched ignoring case.
    pub collection_name: String,
    /// Collection slug, matched ignoring case.
    pub collection_slug: String,
    /// Collection ID, used as is.
    pub collection_id: String,
    /// Item name, matched exactly.
    pub item_name: String,
    /// Item ID, matched exactly.
    pub item_id: String,
}

/// Which collection an [`ItemLookup`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionSelector<'a> {
    Name(&'a str),
    Slug(&'a str),
    Id(&'a str),
}

impl ItemLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    pub fn collection_slug(mut self, slug: impl Into<String>) -> Self {
        self.collection_slug = slug.into();
        self
    }

    pub fn collection_id(mut self, id: impl Into<String>) -> Self {
        self.collection_id = id.into();
        self
    }

    pub fn item_name(mut self, name: impl Into<String>) -> Self {
        self.item_name = name.into();
        self
    }

    pub fn item_id(mut self, id: impl Into<String>) -> Self {
        self.item_id = id.into();
        self
    }

    /// The collection to search: name, then slug, then ID, whichever is
    /// given first.
    pub fn collection_selector(&self) -> Option<CollectionSelector<'_>> {
        if !self.collection_name.is_empty() {
            Some(CollectionSelector::Name(&self.collection_name))
        } else if !self.collection_slug.is_empty() {
            Some(CollectionSelector::Slug(&self.collection_slug))
        } else if !self.collection_id.is_empty() {
            Some(CollectionSelector::Id(&self.collection_id))
        } else {
            None
        }
    }

    /// `true` if a collection and at least one item filter are given.
    pub fn is_searchable(&self) -> bool {
        self.collection_selector().is_some()
            && !(self.item_name.is_empty() && self.item_id.is_empty())
    }

    fn matches(&self, item: &ItemKey) -> bool {
        (self.item_name.is_empty() || item.name == self.item_name)
            && (self.item_id.is_empty() || item.id == self.item_id)
    }
}

/// The part of an item the lookup compares against.
#[derive(Deserialize)]
struct ItemKey {
    #[serde(default)]
    name: String,
    #[serde(rename = "_id", default)]
    id: String,
}

/// First item, in delivery order, matching every filter in `lookup`.
pub(crate) fn find_item(items: Vec<RawItem>, lookup: &ItemLookup) -> Result<Option<RawItem>> {
    for raw in items {
        let key: ItemKey = decode_item(&raw)?;
        if lookup.matches(&key) {
            return Ok(Some(raw));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_json::value::to_raw_value;

    fn dogs() -> Vec<RawItem> {
        [("1", "blue"), ("2", "green"), ("3", "red"), ("4", "brown")]
            .iter()
            .map(|(id, name)| to_raw_value(&json!({"_id": id, "name": name, "color": name})).unwrap())
            .collect()
    }

    #[test]
    fn test_find_item_by_id() {
        let lookup = ItemLookup::new().collection_id("1").item_id("3");
        let found = find_item(dogs(), &lookup).unwrap().unwrap();

        let value: Value = serde_json::from_str(found.get()).unwrap();
        assert_eq!(value, json!({"_id": "3", "name": "red", "color": "red"}));
    }

    #[test]
    fn test_find_item_by_name() {
        let lookup = ItemLookup::new().collection_id("1").item_name("green");
        let found = find_item(dogs(), &lookup).unwrap().unwrap();

        let item = CollectionItem::from_raw(&found).unwrap();
        assert_eq!(item.id, "2");
        assert_eq!(item.fields.get("color"), Some(&json!("green")));
    }

    #[test]
    fn test_both_filters_must_match() {
        let lookup = ItemLookup::new()
            .collection_id("1")
            .item_name("green")
            .item_id("3");
        assert!(find_item(dogs(), &lookup).unwrap().is_none());

        let lookup = lookup.item_id("2");
        assert!(find_item(dogs(), &lookup).unwrap().is_some());
    }

    #[test]
    fn test_name_match_is_exact() {
        let lookup = ItemLookup::new().collection_id("1").item_name("GREEN");
        assert!(find_item(dogs(), &lookup).unwrap().is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let items = vec![
            to_raw_value(&json!({"_id": "11", "name": "blue"})).unwrap(),
            to_raw_value(&json!({"_id": "12", "name": "blue"})).unwrap(),
        ];
        let lookup = ItemLookup::new().collection_name("cats").item_name("blue");

        let found = find_item(items, &lookup).unwrap().unwrap();
        assert_eq!(CollectionItem::from_raw(&found).unwrap().id, "11");
    }

    #[test]
    fn test_undecodable_item_is_a_decode_error() {
        let items = vec![to_raw_value(&json!(["not", "an", "item"])).unwrap()];
        let lookup = ItemLookup::new().collection_id("1").item_id("1");

        match find_item(items, &lookup) {
            Err(Error::Decode { status, .. }) => assert!(status.is_none()),
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_collection_selector_priority() {
        let lookup = ItemLookup::new()
            .collection_id("9")
            .collection_slug("dogs1")
            .collection_name("dogs");
        assert_eq!(
            lookup.collection_selector(),
            Some(CollectionSelector::Name("dogs"))
        );

        let lookup = ItemLookup::new().collection_id("9").collection_slug("dogs1");
        assert_eq!(
            lookup.collection_selector(),
            Some(CollectionSelector::Slug("dogs1"))
        );

        assert_eq!(ItemLookup::new().collection_selector(), None);
    }

    #[test]
    fn test_deserialize_item_page() {
        let json = r#"{
            "items": [{"_id": "1", "name": "blue", "_archived": false, "_draft": true}],
            "count": 1,
            "limit": 100,
            "offset": 0,
            "total": 1
        }"#;

        let page: ItemPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.total, 1);

        let item = CollectionItem::from_raw(&page.items[0]).unwrap();
        assert!(item.draft);
        assert!(!item.archived);
        assert!(item.fields.is_empty());
    }

    #[test]
    fn test_item_page_without_items_is_empty() {
        let page: ItemPage =
            serde_json::from_str(r#"{"items": null, "count": 0, "offset": 0, "total": 0}"#).unwrap();
        assert!(page.items.is_empty());

        let page: ItemPage = serde_json::from_str(r#"{"count": 0, "total": 0}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.limit, 0);
    }
}
