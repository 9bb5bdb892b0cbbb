use crate::{Error, Item, Link, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ITEM_COLLECTION_TYPE: &str = "FeatureCollection";

/// One page of item search results.
///
/// The items are opaque JSON objects: a search can exclude fields, so they
/// are not guaranteed to be valid STAC items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemCollection {
    /// Always "FeatureCollection" to provide compatibility with GeoJSON.
    #[serde(rename = "type", default = "item_collection_type")]
    pub r#type: String,

    /// A possibly-empty array of items.
    #[serde(default)]
    pub features: Vec<Item>,

    /// An array of links. Can be used for pagination.
    #[serde(default)]
    pub links: Vec<Link>,

    /// The number of items that meet the selection parameters, possibly estimated.
    #[serde(rename = "numberMatched", skip_serializing_if = "Option::is_none")]
    pub number_matched: Option<u64>,

    /// The number of items in the "features" array.
    #[serde(rename = "numberReturned", skip_serializing_if = "Option::is_none")]
    pub number_returned: Option<u64>,

    /// The search-related metadata for the item collection.
    ///
    /// Deprecated in favor of `numberMatched` and `numberReturned`, but still
    /// returned by older servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,

    /// Additional fields.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

/// The search-related metadata for an [ItemCollection].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// The count of results returned by this response. Equal to the cardinality
    /// of features array.
    pub returned: u64,

    /// The maximum number of results to which the result was limited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// The count of total number of results that match for this query, possibly
    /// estimated, particularly in the context of NoSQL data stores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<u64>,

    /// Additional fields.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

fn item_collection_type() -> String {
    ITEM_COLLECTION_TYPE.to_string()
}

impl ItemCollection {
    /// Creates a new item collection from a vector of items.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::ItemCollection;
    ///
    /// let item_collection = ItemCollection::new(Vec::new());
    /// assert!(item_collection.is_empty());
    /// ```
    pub fn new(features: Vec<Item>) -> ItemCollection {
        ItemCollection {
            r#type: item_collection_type(),
            number_returned: Some(features.len() as u64),
            features,
            links: Vec::new(),
            number_matched: None,
            context: None,
            additional_fields: Map::new(),
        }
    }

    /// Parses an item collection from JSON bytes.
    ///
    /// Returns an error if the bytes aren't JSON, or if the JSON has a `type`
    /// other than "FeatureCollection".
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::ItemCollection;
    ///
    /// let page = ItemCollection::from_json_slice(br#"{"type":"FeatureCollection","features":[]}"#).unwrap();
    /// assert!(page.is_empty());
    /// assert!(ItemCollection::from_json_slice(br#"{"type":"Feature"}"#).is_err());
    /// ```
    pub fn from_json_slice(slice: &[u8]) -> Result<ItemCollection> {
        let item_collection: ItemCollection = serde_json::from_slice(slice)?;
        if item_collection.r#type == ITEM_COLLECTION_TYPE {
            Ok(item_collection)
        } else {
            Err(Error::NotAFeatureCollection(item_collection.r#type))
        }
    }

    /// Returns the first link with the `next` rel, if there is one.
    pub fn next_link(&self) -> Option<&Link> {
        self.links.iter().find(|link| link.is_next())
    }

    /// Returns the number of matched items reported by the server.
    ///
    /// Uses `numberMatched` and falls back to `context.matched`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::ItemCollection;
    ///
    /// let mut page = ItemCollection::new(Vec::new());
    /// assert_eq!(page.matched(), None);
    /// page.number_matched = Some(42);
    /// assert_eq!(page.matched(), Some(42));
    /// ```
    pub fn matched(&self) -> Option<u64> {
        self.number_matched
            .or_else(|| self.context.as_ref().and_then(|context| context.matched))
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl From<Vec<Item>> for ItemCollection {
    fn from(items: Vec<Item>) -> ItemCollection {
        ItemCollection::new(items)
    }
}

impl IntoIterator for ItemCollection {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
