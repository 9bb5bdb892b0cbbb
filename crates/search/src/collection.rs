use crate::{Identified, Link};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A STAC collection, as far as searching is concerned.
///
/// Only the `id` is used to build searches; everything else is kept so that
/// collections round-trip without loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Identifier for the collection that is unique across the provider.
    pub id: String,

    /// Detailed multi-line description to fully explain the collection.
    #[serde(default)]
    pub description: String,

    /// A short descriptive one-line title for the collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// A list of references to other documents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,

    /// Additional fields not part of the collection specification.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Collection {
    /// Creates a new collection with the given `id` and `description`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::Collection;
    ///
    /// let collection = Collection::new("an-id", "a description");
    /// assert_eq!(collection.id, "an-id");
    /// ```
    pub fn new(id: impl ToString, description: impl ToString) -> Collection {
        Collection {
            id: id.to_string(),
            description: description.to_string(),
            title: None,
            links: Vec::new(),
            additional_fields: Map::new(),
        }
    }
}

impl Identified for Collection {
    fn identifier(&self) -> &str {
        &self.id
    }
}
