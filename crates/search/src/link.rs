use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `rel` of a link to the next page of results.
pub const NEXT_REL: &str = "next";

/// A link between STAC objects, or between pages of a STAC API response.
///
/// Paging links in the STAC API can carry a `method`, `headers`, and a `body`
/// that must be used to request the linked page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// The actual link in the format of an URL.
    pub href: String,

    /// Relationship between the current document and the linked document.
    pub rel: String,

    /// Media type of the referenced entity.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// A human readable title to be used in rendered displays of the link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The HTTP method of the request, usually `GET` or `POST`. Defaults to `GET`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// HTTP headers to include in the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,

    /// A JSON object containing fields/values that must be included in the
    /// body of the next request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,

    /// If `true`, the headers and body of this link must be merged into the
    /// original request.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub merge: bool,

    /// Additional fields on this link.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

impl Link {
    /// Creates a new link with the provided href and rel type.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::Link;
    ///
    /// let link = Link::new("http://stac.test/search?page=2", "next");
    /// assert!(link.is_next());
    /// ```
    pub fn new(href: impl ToString, rel: impl ToString) -> Link {
        Link {
            href: href.to_string(),
            rel: rel.to_string(),
            ..Default::default()
        }
    }

    /// Creates a new `next` link.
    pub fn next(href: impl ToString) -> Link {
        Link::new(href, NEXT_REL)
    }

    /// Sets this link's method, e.g. `POST`.
    pub fn method(mut self, method: impl ToString) -> Link {
        self.method = Some(method.to_string());
        self
    }

    /// Sets this link's body.
    pub fn body(mut self, body: Map<String, Value>) -> Link {
        self.body = Some(body);
        self
    }

    /// Returns true if this is a `next` link.
    pub fn is_next(&self) -> bool {
        self.rel == NEXT_REL
    }
}

#[cfg(test)]
mod tests {
    use super::Link;
    use serde_json::json;

    #[test]
    fn deserialize_post_link() {
        let link: Link = serde_json::from_value(json!({
            "rel": "next",
            "href": "http://stac.test/search",
            "method": "POST",
            "body": {"token": "next:abc"},
            "merge": true
        }))
        .unwrap();
        assert!(link.is_next());
        assert_eq!(link.method.as_deref(), Some("POST"));
        assert_eq!(link.body.unwrap()["token"], "next:abc");
        assert!(link.merge);
    }

    #[test]
    fn serialize_skips_defaults() {
        let value = serde_json::to_value(Link::next("http://stac.test/search?page=2")).unwrap();
        assert_eq!(
            value,
            json!({"href": "http://stac.test/search?page=2", "rel": "next"})
        );
    }
}
