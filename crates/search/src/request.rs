use crate::{Error, GetSearch, Link, Result, Search};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt, str::FromStr};
use url::Url;

/// The HTTP method of an item search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Parameters are sent in the query string.
    #[default]
    Get,

    /// Parameters are sent as a JSON body.
    Post,
}

/// A normalized item search request.
///
/// Built once, when the search is constructed, and never modified afterwards.
/// The pages that follow the first one are requested from the links of the
/// previous page, see [PageRequest].
#[derive(Clone, Debug)]
pub struct SearchRequest {
    method: Method,
    url: Url,
    search: Search,
    headers: HeaderMap,
}

/// A single page request, as handed to a [Transport](crate::Transport).
#[derive(Clone, Debug, PartialEq)]
pub struct PageRequest {
    /// The request method.
    pub method: Method,

    /// The request url, including the query string for `GET` requests.
    pub url: Url,

    /// The JSON body, for `POST` requests.
    pub body: Option<Map<String, Value>>,

    /// Headers to add to the request.
    pub headers: HeaderMap,
}

impl Method {
    /// Returns this method's name, e.g. `GET`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl SearchRequest {
    /// Creates a new search request.
    ///
    /// If `method` is `None`, it is inferred from the search: `POST` when
    /// there is an intersects geometry, `GET` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::{Method, Search, SearchRequest};
    ///
    /// let request = SearchRequest::new("http://stac.test/search".parse().unwrap(), None, Search::default(), Default::default());
    /// assert_eq!(request.method(), Method::Get);
    /// ```
    pub fn new(
        url: Url,
        method: Option<Method>,
        search: Search,
        headers: HeaderMap,
    ) -> SearchRequest {
        let method = method.unwrap_or(if search.has_intersects() {
            Method::Post
        } else {
            Method::Get
        });
        SearchRequest {
            method,
            url,
            search,
            headers,
        }
    }

    /// Returns this request's method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns this request's url, without any search parameters.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the normalized search parameters.
    pub fn parameters(&self) -> &Search {
        &self.search
    }

    /// Returns the extra headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the search parameters as a JSON object, as sent in a `POST` body.
    pub fn json(&self) -> Result<Map<String, Value>> {
        self.search.to_json()
    }

    /// Returns the search parameters as `GET` query parameters.
    pub fn query(&self) -> Result<GetSearch> {
        self.search.clone().try_into()
    }

    /// Returns the request for the first page of results.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::{Identifiers, Method, Search, SearchRequest};
    ///
    /// let search = Search {
    ///     collections: Some(Identifiers::from("naip")),
    ///     ..Default::default()
    /// };
    /// let request = SearchRequest::new("http://stac.test/search".parse().unwrap(), None, search, Default::default());
    /// let page_request = request.first_page().unwrap();
    /// assert_eq!(page_request.url.as_str(), "http://stac.test/search?collections=naip");
    /// assert!(page_request.body.is_none());
    /// ```
    pub fn first_page(&self) -> Result<PageRequest> {
        match self.method {
            Method::Get => {
                let mut url = self.url.clone();
                let query = serde_urlencoded::to_string(self.query()?)?;
                if !query.is_empty() {
                    let query = match url.query() {
                        Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
                        _ => query,
                    };
                    url.set_query(Some(&query));
                }
                Ok(PageRequest {
                    method: Method::Get,
                    url,
                    body: None,
                    headers: self.headers.clone(),
                })
            }
            Method::Post => Ok(PageRequest {
                method: Method::Post,
                url: self.url.clone(),
                body: Some(self.json()?),
                headers: self.headers.clone(),
            }),
        }
    }
}

impl PageRequest {
    /// Builds the request for the page a link points to.
    ///
    /// The link's method defaults to `GET`, and relative hrefs are resolved
    /// against this request's url. A `POST` link without a body re-uses this
    /// request's body, and a link body is laid over this request's body when
    /// the link asks for a merge. Link headers follow the same rule: they are
    /// laid over this request's headers on a merge and replace them otherwise.
    /// A link without headers keeps this request's headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::{Link, Method, PageRequest};
    ///
    /// let first = PageRequest {
    ///     method: Method::Get,
    ///     url: "http://stac.test/search?limit=10".parse().unwrap(),
    ///     body: None,
    ///     headers: Default::default(),
    /// };
    /// let next = first.follow(&Link::next("search?limit=10&page=2")).unwrap();
    /// assert_eq!(next.url.as_str(), "http://stac.test/search?limit=10&page=2");
    /// ```
    pub fn follow(&self, link: &Link) -> Result<PageRequest> {
        let method = link
            .method
            .as_deref()
            .map(Method::from_str)
            .transpose()?
            .unwrap_or(Method::Get);
        let url = self.url.join(&link.href)?;
        let body = match method {
            Method::Get => None,
            Method::Post => match (&link.body, link.merge) {
                (Some(body), true) => {
                    let mut merged = self.body.clone().unwrap_or_default();
                    merged.extend(body.clone());
                    Some(merged)
                }
                (Some(body), false) => Some(body.clone()),
                (None, _) => Some(self.body.clone().unwrap_or_default()),
            },
        };
        let mut headers = match (&link.headers, link.merge) {
            (Some(_), false) => HeaderMap::new(),
            _ => self.headers.clone(),
        };
        if let Some(link_headers) = &link.headers {
            for (key, value) in link_headers {
                let value = match value {
                    Value::String(s) => HeaderValue::from_str(s)?,
                    value => HeaderValue::from_str(&value.to_string())?,
                };
                let _ = headers.insert(HeaderName::from_str(key)?, value);
            }
        }
        Ok(PageRequest {
            method,
            url,
            body,
            headers,
        })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Method> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(Method::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(Method::Post)
        } else {
            Err(Error::InvalidMethod(s.to_string()))
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Method, PageRequest, SearchRequest};
    use crate::{BboxParam, Error, Identifiers, IntersectsParam, Link, Search};
    use http::{HeaderMap, HeaderValue};
    use serde_json::{Map, Value, json};

    const URL: &str = "http://stac.test/search";

    fn intersects() -> Search {
        Search {
            intersects: Some(
                IntersectsParam::from(json!({"type": "Point", "coordinates": [-105.1, 41.1]}))
                    .normalize()
                    .unwrap(),
            ),
            ..Default::default()
        }
    }

    fn request(method: Option<Method>, search: Search) -> SearchRequest {
        SearchRequest::new(URL.parse().unwrap(), method, search, HeaderMap::new())
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn default_method_is_get() {
        assert_eq!(request(None, Search::default()).method(), Method::Get);
    }

    #[test]
    fn intersects_defaults_to_post() {
        assert_eq!(request(None, intersects()).method(), Method::Post);
    }

    #[test]
    fn explicit_method_wins() {
        assert_eq!(
            request(Some(Method::Get), intersects()).method(),
            Method::Get
        );
        assert_eq!(
            request(Some(Method::Post), Search::default()).method(),
            Method::Post
        );
    }

    #[test]
    fn parse_method() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
        assert!(matches!(
            "PUT".parse::<Method>().unwrap_err(),
            Error::InvalidMethod(m) if m == "PUT"
        ));
    }

    #[test]
    fn first_page_post() {
        let search = Search {
            collections: Some(Identifiers::from("naip")),
            limit: Some(10),
            ..Default::default()
        };
        let page_request = request(Some(Method::Post), search).first_page().unwrap();
        assert_eq!(page_request.url.as_str(), URL);
        assert_eq!(
            page_request.body.unwrap(),
            object(json!({"collections": ["naip"], "limit": 10}))
        );
    }

    #[test]
    fn first_page_get_keeps_existing_query() {
        let search = Search {
            bbox: Some(BboxParam::from([1, 2, 3, 4]).normalize().unwrap()),
            ..Default::default()
        };
        let request = SearchRequest::new(
            "http://stac.test/search?api-key=secret".parse().unwrap(),
            None,
            search,
            HeaderMap::new(),
        );
        assert_eq!(
            request.first_page().unwrap().url.as_str(),
            "http://stac.test/search?api-key=secret&bbox=1%2C2%2C3%2C4"
        );
    }

    #[test]
    fn first_page_get_without_parameters() {
        let page_request = request(None, Search::default()).first_page().unwrap();
        assert_eq!(page_request.url.as_str(), URL);
    }

    fn post_page() -> PageRequest {
        PageRequest {
            method: Method::Post,
            url: URL.parse().unwrap(),
            body: Some(object(json!({"collections": ["naip"], "limit": 10}))),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn follow_get_link() {
        let next = post_page()
            .follow(&Link::next("http://stac.test/search?token=next:abc"))
            .unwrap();
        assert_eq!(next.method, Method::Get);
        assert_eq!(next.url.as_str(), "http://stac.test/search?token=next:abc");
        assert!(next.body.is_none());
    }

    #[test]
    fn follow_post_link_replaces_body() {
        let link = Link::next(URL)
            .method("POST")
            .body(object(json!({"token": "next:abc"})));
        let next = post_page().follow(&link).unwrap();
        assert_eq!(next.method, Method::Post);
        assert_eq!(next.body.unwrap(), object(json!({"token": "next:abc"})));
    }

    #[test]
    fn follow_post_link_merges_body() {
        let mut link = Link::next(URL)
            .method("POST")
            .body(object(json!({"token": "next:abc", "limit": 5})));
        link.merge = true;
        let next = post_page().follow(&link).unwrap();
        assert_eq!(
            next.body.unwrap(),
            object(json!({"collections": ["naip"], "limit": 5, "token": "next:abc"}))
        );
    }

    #[test]
    fn follow_post_link_without_body() {
        let next = post_page().follow(&Link::next(URL).method("POST")).unwrap();
        assert_eq!(next.body, post_page().body);
    }

    fn page_with_api_key() -> PageRequest {
        let mut page = post_page();
        let _ = page
            .headers
            .insert("x-api-key", HeaderValue::from_static("secret"));
        page
    }

    #[test]
    fn follow_link_headers() {
        let mut link = Link::next(URL);
        link.headers = Some(object(json!({"x-page-token": "abc"})));
        let next = page_with_api_key().follow(&link).unwrap();
        assert_eq!(next.headers["x-page-token"], "abc");
        assert!(!next.headers.contains_key("x-api-key"));
    }

    #[test]
    fn follow_link_headers_with_merge() {
        let mut link = Link::next(URL);
        link.headers = Some(object(json!({"x-page-token": "abc"})));
        link.merge = true;
        let next = page_with_api_key().follow(&link).unwrap();
        assert_eq!(next.headers["x-page-token"], "abc");
        assert_eq!(next.headers["x-api-key"], "secret");
    }

    #[test]
    fn follow_link_without_headers() {
        let next = page_with_api_key().follow(&Link::next(URL)).unwrap();
        assert_eq!(next.headers["x-api-key"], "secret");
    }

    #[test]
    fn follow_link_with_bad_method() {
        let link = Link::next(URL).method("DELETE");
        assert!(matches!(
            post_page().follow(&link).unwrap_err(),
            Error::InvalidMethod(_)
        ));
    }
}
