use crate::{
    BboxParam, DatetimeParam, HttpTransport, Identifiers, IntersectsParam, Item, ItemCollection,
    Method, Result, Search, SearchRequest, Transport, pager::Session,
};
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::TryStreamExt;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::str::FromStr;
use url::Url;

/// A search of a STAC API's item search endpoint.
///
/// The request is normalized once, when the search is built, and every call
/// to [ItemSearch::items] or [ItemSearch::item_collections] walks the pages
/// from the start, lazily.
///
/// # Examples
///
/// ```
/// use stac_search::{ItemSearch, Method};
///
/// let search = ItemSearch::builder("https://planetarycomputer.microsoft.com/api/stac/v1/search")
///     .bbox("-104.5,44.0,-104.0,45.0")
///     .datetime("2020-02-01T00:00:00Z/..")
///     .collections("naip")
///     .limit(10)
///     .max_items(20)
///     .build()
///     .unwrap();
/// assert_eq!(search.request().method(), Method::Get);
/// ```
#[derive(Debug)]
pub struct ItemSearch<T = HttpTransport> {
    request: SearchRequest,
    max_items: Option<usize>,
    transport: T,
}

/// Builds an [ItemSearch].
///
/// Every parameter accepts several shapes, see the `*Param` types for the
/// details. Nothing is checked until [ItemSearchBuilder::build].
#[derive(Clone, Debug)]
pub struct ItemSearchBuilder {
    url: String,
    method: Option<Method>,
    bbox: Option<BboxParam>,
    datetime: Option<DatetimeParam>,
    collections: Option<Identifiers>,
    ids: Option<Identifiers>,
    intersects: Option<IntersectsParam>,
    limit: Option<u64>,
    max_items: Option<usize>,
    headers: Vec<(String, String)>,
    additional_fields: Map<String, Value>,
}

impl ItemSearch {
    /// Starts building an item search against a search endpoint url.
    pub fn builder(url: impl ToString) -> ItemSearchBuilder {
        ItemSearchBuilder {
            url: url.to_string(),
            method: None,
            bbox: None,
            datetime: None,
            collections: None,
            ids: None,
            intersects: None,
            limit: None,
            max_items: None,
            headers: Vec::new(),
            additional_fields: Map::new(),
        }
    }
}

impl<T: Transport> ItemSearch<T> {
    /// Returns the normalized request.
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    /// Returns the maximum number of items this search will yield.
    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    /// Returns this search's transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a stream of the pages of this search.
    ///
    /// Each page is fetched when the stream is polled for it. `max_items`
    /// only caps [ItemSearch::items]: pages are streamed until the server
    /// stops returning `next` links.
    pub fn item_collections(&self) -> impl Stream<Item = Result<ItemCollection>> + Send + '_ {
        try_stream! {
            let mut session = Session::new(&self.transport, &self.request, None)?;
            while let Some(page) = session.next_page().await? {
                yield page;
            }
        }
    }

    /// Returns a stream of the items of this search.
    ///
    /// Stops as soon as `max_items` items have been yielded, even in the
    /// middle of a page.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures_util::TryStreamExt;
    /// use stac_search::ItemSearch;
    ///
    /// # tokio_test::block_on(async {
    /// let search = ItemSearch::builder("https://planetarycomputer.microsoft.com/api/stac/v1/search")
    ///     .collections("naip")
    ///     .max_items(20)
    ///     .build()
    ///     .unwrap();
    /// let items: Vec<_> = search.items().try_collect().await.unwrap();
    /// assert!(items.len() <= 20);
    /// # })
    /// ```
    pub fn items(&self) -> impl Stream<Item = Result<Item>> + Send + '_ {
        try_stream! {
            let mut session = Session::new(&self.transport, &self.request, self.max_items)?;
            let mut yielded = 0;
            'pages: while let Some(page) = session.next_page().await? {
                for item in page.features {
                    if self.max_items.is_some_and(|max_items| yielded >= max_items) {
                        break 'pages;
                    }
                    yielded += 1;
                    yield item;
                }
            }
        }
    }

    /// Collects every item of this search into a single item collection.
    pub async fn item_collection(&self) -> Result<ItemCollection> {
        let items: Vec<Item> = self.items().try_collect().await?;
        Ok(ItemCollection::new(items))
    }

    /// Returns the number of matching items reported by the server.
    ///
    /// Fetches the first page. Returns `None` if the server reports neither
    /// `numberMatched` nor `context.matched`.
    pub async fn matched(&self) -> Result<Option<u64>> {
        let mut session = Session::new(&self.transport, &self.request, None)?;
        let page = session.next_page().await?;
        Ok(page.and_then(|page| page.matched()))
    }
}

impl ItemSearchBuilder {
    /// Sets the HTTP method.
    ///
    /// If not set, the method is `POST` when there's an intersects geometry,
    /// and `GET` otherwise.
    pub fn method(mut self, method: Method) -> ItemSearchBuilder {
        self.method = Some(method);
        self
    }

    /// Sets the bounding box.
    pub fn bbox(mut self, bbox: impl Into<BboxParam>) -> ItemSearchBuilder {
        self.bbox = Some(bbox.into());
        self
    }

    /// Sets the datetime, or datetime interval.
    pub fn datetime(mut self, datetime: impl Into<DatetimeParam>) -> ItemSearchBuilder {
        self.datetime = Some(datetime.into());
        self
    }

    /// Sets the collection ids.
    pub fn collections(mut self, collections: impl Into<Identifiers>) -> ItemSearchBuilder {
        self.collections = Some(collections.into());
        self
    }

    /// Sets the item ids.
    pub fn ids(mut self, ids: impl Into<Identifiers>) -> ItemSearchBuilder {
        self.ids = Some(ids.into());
        self
    }

    /// Sets the intersects geometry.
    pub fn intersects(mut self, intersects: impl Into<IntersectsParam>) -> ItemSearchBuilder {
        self.intersects = Some(intersects.into());
        self
    }

    /// Sets the page size.
    pub fn limit(mut self, limit: u64) -> ItemSearchBuilder {
        self.limit = Some(limit);
        self
    }

    /// Sets the maximum number of items to yield, across all pages.
    pub fn max_items(mut self, max_items: usize) -> ItemSearchBuilder {
        self.max_items = Some(max_items);
        self
    }

    /// Adds a header to every request.
    pub fn header(mut self, key: impl ToString, value: impl ToString) -> ItemSearchBuilder {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds a parameter that isn't covered by the other methods, e.g. `sortby`.
    ///
    /// The value is sent as-is in a `POST` body, and as a string (JSON-encoded
    /// if it isn't a string already) in a `GET` query.
    pub fn parameter(mut self, key: impl ToString, value: impl Into<Value>) -> ItemSearchBuilder {
        let _ = self.additional_fields.insert(key.to_string(), value.into());
        self
    }

    /// Normalizes every parameter and builds a search over HTTP.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::ItemSearch;
    ///
    /// assert!(ItemSearch::builder("http://stac.test/search").bbox("1,2,3").build().is_err());
    /// ```
    pub fn build(self) -> Result<ItemSearch> {
        let transport = HttpTransport::new()?;
        self.build_with(transport)
    }

    /// Normalizes every parameter and builds a search over the given transport.
    pub fn build_with<T: Transport>(self, transport: T) -> Result<ItemSearch<T>> {
        let url = Url::parse(&self.url)?;
        let search = Search {
            bbox: self.bbox.map(BboxParam::normalize).transpose()?,
            datetime: self.datetime.map(DatetimeParam::normalize).transpose()?,
            intersects: self
                .intersects
                .map(IntersectsParam::normalize)
                .transpose()?,
            collections: self.collections,
            ids: self.ids,
            limit: self.limit,
            additional_fields: self.additional_fields,
        };
        let mut headers = HeaderMap::new();
        for (key, value) in self.headers {
            let _ = headers.append(HeaderName::from_str(&key)?, HeaderValue::from_str(&value)?);
        }
        let request = SearchRequest::new(url, self.method, search, headers);
        tracing::debug!(method = %request.method(), url = %request.url(), "built item search");
        Ok(ItemSearch {
            request,
            max_items: self.max_items,
            transport,
        })
    }
}
