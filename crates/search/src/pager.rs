//! Paging through the results of an item search, one request at a time.

use crate::{Error, ItemCollection, PageRequest, Result, SearchRequest, Transport};

/// Where a [Session] is in its paging.
#[derive(Clone, Debug, PartialEq)]
pub enum State {
    /// There is another page to fetch.
    HasNext(PageRequest),

    /// The last page had no `next` link, or had no items.
    Exhausted,

    /// The maximum number of items has been received.
    Capped,
}

/// A single pass over the pages of an item search.
///
/// Each call to [Session::next_page] makes exactly one request, and only when
/// called. Nothing is cached or prefetched.
#[derive(Debug)]
pub struct Session<'a, T> {
    transport: &'a T,
    state: State,
    error: Option<Error>,
    max_items: Option<usize>,
    items_received: usize,
    pages_fetched: usize,
}

impl<'a, T: Transport> Session<'a, T> {
    /// Creates a new session for a search request.
    ///
    /// A `max_items` of zero caps the session before anything is fetched.
    pub fn new(
        transport: &'a T,
        request: &SearchRequest,
        max_items: Option<usize>,
    ) -> Result<Session<'a, T>> {
        let state = if max_items == Some(0) {
            State::Capped
        } else {
            State::HasNext(request.first_page()?)
        };
        Ok(Session {
            transport,
            state,
            error: None,
            max_items,
            items_received: 0,
            pages_fetched: 0,
        })
    }

    /// Fetches the next page, or returns `None` if the session is done.
    ///
    /// If a page's `next` link can't be followed, the page is still returned
    /// and the error is returned by the following call. After an error, the
    /// session is done.
    pub async fn next_page(&mut self) -> Result<Option<ItemCollection>> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        let request = match std::mem::replace(&mut self.state, State::Exhausted) {
            State::HasNext(request) => request,
            state => {
                self.state = state;
                return Ok(None);
            }
        };
        let page = self.transport.fetch(request.clone()).await?;
        self.pages_fetched += 1;
        self.items_received += page.len();
        self.state = if self
            .max_items
            .is_some_and(|max_items| self.items_received >= max_items)
        {
            tracing::info!(
                items = self.items_received,
                pages = self.pages_fetched,
                "reached max items"
            );
            State::Capped
        } else if page.is_empty() {
            tracing::info!(pages = self.pages_fetched, "empty page, search exhausted");
            State::Exhausted
        } else if let Some(link) = page.next_link() {
            tracing::trace!(href = %link.href, "following next link");
            match request.follow(link) {
                Ok(next) => State::HasNext(next),
                Err(error) => {
                    tracing::warn!(href = %link.href, "can't follow next link: {error}");
                    self.error = Some(error);
                    State::Exhausted
                }
            }
        } else {
            tracing::info!(
                items = self.items_received,
                pages = self.pages_fetched,
                "search exhausted"
            );
            State::Exhausted
        };
        Ok(Some(page))
    }

    /// Returns this session's state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Returns true if there are no more pages to fetch, and no pending error.
    pub fn is_done(&self) -> bool {
        self.error.is_none() && !matches!(self.state, State::HasNext(_))
    }

    /// Returns the number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Returns the number of items received so far, across all pages.
    pub fn items_received(&self) -> usize {
        self.items_received
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, State};
    use crate::{
        Error, Item, ItemCollection, Link, Method, PageRequest, Result, Search, SearchRequest,
        Transport,
    };
    use http::HeaderMap;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves `total` items, `per_page` at a time, linking pages with `?page=`.
    struct Pages {
        total: usize,
        per_page: usize,
        requests: Mutex<Vec<PageRequest>>,
    }

    impl Pages {
        fn new(total: usize, per_page: usize) -> Pages {
            Pages {
                total,
                per_page,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Transport for Pages {
        async fn fetch(&self, request: PageRequest) -> Result<ItemCollection> {
            let page: usize = request
                .url
                .query_pairs()
                .find(|(key, _)| key == "page")
                .map(|(_, value)| value.parse().unwrap())
                .unwrap_or(0);
            self.requests.lock().unwrap().push(request);
            let start = page * self.per_page;
            let end = (start + self.per_page).min(self.total);
            let features: Vec<Item> = (start..end)
                .map(|i| {
                    json!({"type": "Feature", "id": format!("item-{i}")})
                        .as_object()
                        .unwrap()
                        .clone()
                })
                .collect();
            let mut item_collection = ItemCollection::new(features);
            if end < self.total {
                item_collection.links.push(Link::next(format!(
                    "http://stac.test/search?page={}",
                    page + 1
                )));
            }
            Ok(item_collection)
        }
    }

    struct Failing;

    impl Transport for Failing {
        async fn fetch(&self, request: PageRequest) -> Result<ItemCollection> {
            Err(Error::Status {
                method: request.method.to_string(),
                url: request.url.to_string(),
                status: 500,
                body: String::new(),
            })
        }
    }

    fn request() -> SearchRequest {
        SearchRequest::new(
            "http://stac.test/search".parse().unwrap(),
            Some(Method::Get),
            Search::default(),
            HeaderMap::new(),
        )
    }

    #[tokio::test]
    async fn follows_next_links_until_exhausted() {
        let pages = Pages::new(25, 10);
        let mut session = Session::new(&pages, &request(), None).unwrap();
        let mut lengths = Vec::new();
        while let Some(page) = session.next_page().await.unwrap() {
            lengths.push(page.len());
        }
        assert_eq!(lengths, [10, 10, 5]);
        assert_eq!(session.state(), &State::Exhausted);
        assert_eq!(pages.request_count(), 3);
        assert_eq!(session.items_received(), 25);
    }

    #[tokio::test]
    async fn single_page_without_next_link() {
        let pages = Pages::new(5, 10);
        let mut session = Session::new(&pages, &request(), None).unwrap();
        assert_eq!(session.next_page().await.unwrap().unwrap().len(), 5);
        assert!(session.next_page().await.unwrap().is_none());
        assert_eq!(pages.request_count(), 1);
    }

    #[tokio::test]
    async fn capped_sessions_stop_fetching() {
        let pages = Pages::new(100, 10);
        let mut session = Session::new(&pages, &request(), Some(20)).unwrap();
        while session.next_page().await.unwrap().is_some() {}
        assert_eq!(session.state(), &State::Capped);
        assert_eq!(pages.request_count(), 2);
    }

    #[tokio::test]
    async fn cap_mid_page() {
        let pages = Pages::new(100, 10);
        let mut session = Session::new(&pages, &request(), Some(15)).unwrap();
        while session.next_page().await.unwrap().is_some() {}
        assert_eq!(pages.request_count(), 2);
        assert_eq!(session.items_received(), 20);
    }

    #[tokio::test]
    async fn zero_max_items_fetches_nothing() {
        let pages = Pages::new(100, 10);
        let mut session = Session::new(&pages, &request(), Some(0)).unwrap();
        assert!(session.is_done());
        assert!(session.next_page().await.unwrap().is_none());
        assert_eq!(pages.request_count(), 0);
    }

    #[tokio::test]
    async fn next_requests_come_from_links() {
        let pages = Pages::new(30, 10);
        let mut session = Session::new(&pages, &request(), None).unwrap();
        while session.next_page().await.unwrap().is_some() {}
        let urls: Vec<String> = pages
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.url.to_string())
            .collect();
        assert_eq!(
            urls,
            [
                "http://stac.test/search",
                "http://stac.test/search?page=1",
                "http://stac.test/search?page=2"
            ]
        );
    }

    /// Serves one item, with a `next` link that can't be followed.
    struct BadNextLink;

    impl Transport for BadNextLink {
        async fn fetch(&self, _: PageRequest) -> Result<ItemCollection> {
            let item = json!({"type": "Feature", "id": "a"})
                .as_object()
                .unwrap()
                .clone();
            let mut item_collection = ItemCollection::new(vec![item]);
            item_collection
                .links
                .push(Link::next("http://stac.test/search?page=1").method("DELETE"));
            Ok(item_collection)
        }
    }

    #[tokio::test]
    async fn bad_next_link_keeps_the_page() {
        let mut session = Session::new(&BadNextLink, &request(), None).unwrap();
        let page = session.next_page().await.unwrap().unwrap();
        assert_eq!(page.features[0]["id"], "a");
        assert!(!session.is_done());
        assert!(matches!(
            session.next_page().await.unwrap_err(),
            Error::InvalidMethod(method) if method == "DELETE"
        ));
        assert!(session.is_done());
        assert!(session.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn errors_end_the_session() {
        let mut session = Session::new(&Failing, &request(), None).unwrap();
        assert!(matches!(
            session.next_page().await.unwrap_err(),
            Error::Status { status: 500, .. }
        ));
        assert!(session.is_done());
        assert!(session.next_page().await.unwrap().is_none());
    }
}
