use crate::{Error, ItemCollection, PageRequest, Result};
use std::future::Future;

/// Fetches one page of search results.
///
/// [Transport::fetch] is the only required method. Connection pooling,
/// authentication, retries, and timeouts all belong to the implementor; an
/// error returned here is handed to the consumer of the search as-is.
pub trait Transport: Send + Sync {
    /// Sends a page request and parses the response into an [ItemCollection].
    fn fetch(&self, request: PageRequest) -> impl Future<Output = Result<ItemCollection>> + Send;
}

/// A [Transport] over HTTP, backed by [reqwest].
///
/// # Examples
///
/// ```
/// use stac_search::HttpTransport;
///
/// let transport = HttpTransport::new().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a new transport with a default client and this crate's user agent.
    pub fn new() -> Result<HttpTransport> {
        let client = reqwest::Client::builder()
            .user_agent(crate::user_agent())
            .build()?;
        Ok(HttpTransport { client })
    }

    /// Creates a new transport from an existing client.
    ///
    /// Use this to configure timeouts, proxies, or default headers.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::HttpTransport;
    ///
    /// let client = reqwest::Client::new();
    /// let transport = HttpTransport::with_client(client);
    /// ```
    pub fn with_client(client: reqwest::Client) -> HttpTransport {
        HttpTransport { client }
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, request: PageRequest) -> Result<ItemCollection> {
        tracing::debug!(method = %request.method, url = %request.url, "fetching page");
        let mut builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                method: request.method.to_string(),
                url: request.url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        ItemCollection::from_json_slice(&bytes)
    }
}

impl<T: Transport> Transport for &T {
    fn fetch(&self, request: PageRequest) -> impl Future<Output = Result<ItemCollection>> + Send {
        (**self).fetch(request)
    }
}
