use thiserror::Error;

/// Error enum for crate-specific errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// [chrono::ParseError]
    #[error(transparent)]
    ChronoParse(#[from] chrono::ParseError),

    /// A datetime interval with both ends open.
    #[error("empty datetime interval")]
    EmptyDatetimeInterval,

    /// [http::header::InvalidHeaderName]
    #[error(transparent)]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// [http::header::InvalidHeaderValue]
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// This value can't be normalized into a bounding box.
    #[error("invalid bbox: {value} ({reason})")]
    InvalidBbox {
        /// The value as it was provided.
        value: String,

        /// Why it was rejected.
        reason: String,
    },

    /// This value can't be normalized into a datetime or a datetime interval.
    #[error("invalid datetime: {value} ({reason})")]
    InvalidDatetime {
        /// The value as it was provided.
        value: String,

        /// Why it was rejected.
        reason: String,
    },

    /// This value can't be normalized into an intersects geometry.
    #[error("invalid intersects: {value} ({reason})")]
    InvalidIntersects {
        /// The value as it was provided.
        value: String,

        /// Why it was rejected.
        reason: String,
    },

    /// This value can't be used as a page size.
    #[error("invalid limit: {value} ({reason})")]
    InvalidLimit {
        /// The value as it was provided.
        value: String,

        /// Why it was rejected.
        reason: String,
    },

    /// This is not an HTTP method that can be used for item search.
    #[error("invalid method: {0} (expected GET or POST)")]
    InvalidMethod(String),

    /// This is not a JSON object.
    #[error("json value is not an object")]
    NotAnObject(serde_json::Value),

    /// The response body is JSON, but it is not a feature collection.
    #[error("response is not a feature collection: type={0}")]
    NotAFeatureCollection(String),

    /// [reqwest::Error]
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// [serde_urlencoded::ser::Error]
    #[error(transparent)]
    SerdeUrlencodedSer(#[from] serde_urlencoded::ser::Error),

    /// The start of a datetime interval is after its end.
    #[error("start ({0}) is after end ({1})")]
    StartIsAfterEnd(String, String),

    /// The server responded with a non-success status code.
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        /// The request method.
        method: String,

        /// The request url.
        url: String,

        /// The response status code.
        status: u16,

        /// The response body, possibly empty.
        body: String,
    },

    /// [url::ParseError]
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Returns true if this error was raised while normalizing search parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::Error;
    ///
    /// assert!(Error::EmptyDatetimeInterval.is_validation());
    /// ```
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::ChronoParse(_)
                | Error::EmptyDatetimeInterval
                | Error::InvalidBbox { .. }
                | Error::InvalidDatetime { .. }
                | Error::InvalidHeaderName(_)
                | Error::InvalidHeaderValue(_)
                | Error::InvalidIntersects { .. }
                | Error::InvalidLimit { .. }
                | Error::InvalidMethod(_)
                | Error::StartIsAfterEnd(..)
                | Error::UrlParse(_)
        )
    }
}
