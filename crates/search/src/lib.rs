//! Search [STAC APIs](https://github.com/radiantearth/stac-api-spec) for items.
//!
//! An [ItemSearch] takes search parameters in whatever shape is convenient,
//! normalizes them into one canonical request, and pages through the
//! results lazily by following `next` links.
//!
//! # Examples
//!
//! ```no_run
//! use futures_util::TryStreamExt;
//! use stac_search::ItemSearch;
//!
//! # tokio_test::block_on(async {
//! let search = ItemSearch::builder("https://planetarycomputer.microsoft.com/api/stac/v1/search")
//!     .bbox([-73.21, 43.99, -73.12, 44.05])
//!     .datetime("2020-02-01T00:00:00Z/2020-02-10T00:00:00Z")
//!     .collections("naip")
//!     .limit(10)
//!     .max_items(20)
//!     .build()
//!     .unwrap();
//! let items: Vec<_> = search.items().try_collect().await.unwrap();
//! assert!(items.len() <= 20);
//! # })
//! ```
//!
//! # Parameters
//!
//! Each parameter has an input type that accepts several shapes:
//!
//! - [BboxParam]: four numbers as an array, tuple, vector, iterator, or a
//!   comma-delimited string
//! - [DatetimeParam]: a single datetime or an interval, as strings, [chrono]
//!   datetimes, or a mix of both, with `None` or `".."` for an open end
//! - [Identifiers]: a comma-delimited string, or any sequence of values that
//!   implement [Identified], e.g. strings and [Collection]s
//! - [IntersectsParam]: a GeoJSON geometry as a JSON object, a JSON string,
//!   or anything implementing [GeometryInterface]
//!
//! Normalization happens once, in [ItemSearchBuilder::build], and invalid
//! parameters are reported there before any request is sent.
//!
//! # Transports
//!
//! Pages are fetched by a [Transport]. [HttpTransport] uses [reqwest], and
//! any other implementation can be passed to [ItemSearchBuilder::build_with].

#![warn(missing_docs, unused_qualifications)]

mod bbox;
mod client;
mod collection;
mod datetime;
mod error;
mod ids;
mod intersects;
mod item_collection;
mod item_search;
mod link;
pub mod pager;
mod request;
mod search;

pub use {
    bbox::{Bbox, BboxParam},
    client::{HttpTransport, Transport},
    collection::Collection,
    datetime::{Bound, Datetime, DatetimeParam},
    error::Error,
    ids::{Identified, Identifiers},
    intersects::{GeometryInterface, Intersects, IntersectsParam},
    item_collection::{Context, ItemCollection},
    item_search::{ItemSearch, ItemSearchBuilder},
    link::{Link, NEXT_REL},
    request::{Method, PageRequest, SearchRequest},
    search::{GetSearch, Search},
};

/// A single search result.
///
/// Servers can include or exclude fields from their results, so items are
/// kept as JSON objects.
pub type Item = serde_json::Map<String, serde_json::Value>;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns this crate's version.
///
/// # Examples
///
/// ```
/// println!("{}", stac_search::version());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns a string suitable for use as a HTTP user agent.
pub fn user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    #[test]
    fn user_agent() {
        assert!(super::user_agent().starts_with("stac-search/"));
    }
}
