// The verbosity stuff is cribbed from https://github.com/clap-rs/clap-verbosity-flag/blob/c621a6a8a7c0b6df8f1464a985a5d076b4915693/src/lib.rs and updated for tracing

#![deny(unused_crate_dependencies)]

use anyhow::{Error, Result, anyhow};
use clap::Parser;
use futures_util::{TryStreamExt, pin_mut};
use serde_json::json;
use stac_search::{ItemSearch, ItemSearchBuilder, Method};
use std::str::FromStr;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::metadata::Level;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{
    fmt::writer::MakeWriterExt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// stac-search: Search a SpatioTemporal Asset Catalog (STAC) API for items
///
/// Items are printed to standard output as newline-delimited JSON.
#[derive(Debug, Parser)]
#[command(name = "stac-search", version)]
pub struct StacSearch {
    /// The url of the STAC API search endpoint, e.g. `https://planetarycomputer.microsoft.com/api/stac/v1/search`.
    url: String,

    /// The HTTP method to use, GET or POST.
    ///
    /// If not provided, POST is used when `--intersects` is set, and GET otherwise.
    #[arg(long = "method")]
    method: Option<Method>,

    /// Requested bounding box, as a comma-delimited string, e.g. `-73.21,43.99,-73.12,44.05`.
    #[arg(long = "bbox", allow_hyphen_values = true)]
    bbox: Option<String>,

    /// Single date+time, or a range ('/' separator), formatted to [RFC 3339,
    /// section 5.6](https://tools.ietf.org/html/rfc3339#section-5.6).
    ///
    /// Use double dots `..` for open date ranges.
    #[arg(long = "datetime")]
    datetime: Option<String>,

    /// Comma-delimited list of one or more Collection IDs that each matching Item must be in.
    #[arg(long = "collections")]
    collections: Option<String>,

    /// Comma-delimited list of Item ids to return.
    #[arg(long = "ids")]
    ids: Option<String>,

    /// Searches items by performing intersection between their geometry and provided GeoJSON geometry.
    #[arg(long = "intersects")]
    intersects: Option<String>,

    /// The page size to be returned from the server.
    #[arg(long = "limit")]
    limit: Option<u64>,

    /// The maximum number of items to return from the search.
    #[arg(short = 'n', long = "max-items")]
    max_items: Option<usize>,

    /// Request headers to include in every request.
    ///
    /// Each header should be provided in `KEY=VALUE` format
    /// e.g.: `stac-search <url> --header "x-my-header=value" --header "x-my-other-header=this"`
    #[arg(long = "header", verbatim_doc_comment)]
    headers: Vec<KeyValue>,

    /// Print the request for the first page, and exit without sending it.
    #[arg(long = "dry-run", default_value_t = false)]
    dry_run: bool,

    /// Print all items as a single item collection instead of newline-delimited JSON.
    #[arg(long = "item-collection", default_value_t = false)]
    item_collection: bool,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = ErrorLevel::verbose_help(),
        long_help = ErrorLevel::verbose_long_help(),
    )]
    verbose: u8,

    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        help = ErrorLevel::quiet_help(),
        long_help = ErrorLevel::quiet_long_help(),
        conflicts_with = "verbose",
    )]
    quiet: u8,
}

#[derive(Debug, Clone)]
struct KeyValue(String, String);

#[derive(Copy, Clone, Debug, Default)]
struct ErrorLevel;

impl StacSearch {
    /// Runs this command.
    ///
    /// If `init_tracing_subscriber` is `false`, it is expected that the caller
    /// is setting up the appropriate logging.
    pub async fn run(self, init_tracing_subscriber: bool) -> Result<()> {
        if init_tracing_subscriber {
            let indicatif_layer = IndicatifLayer::new();
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer().with_writer(
                        indicatif_layer
                            .get_stderr_writer()
                            .with_max_level(self.log_level().unwrap_or(Level::WARN)),
                    ),
                )
                .with(indicatif_layer)
                .init();
        }
        let search = self.builder().build()?;
        let mut stdout = BufWriter::new(tokio::io::stdout());
        if self.dry_run {
            let page_request = search.request().first_page()?;
            let headers: serde_json::Map<String, serde_json::Value> = page_request
                .headers
                .iter()
                .map(|(key, value)| {
                    let value = value
                        .to_str()
                        .map_err(|err| anyhow!("invalid header value for {key}: {err}"))?;
                    Ok((key.to_string(), value.into()))
                })
                .collect::<Result<_>>()?;
            let request = json!({
                "method": page_request.method,
                "url": page_request.url.as_str(),
                "body": page_request.body,
                "headers": headers,
            });
            let mut bytes = serde_json::to_vec_pretty(&request)?;
            bytes.push(b'\n');
            stdout.write_all(&bytes).await?;
        } else if self.item_collection {
            let item_collection = search.item_collection().await?;
            let mut bytes = serde_json::to_vec_pretty(&item_collection)?;
            bytes.push(b'\n');
            stdout.write_all(&bytes).await?;
        } else {
            let items = search.items();
            pin_mut!(items);
            let mut count = 0;
            while let Some(item) = items.try_next().await? {
                let mut bytes = serde_json::to_vec(&item)?;
                bytes.push(b'\n');
                stdout.write_all(&bytes).await?;
                count += 1;
            }
            tracing::info!("wrote {count} items");
        }
        stdout.flush().await.map_err(Error::from)
    }

    /// Returns an item search builder for these arguments.
    ///
    /// Parameters are not checked until the builder is built.
    pub fn builder(&self) -> ItemSearchBuilder {
        let mut builder = ItemSearch::builder(&self.url);
        if let Some(method) = self.method {
            builder = builder.method(method);
        }
        if let Some(bbox) = &self.bbox {
            builder = builder.bbox(bbox.as_str());
        }
        if let Some(datetime) = &self.datetime {
            builder = builder.datetime(datetime.as_str());
        }
        if let Some(collections) = &self.collections {
            builder = builder.collections(collections.as_str());
        }
        if let Some(ids) = &self.ids {
            builder = builder.ids(ids.as_str());
        }
        if let Some(intersects) = &self.intersects {
            builder = builder.intersects(intersects.as_str());
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        if let Some(max_items) = self.max_items {
            builder = builder.max_items(max_items);
        }
        for KeyValue(key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        builder
    }

    /// Returns the log level set by `-v` and `-q`.
    pub fn log_level(&self) -> Option<Level> {
        level_enum(self.verbosity())
    }

    fn verbosity(&self) -> i8 {
        level_value(ErrorLevel::default()) - (self.quiet as i8) + (self.verbose as i8)
    }
}

impl ErrorLevel {
    fn default() -> Option<Level> {
        Some(Level::ERROR)
    }

    fn verbose_help() -> Option<&'static str> {
        Some("Increase verbosity")
    }

    fn verbose_long_help() -> Option<&'static str> {
        None
    }

    fn quiet_help() -> Option<&'static str> {
        Some("Decrease verbosity")
    }

    fn quiet_long_help() -> Option<&'static str> {
        None
    }
}

impl FromStr for KeyValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some((key, value)) = s.split_once('=') {
            Ok(KeyValue(key.to_string(), value.to_string()))
        } else {
            Err(anyhow!("invalid header '{s}', expected format KEY=VALUE"))
        }
    }
}

fn level_enum(verbosity: i8) -> Option<Level> {
    match verbosity {
        i8::MIN..=-1 => None,
        0 => Some(Level::ERROR),
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        4..=i8::MAX => Some(Level::TRACE),
    }
}

fn level_value(level: Option<Level>) -> i8 {
    match level {
        None => -1,
        Some(Level::ERROR) => 0,
        Some(Level::WARN) => 1,
        Some(Level::INFO) => 2,
        Some(Level::DEBUG) => 3,
        Some(Level::TRACE) => 4,
    }
}

#[cfg(test)]
use {assert_cmd as _, mockito as _, rstest as _};

#[cfg(test)]
mod tests {
    use super::StacSearch;
    use clap::Parser;
    use stac_search::Method;
    use tracing::metadata::Level;

    #[test]
    fn builder() {
        let args = StacSearch::parse_from([
            "stac-search",
            "http://stac.test/search",
            "--bbox",
            "-73.21,43.99,-73.12,44.05",
            "--collections",
            "naip,landsat",
            "--limit",
            "10",
            "--header",
            "x-api-key=secret",
        ]);
        let search = args.builder().build().unwrap();
        let request = search.request();
        assert_eq!(request.method(), Method::Get);
        assert_eq!(
            request.json().unwrap()["collections"],
            serde_json::json!(["naip", "landsat"])
        );
        assert_eq!(request.headers()["x-api-key"], "secret");
    }

    #[test]
    fn intersects_defaults_to_post() {
        let args = StacSearch::parse_from([
            "stac-search",
            "http://stac.test/search",
            "--intersects",
            r#"{"type":"Point","coordinates":[-105.1,41.1]}"#,
        ]);
        assert_eq!(args.builder().build().unwrap().request().method(), Method::Post);
    }

    #[test]
    fn method() {
        let args = StacSearch::parse_from([
            "stac-search",
            "http://stac.test/search",
            "--method",
            "post",
        ]);
        assert_eq!(args.builder().build().unwrap().request().method(), Method::Post);
    }

    #[test]
    fn invalid_header() {
        assert!(
            StacSearch::try_parse_from([
                "stac-search",
                "http://stac.test/search",
                "--header",
                "no-equals-sign"
            ])
            .is_err()
        );
    }

    #[test]
    fn log_level() {
        let args = StacSearch::parse_from(["stac-search", "http://stac.test/search"]);
        assert_eq!(args.log_level(), Some(Level::ERROR));
        let args = StacSearch::parse_from(["stac-search", "http://stac.test/search", "-vv"]);
        assert_eq!(args.log_level(), Some(Level::INFO));
        let args = StacSearch::parse_from(["stac-search", "http://stac.test/search", "-q"]);
        assert_eq!(args.log_level(), None);
    }
}
