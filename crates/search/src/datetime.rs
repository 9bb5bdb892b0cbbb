use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const OPEN: &str = "..";

/// A normalized datetime search parameter.
///
/// Either a single [RFC 3339](https://tools.ietf.org/html/rfc3339#section-5.6)
/// datetime, or an interval of two of them separated by a `/`, where either
/// end (but not both) can be open (`..`).
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use stac_search::DatetimeParam;
///
/// let start = Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap();
/// let datetime = DatetimeParam::from(start).normalize().unwrap();
/// assert_eq!(datetime.as_str(), "2020-02-01T00:00:00Z");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Datetime(String);

/// One end of a datetime interval, before normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bound {
    /// An open end, written as `..`.
    Open,

    /// A timezone-aware instant, already converted to UTC.
    Instant(DateTime<Utc>),

    /// A pre-formatted string, passed through as-is.
    Text(String),
}

/// Any of the shapes accepted for a datetime before normalization.
///
/// - Strings become [DatetimeParam::Single] text, and are passed through
///   unmodified, including strings that already hold a `/` interval.
/// - Timezone-aware [DateTime] values are converted to UTC.
/// - Pairs, two-element arrays, and two-element vectors become
///   [DatetimeParam::Interval]. `None` (or [Bound::Open]) is an open end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatetimeParam {
    /// A single datetime, or a pre-formatted interval string.
    Single(Bound),

    /// The ends of an interval.
    ///
    /// Must have exactly two elements to normalize.
    Interval(Vec<Bound>),
}

impl Datetime {
    /// Returns this datetime as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is an interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::DatetimeParam;
    ///
    /// let datetime = DatetimeParam::from("2020-02-01T00:00:00Z/..").normalize().unwrap();
    /// assert!(datetime.is_interval());
    /// ```
    pub fn is_interval(&self) -> bool {
        self.0.contains('/')
    }
}

impl DatetimeParam {
    /// Normalizes this parameter into a [Datetime].
    ///
    /// Instants are formatted in UTC with second precision and a `Z` suffix.
    /// Strings are checked for their structure (not empty, at most one `/`,
    /// not open on both ends) but are otherwise left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{FixedOffset, TimeZone};
    /// use stac_search::{Bound, DatetimeParam};
    ///
    /// let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
    /// let start = eastern.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap();
    /// let datetime = DatetimeParam::from((start, Bound::Open)).normalize().unwrap();
    /// assert_eq!(datetime.as_str(), "2020-02-01T05:00:00Z/..");
    /// ```
    pub fn normalize(self) -> Result<Datetime> {
        match self {
            DatetimeParam::Single(Bound::Open) => Err(Error::EmptyDatetimeInterval),
            DatetimeParam::Single(Bound::Instant(instant)) => Ok(Datetime(format_utc(&instant))),
            DatetimeParam::Single(Bound::Text(s)) => check_text(s).map(Datetime),
            DatetimeParam::Interval(bounds) => {
                let [start, end]: [Bound; 2] =
                    bounds.try_into().map_err(|bounds: Vec<Bound>| {
                        Error::InvalidDatetime {
                            value: format!("{bounds:?}"),
                            reason: format!("expected 2 values, got {}", bounds.len()),
                        }
                    })?;
                if let (Bound::Instant(start), Bound::Instant(end)) = (&start, &end) {
                    if end < start {
                        return Err(Error::StartIsAfterEnd(
                            format_utc(start),
                            format_utc(end),
                        ));
                    }
                }
                let start = bound_to_string(start)?;
                let end = bound_to_string(end)?;
                if start == OPEN && end == OPEN {
                    Err(Error::EmptyDatetimeInterval)
                } else {
                    Ok(Datetime(format!("{start}/{end}")))
                }
            }
        }
    }
}

fn format_utc(datetime: &DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn check_text(s: String) -> Result<String> {
    if s.trim().is_empty() {
        return Err(Error::InvalidDatetime {
            value: s,
            reason: "empty string".to_string(),
        });
    }
    let slashes = s.matches('/').count();
    if slashes > 1 {
        return Err(Error::InvalidDatetime {
            value: s,
            reason: format!("expected at most one '/', got {slashes}"),
        });
    }
    let open_on_both_ends = s
        .split_once('/')
        .is_some_and(|(start, end)| is_open(start.trim()) && is_open(end.trim()));
    if open_on_both_ends {
        Err(Error::EmptyDatetimeInterval)
    } else {
        Ok(s)
    }
}

fn bound_to_string(bound: Bound) -> Result<String> {
    match bound {
        Bound::Open => Ok(OPEN.to_string()),
        Bound::Instant(instant) => Ok(format_utc(&instant)),
        Bound::Text(s) => {
            let s = s.trim();
            if is_open(s) {
                Ok(OPEN.to_string())
            } else if s.contains('/') {
                Err(Error::InvalidDatetime {
                    value: s.to_string(),
                    reason: "an interval end can't be an interval".to_string(),
                })
            } else {
                Ok(s.to_string())
            }
        }
    }
}

fn is_open(s: &str) -> bool {
    s.is_empty() || s == OPEN
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Datetime {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Bound {
    fn from(s: &str) -> Bound {
        Bound::Text(s.to_string())
    }
}

impl From<String> for Bound {
    fn from(s: String) -> Bound {
        Bound::Text(s)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Bound {
    fn from(datetime: DateTime<Tz>) -> Bound {
        Bound::Instant(datetime.with_timezone(&Utc))
    }
}

impl<T: Into<Bound>> From<Option<T>> for Bound {
    fn from(value: Option<T>) -> Bound {
        value.map(Into::into).unwrap_or(Bound::Open)
    }
}

impl From<Bound> for DatetimeParam {
    fn from(bound: Bound) -> DatetimeParam {
        DatetimeParam::Single(bound)
    }
}

impl From<&str> for DatetimeParam {
    fn from(s: &str) -> DatetimeParam {
        DatetimeParam::Single(s.into())
    }
}

impl From<String> for DatetimeParam {
    fn from(s: String) -> DatetimeParam {
        DatetimeParam::Single(s.into())
    }
}

impl From<Datetime> for DatetimeParam {
    fn from(datetime: Datetime) -> DatetimeParam {
        DatetimeParam::Single(Bound::Text(datetime.0))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DatetimeParam {
    fn from(datetime: DateTime<Tz>) -> DatetimeParam {
        DatetimeParam::Single(datetime.into())
    }
}

impl<A: Into<Bound>, B: Into<Bound>> From<(A, B)> for DatetimeParam {
    fn from((start, end): (A, B)) -> DatetimeParam {
        DatetimeParam::Interval(vec![start.into(), end.into()])
    }
}

impl<T: Into<Bound>, const N: usize> From<[T; N]> for DatetimeParam {
    fn from(bounds: [T; N]) -> DatetimeParam {
        bounds.into_iter().collect()
    }
}

impl<T: Into<Bound>> From<Vec<T>> for DatetimeParam {
    fn from(bounds: Vec<T>) -> DatetimeParam {
        bounds.into_iter().collect()
    }
}

impl<T: Into<Bound>> FromIterator<T> for DatetimeParam {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> DatetimeParam {
        DatetimeParam::Interval(iter.into_iter().map(Into::into).collect())
    }
}
