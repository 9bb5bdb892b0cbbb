use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A two-dimensional bounding box, as `[west, south, east, north]`.
///
/// A `Bbox` is always exactly four finite numbers, in the order they were
/// given. No spatial checks are made, e.g. a west bound that is larger than
/// the east bound is kept as-is (it could cross the antimeridian).
///
/// # Examples
///
/// ```
/// use stac_search::Bbox;
///
/// let bbox: Bbox = "-104.5,44.0,-104.0,45.0".parse().unwrap();
/// assert_eq!(bbox, Bbox::new(-104.5, 44.0, -104.0, 45.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 4]")]
pub struct Bbox([f64; 4]);

/// Any of the shapes accepted for a bounding box before normalization.
///
/// Sequences of numbers (arrays, tuples, vectors, slices, and single-pass
/// iterators through [FromIterator]) become [BboxParam::Values], strings become
/// [BboxParam::Delimited].
///
/// # Examples
///
/// ```
/// use stac_search::{Bbox, BboxParam};
///
/// let expected = Bbox::new(-104.5, 44.0, -104.0, 45.0);
/// assert_eq!(BboxParam::from((-104.5, 44.0, -104.0, 45.0)).normalize().unwrap(), expected);
/// assert_eq!(BboxParam::from("-104.5,44.0,-104.0,45.0").normalize().unwrap(), expected);
///
/// let lazy = vec![-104.5, 44.0, -104.0, 45.0].into_iter().map(|n| n);
/// assert_eq!(lazy.collect::<BboxParam>().normalize().unwrap(), expected);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum BboxParam {
    /// An ordered sequence of numbers.
    Values(Vec<f64>),

    /// A comma-delimited string of numbers.
    Delimited(String),
}

impl Bbox {
    /// Creates a new bounding box from its four bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::Bbox;
    ///
    /// let bbox = Bbox::new(-180.0, -90.0, 180.0, 90.0);
    /// assert_eq!(bbox.west(), -180.0);
    /// ```
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Bbox {
        Bbox([west, south, east, north])
    }

    /// Returns the west bound.
    pub fn west(&self) -> f64 {
        self.0[0]
    }

    /// Returns the south bound.
    pub fn south(&self) -> f64 {
        self.0[1]
    }

    /// Returns the east bound.
    pub fn east(&self) -> f64 {
        self.0[2]
    }

    /// Returns the north bound.
    pub fn north(&self) -> f64 {
        self.0[3]
    }

    /// Returns this bounding box as an array.
    pub fn to_array(self) -> [f64; 4] {
        self.0
    }
}

impl BboxParam {
    /// Normalizes this parameter into a [Bbox].
    ///
    /// Returns an error if there are not exactly four values, or if any value
    /// is not a finite number.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::BboxParam;
    ///
    /// assert!(BboxParam::from(vec![1.0, 2.0, 3.0]).normalize().is_err());
    /// assert!(BboxParam::from("1,2,3,four").normalize().is_err());
    /// ```
    pub fn normalize(self) -> Result<Bbox> {
        match self {
            BboxParam::Values(values) => from_values(values),
            BboxParam::Delimited(s) => {
                let values = s
                    .split(',')
                    .map(|part| {
                        part.trim().parse::<f64>().map_err(|err| Error::InvalidBbox {
                            value: s.clone(),
                            reason: format!("{:?} is not a number: {err}", part.trim()),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                from_values(values).map_err(|err| match err {
                    Error::InvalidBbox { reason, .. } => Error::InvalidBbox { value: s, reason },
                    err => err,
                })
            }
        }
    }
}

fn from_values(values: Vec<f64>) -> Result<Bbox> {
    let bounds: [f64; 4] = values
        .as_slice()
        .try_into()
        .map_err(|_| Error::InvalidBbox {
            value: format!("{values:?}"),
            reason: format!("expected 4 values, got {}", values.len()),
        })?;
    if let Some(value) = bounds.iter().find(|value| !value.is_finite()) {
        return Err(Error::InvalidBbox {
            value: format!("{values:?}"),
            reason: format!("{value} is not finite"),
        });
    }
    Ok(Bbox(bounds))
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl FromStr for Bbox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Bbox> {
        BboxParam::from(s).normalize()
    }
}

impl TryFrom<Vec<f64>> for Bbox {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Bbox> {
        from_values(values)
    }
}

impl From<Bbox> for [f64; 4] {
    fn from(bbox: Bbox) -> [f64; 4] {
        bbox.0
    }
}

impl From<Bbox> for BboxParam {
    fn from(bbox: Bbox) -> BboxParam {
        BboxParam::Values(bbox.0.to_vec())
    }
}

impl<T: Into<f64>> From<[T; 4]> for BboxParam {
    fn from(values: [T; 4]) -> BboxParam {
        values.into_iter().collect()
    }
}

impl<A, B, C, D> From<(A, B, C, D)> for BboxParam
where
    A: Into<f64>,
    B: Into<f64>,
    C: Into<f64>,
    D: Into<f64>,
{
    fn from((west, south, east, north): (A, B, C, D)) -> BboxParam {
        BboxParam::Values(vec![west.into(), south.into(), east.into(), north.into()])
    }
}

impl<T: Into<f64>> From<Vec<T>> for BboxParam {
    fn from(values: Vec<T>) -> BboxParam {
        values.into_iter().collect()
    }
}

impl<T: Into<f64> + Copy> From<&[T]> for BboxParam {
    fn from(values: &[T]) -> BboxParam {
        values.iter().copied().collect()
    }
}

impl From<&str> for BboxParam {
    fn from(s: &str) -> BboxParam {
        BboxParam::Delimited(s.to_string())
    }
}

impl From<String> for BboxParam {
    fn from(s: String) -> BboxParam {
        BboxParam::Delimited(s)
    }
}

impl<T: Into<f64>> FromIterator<T> for BboxParam {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> BboxParam {
        BboxParam::Values(iter.into_iter().map(Into::into).collect())
    }
}
