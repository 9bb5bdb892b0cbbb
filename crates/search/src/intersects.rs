use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An object that exposes a GeoJSON-like geometry.
///
/// Anything that can hand over a GeoJSON object can be used as an intersects
/// filter.
///
/// # Examples
///
/// ```
/// use serde_json::{Map, Value, json};
/// use stac_search::{GeometryInterface, IntersectsParam};
///
/// struct Point(f64, f64);
///
/// impl GeometryInterface for Point {
///     fn geo_interface(&self) -> Map<String, Value> {
///         let Value::Object(object) = json!({"type": "Point", "coordinates": [self.0, self.1]}) else {
///             unreachable!()
///         };
///         object
///     }
/// }
///
/// let intersects = IntersectsParam::from(&Point(-105.1, 41.1)).normalize().unwrap();
/// assert_eq!(intersects.as_object()["type"], "Point");
/// ```
pub trait GeometryInterface {
    /// Returns this object's geometry as a GeoJSON object.
    fn geo_interface(&self) -> Map<String, Value>;
}

/// A normalized intersects search parameter.
///
/// This is a GeoJSON-like object that is passed through to the server. It must
/// have a string `type` member, but it is not checked for geometric validity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intersects(Map<String, Value>);

/// Any of the shapes accepted for an intersects geometry before normalization.
#[derive(Clone, Debug, PartialEq)]
pub enum IntersectsParam {
    /// A JSON object, used as-is once it has a `type` member.
    Object(Map<String, Value>),

    /// A JSON value, which must be an object.
    Value(Value),

    /// A JSON-encoded object.
    Json(String),
}

impl Intersects {
    /// Returns this geometry as a JSON object.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns this geometry's `type` field, if there is one.
    pub fn geometry_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Returns this geometry encoded as JSON, as used in GET query strings.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.0).map_err(Error::from)
    }

    /// Consumes this geometry, returning the inner object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl IntersectsParam {
    /// Normalizes this parameter into an [Intersects].
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::IntersectsParam;
    ///
    /// let intersects = IntersectsParam::from(r#"{"type":"Point","coordinates":[-105.1,41.1]}"#)
    ///     .normalize()
    ///     .unwrap();
    /// assert_eq!(intersects.geometry_type(), Some("Point"));
    ///
    /// assert!(IntersectsParam::from("not json").normalize().is_err());
    /// ```
    pub fn normalize(self) -> Result<Intersects> {
        match self {
            IntersectsParam::Object(object) => from_object(object),
            IntersectsParam::Value(value) => from_value(value),
            IntersectsParam::Json(s) => {
                let value: Value =
                    serde_json::from_str(&s).map_err(|err| Error::InvalidIntersects {
                        value: s.clone(),
                        reason: err.to_string(),
                    })?;
                from_value(value)
            }
        }
    }
}

fn from_value(value: Value) -> Result<Intersects> {
    if let Value::Object(object) = value {
        from_object(object)
    } else {
        Err(Error::InvalidIntersects {
            value: value.to_string(),
            reason: "not a JSON object".to_string(),
        })
    }
}

fn from_object(object: Map<String, Value>) -> Result<Intersects> {
    if object.get("type").is_some_and(Value::is_string) {
        Ok(Intersects(object))
    } else {
        Err(Error::InvalidIntersects {
            value: Value::Object(object).to_string(),
            reason: "no GeoJSON type".to_string(),
        })
    }
}

impl GeometryInterface for geojson::Geometry {
    fn geo_interface(&self) -> Map<String, Value> {
        Map::from(self)
    }
}

impl GeometryInterface for geojson::Value {
    fn geo_interface(&self) -> Map<String, Value> {
        Map::from(&geojson::Geometry::new(self.clone()))
    }
}

/// Uses the feature's geometry. A feature without a geometry has no GeoJSON
/// type, so it fails to normalize.
impl GeometryInterface for geojson::Feature {
    fn geo_interface(&self) -> Map<String, Value> {
        self.geometry.as_ref().map(Map::from).unwrap_or_default()
    }
}

impl GeometryInterface for Intersects {
    fn geo_interface(&self) -> Map<String, Value> {
        self.0.clone()
    }
}

impl<G: GeometryInterface> From<&G> for IntersectsParam {
    fn from(geometry: &G) -> IntersectsParam {
        IntersectsParam::Object(geometry.geo_interface())
    }
}

impl From<geojson::Geometry> for IntersectsParam {
    fn from(geometry: geojson::Geometry) -> IntersectsParam {
        IntersectsParam::from(&geometry)
    }
}

impl From<geojson::Feature> for IntersectsParam {
    fn from(feature: geojson::Feature) -> IntersectsParam {
        IntersectsParam::from(&feature)
    }
}

impl From<Intersects> for IntersectsParam {
    fn from(intersects: Intersects) -> IntersectsParam {
        IntersectsParam::Object(intersects.0)
    }
}

impl From<Map<String, Value>> for IntersectsParam {
    fn from(object: Map<String, Value>) -> IntersectsParam {
        IntersectsParam::Object(object)
    }
}

impl From<Value> for IntersectsParam {
    fn from(value: Value) -> IntersectsParam {
        IntersectsParam::Value(value)
    }
}

impl From<&str> for IntersectsParam {
    fn from(s: &str) -> IntersectsParam {
        IntersectsParam::Json(s.to_string())
    }
}

impl From<String> for IntersectsParam {
    fn from(s: String) -> IntersectsParam {
        IntersectsParam::Json(s)
    }
}

impl From<Intersects> for Map<String, Value> {
    fn from(intersects: Intersects) -> Map<String, Value> {
        intersects.0
    }
}
