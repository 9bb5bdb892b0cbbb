use crate::{
    Bbox, BboxParam, Datetime, DatetimeParam, Error, Identifiers, Intersects, IntersectsParam,
    Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The normalized parameters of an item search, as sent in a `POST` body.
///
/// Every field holds its canonical form, so the JSON serialization of a
/// `Search` is the request body.
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct Search {
    /// Requested bounding box.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Bbox>,

    /// Single date+time, or a range ('/' separator).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<Datetime>,

    /// Searches items by performing intersection between their geometry and provided GeoJSON geometry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersects: Option<Intersects>,

    /// Array of one or more Collection IDs that each matching Item must be in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Identifiers>,

    /// Array of Item ids to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<Identifiers>,

    /// The maximum number of results to return (page size).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Additional parameters, passed through to the server.
    #[serde(flatten)]
    pub additional_fields: Map<String, Value>,
}

/// GET parameters for the item search endpoint.
///
/// Lists are comma-delimited and the intersects geometry is JSON-encoded.
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetSearch {
    /// Requested bounding box, as a comma-delimited string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<String>,

    /// Single date+time, or a range ('/' separator).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,

    /// Searches items by performing intersection between their geometry and
    /// provided GeoJSON geometry, encoded as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersects: Option<String>,

    /// Comma-delimited list of one or more Collection IDs that each matching Item must be in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<String>,

    /// Comma-delimited list of Item ids to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<String>,

    /// The maximum number of results to return (page size).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,

    /// Additional parameters.
    #[serde(flatten)]
    pub additional_fields: BTreeMap<String, String>,
}

impl Search {
    /// Returns this search as a JSON object, suitable for a `POST` body.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_search::{BboxParam, Search};
    ///
    /// let search = Search {
    ///     bbox: Some(BboxParam::from([-104.5, 44.0, -104.0, 45.0]).normalize().unwrap()),
    ///     ..Default::default()
    /// };
    /// let json = search.to_json().unwrap();
    /// assert_eq!(json["bbox"], serde_json::json!([-104.5, 44.0, -104.0, 45.0]));
    /// ```
    pub fn to_json(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(object) => Ok(object),
            value => Err(Error::NotAnObject(value)),
        }
    }

    /// Returns true if this search has an intersects geometry.
    pub fn has_intersects(&self) -> bool {
        self.intersects.is_some()
    }
}

impl TryFrom<Search> for GetSearch {
    type Error = Error;

    fn try_from(search: Search) -> Result<GetSearch> {
        let intersects = search
            .intersects
            .as_ref()
            .map(Intersects::to_json_string)
            .transpose()?;
        let additional_fields = search
            .additional_fields
            .into_iter()
            .map(|(key, value)| -> Result<(String, String)> {
                let value = match value {
                    Value::String(s) => s,
                    value => serde_json::to_string(&value)?,
                };
                Ok((key, value))
            })
            .collect::<Result<_>>()?;
        Ok(GetSearch {
            bbox: search.bbox.map(|bbox| bbox.to_string()),
            datetime: search.datetime.map(|datetime| datetime.to_string()),
            intersects,
            collections: search.collections.map(|ids| ids.to_delimited()),
            ids: search.ids.map(|ids| ids.to_delimited()),
            limit: search.limit.map(|limit| limit.to_string()),
            additional_fields,
        })
    }
}

impl TryFrom<GetSearch> for Search {
    type Error = Error;

    fn try_from(get_search: GetSearch) -> Result<Search> {
        let limit = get_search
            .limit
            .map(|limit| {
                limit.parse::<u64>().map_err(|err| Error::InvalidLimit {
                    value: limit.clone(),
                    reason: err.to_string(),
                })
            })
            .transpose()?;
        Ok(Search {
            bbox: get_search
                .bbox
                .map(|bbox| BboxParam::from(bbox).normalize())
                .transpose()?,
            datetime: get_search
                .datetime
                .map(|datetime| DatetimeParam::from(datetime).normalize())
                .transpose()?,
            intersects: get_search
                .intersects
                .map(|intersects| IntersectsParam::from(intersects).normalize())
                .transpose()?,
            collections: get_search.collections.map(Identifiers::from),
            ids: get_search.ids.map(Identifiers::from),
            limit,
            additional_fields: get_search
                .additional_fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect(),
        })
    }
}
