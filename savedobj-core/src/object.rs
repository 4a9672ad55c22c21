//! Saved objects and the bodies exchanged by the update endpoint.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::CoreError;

/// Attribute payload of a saved object.
pub type Attributes = Map<String, Value>;

/// Type name of a saved object, e.g. `visualization`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectType(String);

impl ObjectType {
    /// Space-aware type seeded by the `saved_objects/spaces` dataset.
    pub const VISUALIZATION: &'static str = "visualization";
    /// Type shared by every space.
    pub const GLOBALTYPE: &'static str = "globaltype";

    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::InvalidObjectType {
                value: name,
                reason: "must not be empty".to_string(),
            });
        }
        if name.contains('/') {
            return Err(CoreError::InvalidObjectType {
                value: name,
                reason: "must not contain '/'".to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn visualization() -> Self {
        Self(Self::VISUALIZATION.to_string())
    }

    pub fn globaltype() -> Self {
        Self(Self::GLOBALTYPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectType> for String {
    fn from(value: ObjectType) -> Self {
        value.0
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored saved object.
///
/// For space-aware types `id` is the stored id, including the space prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedObject {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub attributes: Attributes,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl SavedObject {
    /// Replace the attributes wholesale and bump the version.
    ///
    /// Attributes are not merged: keys absent from `attributes` are dropped.
    pub fn apply_update(&mut self, attributes: Attributes, now: DateTime<Utc>) {
        self.attributes = attributes;
        self.version += 1;
        self.updated_at = now;
    }

    /// Wire form returned by a successful update.
    pub fn to_updated_body(&self) -> UpdatedObjectBody {
        UpdatedObjectBody {
            id: self.id.clone(),
            object_type: self.object_type.to_string(),
            updated_at: format_timestamp(self.updated_at),
            version: self.version,
            attributes: self.attributes.clone(),
        }
    }
}

/// Body of `PUT /api/saved_objects/{type}/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequest {
    pub attributes: Attributes,
}

impl UpdateRequest {
    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    /// Single-attribute payload, as used by the update scenarios.
    pub fn single(key: &str, value: impl Into<Value>) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(key.to_string(), value.into());
        Self { attributes }
    }

    pub fn to_value(&self) -> Value {
        let mut body = Map::new();
        body.insert("attributes".to_string(), Value::Object(self.attributes.clone()));
        Value::Object(body)
    }
}

/// Success body of an update, exactly as sent on the wire.
///
/// `updated_at` stays a string so its format can be checked rather than
/// silently normalized by a date parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatedObjectBody {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub updated_at: String,
    pub version: u64,
    pub attributes: Attributes,
}

/// ISO-8601 UTC with millisecond precision, e.g. `2018-06-01T09:30:00.000Z`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn seeded() -> SavedObject {
        let mut attributes = Attributes::new();
        attributes.insert("title".to_string(), json!("Count of requests"));
        attributes.insert("visState".to_string(), json!("{}"));
        SavedObject {
            id: "dd7caf20-9efd-11e7-acb3-3dab96693fab".to_string(),
            object_type: ObjectType::visualization(),
            attributes,
            version: 1,
            updated_at: Utc.with_ymd_and_hms(2017, 9, 21, 18, 51, 23).unwrap(),
        }
    }

    #[test]
    fn test_update_replaces_attributes_and_bumps_version() {
        let mut object = seeded();
        let now = Utc.with_ymd_and_hms(2018, 6, 1, 9, 30, 0).unwrap();
        let request = UpdateRequest::single("title", "My second favorite vis");

        object.apply_update(request.attributes.clone(), now);

        assert_eq!(object.version, 2);
        assert_eq!(object.attributes, request.attributes);
        assert!(!object.attributes.contains_key("visState"));
        assert_eq!(object.updated_at, now);
    }

    #[test]
    fn test_timestamp_has_millisecond_precision() {
        let ts = Utc.with_ymd_and_hms(2018, 6, 1, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2018-06-01T09:30:00.000Z");
    }

    #[test]
    fn test_updated_body_wire_shape() -> Result<(), serde_json::Error> {
        let body = seeded().to_updated_body();
        let value = serde_json::to_value(&body)?;
        assert_eq!(value["type"], json!("visualization"));
        assert_eq!(value["version"], json!(1));
        assert_eq!(value["updated_at"], json!("2017-09-21T18:51:23.000Z"));

        let mut extra = value.clone();
        extra["namespace"] = json!("space_1");
        assert!(serde_json::from_value::<UpdatedObjectBody>(extra).is_err());
        Ok(())
    }

    #[test]
    fn test_update_request_value() {
        let request = UpdateRequest::single("name", "My second favorite");
        assert_eq!(
            request.to_value(),
            json!({ "attributes": { "name": "My second favorite" } })
        );
    }

    #[test]
    fn test_object_type_validation() {
        assert!(ObjectType::new("").is_err());
        assert!(ObjectType::new("a/b").is_err());
        assert_eq!(ObjectType::new("dashboard").map(String::from), Ok("dashboard".to_string()));
    }
}
