use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{CoreError, PoiStatus};

pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A point-of-interest record under review.
///
/// Records come from the remote POI store; ids are unique within one loaded
/// set. Free-text attributes default to `""` when the store omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(rename = "type", alias = "poi_type", default, deserialize_with = "null_as_empty")]
    pub poi_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub floor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, alias = "s3_url")]
    pub image: Option<String>,
    #[serde(default)]
    pub status: PoiStatus,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
    #[serde(default, alias = "created_at", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at", deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Returns `true` when both components are finite and inside the WGS84 ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        in_range(self.latitude, LATITUDE_RANGE) && in_range(self.longitude, LONGITUDE_RANGE)
    }
}

impl Poi {
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Whether this POI can be placed on the map.
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        self.coordinate().is_valid()
    }

    /// `"lat, lon"` as shown in the detail view and spreadsheet export.
    #[must_use]
    pub fn coordinates_label(&self) -> String {
        format!("{}, {}", self.latitude, self.longitude)
    }

    /// Copy of this POI carrying a new status and `updated_at`.
    #[must_use]
    pub fn with_status(&self, status: PoiStatus, at: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: Some(at),
            ..self.clone()
        }
    }
}

fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    value.is_finite() && value >= min && value <= max
}

/// Parse an operator-entered latitude/longitude pair.
///
/// # Errors
///
/// Returns [`CoreError::MissingCoordinate`] for blank input and
/// [`CoreError::InvalidCoordinate`] for non-numeric or out-of-range values.
pub fn parse_coordinate_input(latitude: &str, longitude: &str) -> Result<Coordinate, CoreError> {
    let latitude = parse_component("latitude", latitude, LATITUDE_RANGE)?;
    let longitude = parse_component("longitude", longitude, LONGITUDE_RANGE)?;
    Ok(Coordinate {
        latitude,
        longitude,
    })
}

fn parse_component(field: &'static str, raw: &str, range: (f64, f64)) -> Result<f64, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::MissingCoordinate { field });
    }
    match trimmed.parse::<f64>() {
        Ok(v) if in_range(v, range) => Ok(v),
        _ => Err(CoreError::InvalidCoordinate {
            field,
            value: trimmed.to_string(),
            min: range.0,
            max: range.1,
        }),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("coordinate out of f64 range")),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid coordinate '{s}': {e}"))),
        other => Err(serde::de::Error::custom(format!(
            "expected numeric coordinate, got {other}"
        ))),
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}
