//! Output contract of the extraction gateway.
//!
//! Vision providers return structurally similar but not byte-identical JSON,
//! so every provider funnels its decoded output through
//! [`validate_extraction`]. Validation collects every violation in the document
//! instead of stopping at the first one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One POI candidate as reported by a vision model.
///
/// Looser than [`crate::Poi`]: no id, status or timestamps (the POI store
/// assigns those after ingestion) and `coordinates` is not range-checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPoi {
    pub name: String,
    pub poi_type: String,
    pub phone: String,
    pub category: String,
    pub address: String,
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub pois: Vec<ExtractedPoi>,
}

/// Validated body of an extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub image_url: reqwest::Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    InvalidType,
    InvalidString,
}

/// A single field that did not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaViolation {
    pub code: ViolationCode,
    pub path: Vec<PathSegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    pub message: String,
}

impl SchemaViolation {
    fn wrong_type(path: Vec<PathSegment>, expected: &'static str, found: Option<&Value>) -> Self {
        let received = found.map_or("undefined", json_type_name);
        let message = if found.is_none() {
            "Required".to_string()
        } else {
            format!("Expected {expected}, received {received}")
        };
        Self {
            code: ViolationCode::InvalidType,
            path,
            expected: Some(expected),
            received: Some(received.to_string()),
            message,
        }
    }

    fn invalid_url(path: Vec<PathSegment>) -> Self {
        Self {
            code: ViolationCode::InvalidString,
            path,
            expected: None,
            received: None,
            message: "Invalid url".to_string(),
        }
    }

    /// Dotted rendering of the path (`pois.0.name`), empty for the document root.
    #[must_use]
    pub fn path_label(&self) -> String {
        self.path
            .iter()
            .map(|seg| match seg {
                PathSegment::Key(k) => k.clone(),
                PathSegment::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Non-empty set of violations found in one document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} schema violation(s), first at '{}': {}", .0.len(), first_path(.0), first_message(.0))]
pub struct SchemaViolations(pub Vec<SchemaViolation>);

fn first_path(v: &[SchemaViolation]) -> String {
    v.first().map(SchemaViolation::path_label).unwrap_or_default()
}

fn first_message(v: &[SchemaViolation]) -> &str {
    v.first().map_or("", |s| s.message.as_str())
}

impl SchemaViolations {
    #[must_use]
    pub fn details(&self) -> &[SchemaViolation] {
        &self.0
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child(path: &[PathSegment], seg: impl Into<PathSegment>) -> Vec<PathSegment> {
    let mut next = path.to_vec();
    next.push(seg.into());
    next
}

/// Validate a decoded extraction response.
///
/// # Errors
///
/// Returns every field that violated its expected type. Missing string fields
/// and a missing `coordinates` array are not violations; they default to empty.
pub fn validate_extraction(value: &Value) -> Result<ExtractionResult, SchemaViolations> {
    let mut violations = Vec::new();

    let Some(root) = value.as_object() else {
        return Err(SchemaViolations(vec![SchemaViolation::wrong_type(
            Vec::new(),
            "object",
            Some(value),
        )]));
    };

    let pois = match root.get("pois") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                validate_poi(&[PathSegment::from("pois"), idx.into()], item, &mut violations)
            })
            .collect(),
        found => {
            violations.push(SchemaViolation::wrong_type(
                vec!["pois".into()],
                "array",
                found,
            ));
            Vec::new()
        }
    };

    if violations.is_empty() {
        Ok(ExtractionResult { pois })
    } else {
        Err(SchemaViolations(violations))
    }
}

fn validate_poi(
    path: &[PathSegment],
    item: &Value,
    violations: &mut Vec<SchemaViolation>,
) -> Option<ExtractedPoi> {
    let Some(obj) = item.as_object() else {
        violations.push(SchemaViolation::wrong_type(path.to_vec(), "object", Some(item)));
        return None;
    };

    let before = violations.len();
    let poi = ExtractedPoi {
        name: string_field(obj, path, "name", violations),
        poi_type: string_field(obj, path, "poi_type", violations),
        phone: string_field(obj, path, "phone", violations),
        category: string_field(obj, path, "category", violations),
        address: string_field(obj, path, "address", violations),
        coordinates: coordinates_field(obj, path, violations),
    };
    (violations.len() == before).then_some(poi)
}

fn string_field(
    obj: &Map<String, Value>,
    path: &[PathSegment],
    key: &str,
    violations: &mut Vec<SchemaViolation>,
) -> String {
    match obj.get(key) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            violations.push(SchemaViolation::wrong_type(
                child(path, key),
                "string",
                Some(other),
            ));
            String::new()
        }
    }
}

fn coordinates_field(
    obj: &Map<String, Value>,
    path: &[PathSegment],
    violations: &mut Vec<SchemaViolation>,
) -> Vec<f64> {
    let path = child(path, "coordinates");
    match obj.get("coordinates") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                if let Some(n) = item.as_f64() {
                    Some(n)
                } else {
                    violations.push(SchemaViolation::wrong_type(
                        child(&path, idx),
                        "number",
                        Some(item),
                    ));
                    None
                }
            })
            .collect(),
        Some(other) => {
            violations.push(SchemaViolation::wrong_type(path, "array", Some(other)));
            Vec::new()
        }
    }
}

/// Validate an extraction request body (`{"imageUrl": "<absolute url>"}`).
///
/// # Errors
///
/// Returns a violation when the body is not an object, `imageUrl` is missing
/// or not a string, or the string is not an absolute URL.
pub fn validate_image_input(value: &Value) -> Result<ImageInput, SchemaViolations> {
    let Some(root) = value.as_object() else {
        return Err(SchemaViolations(vec![SchemaViolation::wrong_type(
            Vec::new(),
            "object",
            Some(value),
        )]));
    };

    match root.get("imageUrl") {
        Some(Value::String(raw)) => match reqwest::Url::parse(raw) {
            Ok(image_url) => Ok(ImageInput { image_url }),
            Err(_) => Err(SchemaViolations(vec![SchemaViolation::invalid_url(vec![
                "imageUrl".into(),
            ])])),
        },
        found => Err(SchemaViolations(vec![SchemaViolation::wrong_type(
            vec!["imageUrl".into()],
            "string",
            found,
        )])),
    }
}

/// JSON Schema for strict structured output (`response_format.json_schema`).
///
/// Strict mode requires every property to be listed as required, so the
/// schema is tighter than [`validate_extraction`]; the validator still runs on
/// whatever comes back.
#[must_use]
pub fn extraction_json_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "pois": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "poi_type": { "type": "string" },
                        "phone": { "type": "string" },
                        "category": { "type": "string" },
                        "address": { "type": "string" },
                        "coordinates": { "type": "array", "items": { "type": "number" } }
                    },
                    "required": ["name", "poi_type", "phone", "category", "address", "coordinates"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["pois"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_complete_document() {
        let doc = json!({
            "pois": [{
                "name": "Cafe Roxy",
                "poi_type": "restaurant",
                "phone": "+880 1700 000000",
                "category": "food",
                "address": "12 Main St",
                "coordinates": [23.8, 90.4]
            }]
        });
        let result = validate_extraction(&doc).expect("valid");
        assert_eq!(result.pois.len(), 1);
        assert_eq!(result.pois[0].coordinates, vec![23.8, 90.4]);
    }

    #[test]
    fn missing_strings_and_coordinates_default_to_empty() {
        let doc = json!({"pois": [{"name": "Only a name"}]});
        let result = validate_extraction(&doc).expect("valid");
        assert_eq!(result.pois[0].phone, "");
        assert!(result.pois[0].coordinates.is_empty());
    }

    #[test]
    fn extra_fields_are_ignored() {
        let doc = json!({"pois": [{"name": "A", "confidence": 0.9}], "model": "x"});
        assert!(validate_extraction(&doc).is_ok());
    }

    #[test]
    fn collects_every_wrong_type() {
        let doc = json!({
            "pois": [
                {"name": 5, "phone": null, "coordinates": [1.0, "two"]},
                {"address": ["not", "a", "string"], "coordinates": "23.8,90.4"}
            ]
        });
        let err = validate_extraction(&doc).expect_err("invalid");
        let paths: Vec<String> = err.details().iter().map(SchemaViolation::path_label).collect();
        assert_eq!(
            paths,
            vec![
                "pois.0.name",
                "pois.0.phone",
                "pois.0.coordinates.1",
                "pois.1.address",
                "pois.1.coordinates",
            ]
        );
        assert_eq!(err.details()[1].received.as_deref(), Some("null"));
    }

    #[test]
    fn missing_pois_is_required() {
        let err = validate_extraction(&json!({})).expect_err("invalid");
        assert_eq!(err.details().len(), 1);
        assert_eq!(err.details()[0].message, "Required");
        assert_eq!(err.details()[0].path_label(), "pois");
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = validate_extraction(&json!([1, 2])).expect_err("invalid");
        assert_eq!(err.details()[0].expected, Some("object"));
        assert_eq!(err.details()[0].received.as_deref(), Some("array"));
    }

    #[test]
    fn image_input_requires_absolute_url() {
        assert!(validate_image_input(&json!({"imageUrl": "https://example.com/x.jpg"})).is_ok());

        let relative = validate_image_input(&json!({"imageUrl": "/x.jpg"})).expect_err("relative");
        assert_eq!(relative.details()[0].code, ViolationCode::InvalidString);

        let missing = validate_image_input(&json!({"url": "https://example.com"})).expect_err("missing");
        assert_eq!(missing.details()[0].message, "Required");

        let wrong = validate_image_input(&json!({"imageUrl": 12})).expect_err("number");
        assert_eq!(wrong.details()[0].received.as_deref(), Some("number"));
    }

    #[test]
    fn violation_serializes_numeric_path_segments() {
        let err = validate_extraction(&json!({"pois": [{"name": 1}]})).expect_err("invalid");
        let value = serde_json::to_value(err.details()).unwrap();
        assert_eq!(value[0]["path"], json!(["pois", 0, "name"]));
        assert_eq!(value[0]["code"], "invalid_type");
    }

    #[test]
    fn schema_requires_every_field_for_strict_mode() {
        let schema = extraction_json_schema();
        let required = schema["properties"]["pois"]["items"]["required"]
            .as_array()
            .unwrap();
        assert_eq!(required.len(), 6);
    }
}
