//! JSON rendering: an `exportInfo` envelope around augmented POI records.

use chrono::{DateTime, SecondsFormat, Utc};
use poidash_core::Poi;
use serde::Serialize;

use crate::ExportError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportEnvelope<'a> {
    export_info: ExportInfo<'a>,
    pois: Vec<ExportedPoi<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportInfo<'a> {
    total_records: usize,
    export_date: String,
    source: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedPoi<'a> {
    serial_number: usize,
    #[serde(flatten)]
    poi: &'a Poi,
    coordinates: NestedCoordinates,
}

#[derive(Debug, Serialize)]
struct NestedCoordinates {
    latitude: f64,
    longitude: f64,
}

/// Renders the pretty-printed export document.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn render_json(pois: &[Poi], now: DateTime<Utc>, source: &str) -> Result<Vec<u8>, ExportError> {
    let envelope = ExportEnvelope {
        export_info: ExportInfo {
            total_records: pois.len(),
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            source,
        },
        pois: pois
            .iter()
            .enumerate()
            .map(|(idx, poi)| ExportedPoi {
                serial_number: idx + 1,
                poi,
                coordinates: NestedCoordinates {
                    latitude: poi.latitude,
                    longitude: poi.longitude,
                },
            })
            .collect(),
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}
