//! CSV rendering.

use csv::{QuoteStyle, WriterBuilder};
use poidash_core::Poi;

use crate::ExportError;

pub const CSV_HEADERS: [&str; 7] = [
    "S.No",
    "POI Name",
    "Address",
    "Status",
    "Latitude",
    "Longitude",
    "POI ID",
];

/// Renders one header row plus one row per POI. Fields containing the
/// delimiter, a quote or a line break are quoted.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if a record cannot be written.
pub fn render_csv(pois: &[Poi]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for (idx, poi) in pois.iter().enumerate() {
        writer.write_record([
            (idx + 1).to_string(),
            poi.name.clone(),
            poi.address.clone(),
            poi.status.as_str().to_string(),
            poi.latitude.to_string(),
            poi.longitude.to_string(),
            poi.id.clone(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}
