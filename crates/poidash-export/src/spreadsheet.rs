//! XLSX rendering.

use chrono::{DateTime, Utc};
use poidash_core::Poi;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use crate::ExportError;

pub const SHEET_NAME: &str = "POI Data";

/// Header text and column width (in characters) for each column.
pub const XLSX_COLUMNS: [(&str, f64); 10] = [
    ("S.No", 8.0),
    ("POI Name", 30.0),
    ("Address", 45.0),
    ("Status", 12.0),
    ("Latitude", 12.0),
    ("Longitude", 12.0),
    ("Coordinates", 25.0),
    ("POI ID", 15.0),
    ("Export Date", 12.0),
    ("Export Time", 12.0),
];

const HEADER_BACKGROUND: u32 = 0x0025_63EB;

/// Renders a single-sheet workbook with a styled header row.
///
/// # Errors
///
/// Returns [`ExportError::Spreadsheet`] if the workbook cannot be built.
pub fn render_xlsx(pois: &[Poi], now: DateTime<Utc>) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_BACKGROUND))
        .set_align(FormatAlign::Center);

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in (0u16..).zip(XLSX_COLUMNS) {
        sheet.set_column_width(col, width)?;
        sheet.write_string_with_format(0, col, title, &header)?;
    }

    let export_date = now.format("%Y-%m-%d").to_string();
    let export_time = now.format("%H:%M:%S").to_string();

    // Row 0 is the header, so the row index doubles as the serial number.
    for (row, poi) in (1u32..).zip(pois) {
        sheet.write_number(row, 0, row)?;
        sheet.write_string(row, 1, &poi.name)?;
        sheet.write_string(row, 2, &poi.address)?;
        sheet.write_string(row, 3, poi.status.label())?;
        sheet.write_number(row, 4, poi.latitude)?;
        sheet.write_number(row, 5, poi.longitude)?;
        sheet.write_string(row, 6, poi.coordinates_label())?;
        sheet.write_string(row, 7, &poi.id)?;
        sheet.write_string(row, 8, &export_date)?;
        sheet.write_string(row, 9, &export_time)?;
    }

    Ok(workbook.save_to_buffer()?)
}
