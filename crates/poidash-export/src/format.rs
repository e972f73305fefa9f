use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// Name used in operator notices.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "Excel",
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Download filename for an export taken at `now`.
///
/// Spreadsheet and CSV names carry the time as well as the date so repeated
/// exports in one session do not collide.
#[must_use]
pub fn filename_for(format: ExportFormat, now: DateTime<Utc>) -> String {
    match format {
        ExportFormat::Xlsx => format!("poi-export-{}.xlsx", now.format("%Y-%m-%d_%H-%M-%S")),
        ExportFormat::Csv => format!("poi-data-{}.csv", now.format("%Y-%m-%d_%H-%M-%S")),
        ExportFormat::Json => format!("poi-data-{}.json", now.format("%Y-%m-%d")),
    }
}
