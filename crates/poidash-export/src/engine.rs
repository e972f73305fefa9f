use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use poidash_core::Poi;
use poidash_dashboard::{InFlightFlag, Notice};

use crate::delimited::render_csv;
use crate::spreadsheet::render_xlsx;
use crate::structured::render_json;
use crate::{filename_for, ExportError, ExportFormat};

/// A rendered export ready to be saved or offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: ExportFormat,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub records: usize,
}

impl ExportArtifact {
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self.format {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

/// Renders `pois` in `format` as of `now`.
///
/// # Errors
///
/// Returns the serializer's [`ExportError`].
pub fn render(
    format: ExportFormat,
    pois: &[Poi],
    now: DateTime<Utc>,
    source: &str,
) -> Result<ExportArtifact, ExportError> {
    let bytes = match format {
        ExportFormat::Xlsx => render_xlsx(pois, now)?,
        ExportFormat::Csv => render_csv(pois)?,
        ExportFormat::Json => render_json(pois, now, source)?,
    };
    Ok(ExportArtifact {
        format,
        filename: filename_for(format, now),
        bytes,
        records: pois.len(),
    })
}

/// Runs exports behind a single in-flight flag and turns every outcome into
/// an operator notice.
#[derive(Debug, Clone)]
pub struct ExportEngine {
    source: String,
    flag: InFlightFlag,
}

impl ExportEngine {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            flag: InFlightFlag::new(),
        }
    }

    /// Flag backing the export trigger control.
    #[must_use]
    pub fn flag(&self) -> &InFlightFlag {
        &self.flag
    }

    /// Exports the snapshot into `dir` using the current time.
    pub fn run(&self, format: ExportFormat, pois: &[Poi], dir: &Path) -> Notice {
        self.run_at(format, pois, dir, Utc::now())
    }

    /// Exports the snapshot into `dir` as of `now`.
    ///
    /// The flag is released whether the export succeeds or fails.
    pub fn run_at(
        &self,
        format: ExportFormat,
        pois: &[Poi],
        dir: &Path,
        now: DateTime<Utc>,
    ) -> Notice {
        let Some(_guard) = self.flag.try_begin() else {
            return Notice::error("export already in progress");
        };

        match self.export(format, pois, dir, now) {
            Ok(path) => {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::info!(%format, records = pois.len(), path = %path.display(), "export written");
                Notice::success(format!(
                    "{} export completed: {} POIs exported to {filename}",
                    format.label(),
                    pois.len()
                ))
            }
            Err(e) => {
                tracing::error!(%format, error = %e, "export failed");
                Notice::error(format!(
                    "{} export failed: unable to generate file",
                    format.label()
                ))
            }
        }
    }

    fn export(
        &self,
        format: ExportFormat,
        pois: &[Poi],
        dir: &Path,
        now: DateTime<Utc>,
    ) -> Result<PathBuf, ExportError> {
        let artifact = render(format, pois, now, &self.source)?;
        std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.bytes).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}
