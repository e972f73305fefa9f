//! Export of the in-memory POI list snapshot.
//!
//! Three independent serializers (spreadsheet, delimited text, structured
//! JSON) render the same snapshot. [`ExportEngine`] writes the result to disk
//! and reports the outcome as an operator [`poidash_dashboard::Notice`].

pub mod delimited;
pub mod engine;
pub mod error;
pub mod format;
pub mod spreadsheet;
pub mod structured;

pub use engine::{render, ExportArtifact, ExportEngine};
pub use error::ExportError;
pub use format::{filename_for, ExportFormat};
