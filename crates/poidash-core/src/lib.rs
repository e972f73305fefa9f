//! Domain types shared by every POI dashboard crate.
//!
//! - [`Poi`] / [`PoiStatus`]: the review record and its canonical status.
//! - [`extraction`]: the provider-agnostic contract for vision-model output.
//! - [`UploadForm`]: a validated photo plus the position it was taken at.
//! - [`AppConfig`]: environment-driven configuration for the binaries.

pub mod app_config;
pub mod config;
pub mod error;
pub mod extraction;
pub mod poi;
pub mod status;
pub mod upload;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use extraction::{
    validate_extraction, validate_image_input, ExtractedPoi, ExtractionResult, ImageInput,
    PathSegment, SchemaViolation, SchemaViolations,
};
pub use poi::{parse_coordinate_input, Coordinate, Poi};
pub use status::PoiStatus;
pub use upload::{image_mime_for, validate_upload, UploadForm};
