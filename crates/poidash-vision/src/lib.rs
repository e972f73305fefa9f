//! Extraction gateway: derive POI candidates from an image with a vision model.
//!
//! Two interchangeable providers implement [`VisionProvider`]:
//!
//! - [`OpenAiVision`] asks for schema-conformant structured output and
//!   validates it directly.
//! - [`GeminiVision`] downloads the image, sends it inline, and cleans up the
//!   free-form text reply before decoding.
//!
//! Both run the decoded output through
//! [`poidash_core::validate_extraction`].

pub mod error;
pub mod fence;
pub mod gemini;
pub mod mime;
pub mod openai;
mod prompt;
pub mod provider;

pub use error::VisionError;
pub use fence::strip_code_fences;
pub use gemini::GeminiVision;
pub use mime::resolve_mime_type;
pub use openai::OpenAiVision;
pub use provider::VisionProvider;
