use async_trait::async_trait;
use poidash_core::ExtractionResult;
use reqwest::Url;

use crate::VisionError;

/// A vision model that turns an image reference into validated POI candidates.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Short provider name used in logs (`"openai"`, `"gemini"`).
    fn name(&self) -> &'static str;

    async fn extract(&self, image_url: &Url) -> Result<ExtractionResult, VisionError>;
}
