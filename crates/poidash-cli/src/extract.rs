use poidash_core::{validate_image_input, AppConfig};
use poidash_vision::{GeminiVision, OpenAiVision, VisionProvider};

use crate::ProviderArg;

fn build_provider(
    config: &AppConfig,
    provider: ProviderArg,
) -> anyhow::Result<Box<dyn VisionProvider>> {
    Ok(match provider {
        ProviderArg::Openai => {
            let Some(key) = config.openai_api_key.as_deref() else {
                anyhow::bail!("OPENAI_API_KEY is not set");
            };
            Box::new(OpenAiVision::new(
                key,
                &config.openai_model,
                &config.openai_base_url,
                config.http_timeout_secs,
            )?)
        }
        ProviderArg::Gemini => {
            let Some(key) = config.gemini_api_key.as_deref() else {
                anyhow::bail!("GEMINI_API_KEY is not set");
            };
            Box::new(GeminiVision::new(
                key,
                &config.gemini_model,
                &config.gemini_base_url,
                config.http_timeout_secs,
            )?)
        }
    })
}

pub(crate) async fn run_extract(
    config: &AppConfig,
    url: &str,
    provider: ProviderArg,
) -> anyhow::Result<()> {
    let input = validate_image_input(&serde_json::json!({ "imageUrl": url }))?;
    let provider = build_provider(config, provider)?;

    let result = provider.extract(&input.image_url).await?;
    tracing::info!(provider = provider.name(), count = result.pois.len(), "extraction complete");
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
