mod api;
mod middleware;

use std::sync::Arc;

use poidash_core::AppConfig;
use poidash_store::PoiStoreClient;
use poidash_vision::{GeminiVision, OpenAiVision, VisionProvider};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = poidash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind = %config.bind_addr, "starting POI dashboard server");

    let state = build_state(&config)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store = PoiStoreClient::new(
        &config.store_url,
        config.http_timeout_secs,
        &config.user_agent,
    )?;

    let openai: Option<Arc<dyn VisionProvider>> = match &config.openai_api_key {
        Some(key) => Some(Arc::new(OpenAiVision::new(
            key,
            &config.openai_model,
            &config.openai_base_url,
            config.http_timeout_secs,
        )?)),
        None => {
            tracing::warn!("OPENAI_API_KEY not set; /extract-pois will answer 500");
            None
        }
    };

    let gemini: Option<Arc<dyn VisionProvider>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiVision::new(
            key,
            &config.gemini_model,
            &config.gemini_base_url,
            config.http_timeout_secs,
        )?)),
        None => {
            tracing::warn!("GEMINI_API_KEY not set; /gemini will answer 500");
            None
        }
    };

    Ok(AppState {
        openai,
        gemini,
        store: Arc::new(store),
        export_source: Arc::from(config.export_source.as_str()),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
