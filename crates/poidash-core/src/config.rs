use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; the provider API keys stay `None` when unset so
/// the server can report the affected endpoint as unavailable instead of
/// refusing to start.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        reqwest::Url::parse(&raw).map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        Ok(raw.trim_end_matches('/').to_string())
    };

    let env = parse_environment(&or_default("POIDASH_ENV", "development"));
    let bind_addr = parse_addr("POIDASH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("POIDASH_LOG_LEVEL", "info");

    let store_url = parse_url("POIDASH_STORE_URL", "https://mharmony.barikoimaps.dev")?;
    let http_timeout_secs = parse_u64("POIDASH_HTTP_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("POIDASH_USER_AGENT", "poidash/0.1 (poi-review)");

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_model = or_default("POIDASH_OPENAI_MODEL", "gpt-4o");
    let openai_base_url = parse_url("POIDASH_OPENAI_BASE_URL", "https://api.openai.com")?;

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_model = or_default("POIDASH_GEMINI_MODEL", "gemini-1.5-flash");
    let gemini_base_url = parse_url(
        "POIDASH_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com",
    )?;

    let export_dir = PathBuf::from(or_default("POIDASH_EXPORT_DIR", "."));
    let export_source = or_default("POIDASH_EXPORT_SOURCE", "POI Review Dashboard");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        store_url,
        http_timeout_secs,
        user_agent,
        openai_api_key,
        openai_model,
        openai_base_url,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        export_dir,
        export_source,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
