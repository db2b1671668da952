use std::time::Duration;

use anyhow::{Context, Result};

use crate::preview::scheduler::DEFAULT_DEBOUNCE;
use crate::templates::TemplateId;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Delay collapsing a burst of edits into one preview refresh.
    pub preview_debounce: Duration,
    /// Template a new preview session starts with.
    pub default_template: TemplateId,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            preview_debounce: match std::env::var("PREVIEW_DEBOUNCE_MS") {
                Ok(ms) => Duration::from_millis(
                    ms.parse::<u64>()
                        .context("PREVIEW_DEBOUNCE_MS must be a number of milliseconds")?,
                ),
                Err(_) => DEFAULT_DEBOUNCE,
            },
            default_template: std::env::var("DEFAULT_TEMPLATE")
                .unwrap_or_else(|_| "minimal".to_string())
                .parse::<TemplateId>()
                .context("DEFAULT_TEMPLATE must name a known template")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
