use anyhow::{bail, Context, Result};

use crate::normalization::merge::DEFAULT_THRESHOLD;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;

/// Application configuration loaded from environment variables.
/// Every variable is optional; leaving `AI_NORMALIZE_URL` unset disables AI
/// normalization.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ai_normalize_url: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_timeout_secs: u64,
    pub ai_confidence_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            ai_normalize_url: None,
            ai_api_key: None,
            ai_timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
            ai_confidence_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match optional("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => defaults.port,
        };
        let ai_timeout_secs = match optional("AI_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("AI_TIMEOUT_SECS must be a whole number of seconds")?,
            None => defaults.ai_timeout_secs,
        };
        let ai_confidence_threshold = match optional("AI_CONFIDENCE_THRESHOLD") {
            Some(raw) => raw
                .parse::<f64>()
                .context("AI_CONFIDENCE_THRESHOLD must be a number")?,
            None => defaults.ai_confidence_threshold,
        };
        if !(0.0..=1.0).contains(&ai_confidence_threshold) {
            bail!("AI_CONFIDENCE_THRESHOLD must be within [0, 1], got {ai_confidence_threshold}");
        }

        Ok(Config {
            port,
            rust_log: optional("RUST_LOG").unwrap_or(defaults.rust_log),
            ai_normalize_url: optional("AI_NORMALIZE_URL"),
            ai_api_key: optional("AI_API_KEY"),
            ai_timeout_secs,
            ai_confidence_threshold,
        })
    }
}
