use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub question_bank_path: PathBuf,
    pub candidate_pool_size: usize,
    pub working_set_size: usize,
    pub curator_timeout: Duration,
    /// Check that the curator model is reachable before each interview.
    pub curator_preflight: bool,
    /// Fixed RNG seed for working-set and fallback sampling. Unset in production.
    pub selection_seed: Option<u64>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            question_bank_path: std::env::var("QUESTION_BANK_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/interview-questions.jsonl")),
            candidate_pool_size: require_positive(
                "CANDIDATE_POOL_SIZE",
                parse_env("CANDIDATE_POOL_SIZE", 200)?,
            )?,
            working_set_size: require_positive("WORKING_SET_SIZE", parse_env("WORKING_SET_SIZE", 20)?)?,
            curator_timeout: Duration::from_secs(parse_env("CURATOR_TIMEOUT_SECS", 30)?),
            curator_preflight: parse_env("CURATOR_PREFLIGHT", true)?,
            selection_seed: optional_env("SELECTION_SEED")?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn require_positive(key: &str, value: usize) -> Result<usize> {
    anyhow::ensure!(value > 0, "Environment variable '{key}' must be greater than zero");
    Ok(value)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(optional_env(key)?.unwrap_or(default))
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'"))
}
