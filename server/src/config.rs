use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL_PATH: &str = "model.onnx";
pub const DEFAULT_LABELS: [&str; 4] = ["light", "mid-light", "mid-dark", "dark"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),
    #[error("MODEL_URL is not a valid URL: {0}")]
    InvalidModelUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub run_mode: RunMode,
    pub model_url: Option<Url>,
    pub model_path: PathBuf,
    pub labels: Option<Vec<String>>,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(env::var("PORT").ok())?;
        let run_mode = parse_run_mode(env::var("APP_ENV").ok());
        let model_url = parse_model_url(env::var("MODEL_URL").ok())?;
        let model_path = PathBuf::from(
            env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()),
        );
        let labels = parse_labels(env::var("CLASS_LABELS").ok());
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| default_static_dir());

        Ok(Self {
            port,
            run_mode,
            model_url,
            model_path,
            labels,
            static_dir,
        })
    }
}

fn default_static_dir() -> String {
    match env::var("CARGO_MANIFEST_DIR") {
        Ok(manifest_dir) => format!("{}/static", manifest_dir),
        Err(_) => "./static".to_string(),
    }
}

fn parse_port(raw: Option<String>) -> Result<u16, ConfigError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or(ConfigError::InvalidPort(raw)),
        _ => Ok(DEFAULT_PORT),
    }
}

fn parse_run_mode(raw: Option<String>) -> RunMode {
    match raw.as_deref().map(str::trim) {
        Some(value) if value.eq_ignore_ascii_case("production") => RunMode::Production,
        _ => RunMode::Development,
    }
}

fn parse_model_url(raw: Option<String>) -> Result<Option<Url>, ConfigError> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => Url::parse(raw.trim())
            .map(Some)
            .map_err(|e| ConfigError::InvalidModelUrl(e.to_string())),
        _ => Ok(None),
    }
}

// An explicitly empty CLASS_LABELS turns labels off and responses carry the
// raw class index only.
fn parse_labels(raw: Option<String>) -> Option<Vec<String>> {
    match raw {
        None => Some(DEFAULT_LABELS.iter().map(|s| s.to_string()).collect()),
        Some(raw) => {
            let labels: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(String::from)
                .collect();
            if labels.is_empty() { None } else { Some(labels) }
        }
    }
}
