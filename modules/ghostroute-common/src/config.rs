use std::env;
use std::path::PathBuf;

use tracing::warn;

const DEFAULT_PORT: u16 = 3000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres. Absent means the server runs without a store: listings are
    // empty and runtime ingestion degrades to the fallback artifact writer.
    pub database_url: Option<String>,

    // AI providers (empty key => stub responses, never a hard failure)
    pub gemini_api_key: String,
    pub gemini_model: String,

    // Web server
    pub host: String,
    pub port: u16,

    // Audio storage
    pub audio_public_path: String,
    pub audio_dir: PathBuf,

    // Where degraded-mode insert scripts are written
    pub fallback_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    /// Everything has a sane local default; nothing here panics.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-1.5-flash-latest".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_port(env::var("PORT").ok()),
            audio_public_path: env::var("AUDIO_PUBLIC_PATH")
                .unwrap_or_else(|_| "/audio".to_string()),
            audio_dir: env::var("AUDIO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./public/audio")),
            fallback_dir: env::var("FALLBACK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./fallback")),
        }
    }

    /// True when a generative-AI key is configured.
    pub fn ai_enabled(&self) -> bool {
        !self.gemini_api_key.is_empty()
    }
}

/// A malformed PORT is logged and falls back to the default rather than
/// killing the process.
fn parse_port(raw: Option<String>) -> u16 {
    match raw {
        None => DEFAULT_PORT,
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(value = %value, "PORT is not a valid port number, using {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
    }
}
