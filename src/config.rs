use std::env;
use std::path::PathBuf;

use crate::client::DEFAULT_MODEL;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "FELFEL_GEMINI_MODEL";
pub const DATA_DIR_ENV: &str = "FELFEL_DATA_DIR";

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub data_dir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_key: var(API_KEY_ENV),
            model: var(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            data_dir: var(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
        }
    }

    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.data_dir = dir;
        }
        self
    }
}

/// `<platform data dir>/felfel`, or `./.felfel` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("felfel"))
        .unwrap_or_else(|| PathBuf::from(".felfel"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[]));
        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.data_dir, default_data_dir());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_ENV, "secret"),
            (MODEL_ENV, "gemini-1.5-flash"),
            (DATA_DIR_ENV, "/tmp/felfel-test"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/felfel-test"));
        assert!(!format!("{:?}", config).contains("secret"));
    }

    #[test]
    fn blank_key_is_unset_and_flag_wins() {
        let config = Config::from_lookup(lookup(&[(API_KEY_ENV, "  ")]))
            .with_data_dir(Some(PathBuf::from("cli-dir")));
        assert!(config.api_key.is_none());
        assert_eq!(config.data_dir, PathBuf::from("cli-dir"));
    }
}
