use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::RecognitionMode;

/// Overrides `endpoint` when set.
pub const ENDPOINT_ENV: &str = "OCR_DESK_ENDPOINT";

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/ocr";

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Full URL of the recognition endpoint.
    pub endpoint: String,
    pub default_mode: RecognitionMode,
    /// CPU inference on a full page can take minutes.
    pub request_timeout_secs: u64,
    /// Where exported results are written.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            default_mode: RecognitionMode::default(),
            request_timeout_secs: 300,
            output_dir: default_output_dir(),
        }
    }
}

/// ~/.local/share/ocr-desk/output/
fn default_output_dir() -> PathBuf {
    let mut p = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("ocr-desk");
    p.push("output");
    p
}

impl Config {
    /// Directory: ~/.config/ocr-desk/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("ocr-desk");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, then apply the environment override.
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::path());
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.apply_endpoint_override(&endpoint);
        }
        config
    }

    /// Read a config file, returning defaults if it is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    fn apply_endpoint_override(&mut self, endpoint: &str) {
        let endpoint = endpoint.trim();
        if !endpoint.is_empty() {
            log::info!("Using endpoint from {ENDPOINT_ENV}: {endpoint}");
            self.endpoint = endpoint.to_string();
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json"));
        assert_eq!(config, Config::default());
        assert_eq!(config.endpoint, "http://127.0.0.1:8000/api/ocr");
        assert_eq!(config.default_mode, RecognitionMode::Markdown);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            endpoint: "http://gpu-box:9000/api/ocr".into(),
            default_mode: RecognitionMode::PlainText,
            request_timeout_secs: 60,
            output_dir: dir.path().join("out"),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"default_mode": "plain-text"}"#).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.default_mode, RecognitionMode::PlainText);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout_secs, 300);
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn blank_override_is_ignored() {
        let mut config = Config::default();
        config.apply_endpoint_override("   ");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        config.apply_endpoint_override(" http://10.0.0.5:8000/api/ocr ");
        assert_eq!(config.endpoint, "http://10.0.0.5:8000/api/ocr");
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
