use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Environment variables checked, in order, before `api_key` from the file.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_flashcard_temperature")]
    pub flashcard_temperature: f32,
    #[serde(default = "default_quiz_temperature")]
    pub quiz_temperature: f32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub catalog_path: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_flashcard_temperature() -> f32 {
    1.0
}
fn default_quiz_temperature() -> f32 {
    0.9
}
fn default_request_timeout_secs() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            model: default_model(),
            api_base_url: default_api_base_url(),
            api_key: None,
            flashcard_temperature: default_flashcard_temperature(),
            quiz_temperature: default_quiz_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            catalog_path: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        Self::app_dir(dirs::config_dir()).join("config.toml")
    }

    pub fn data_dir() -> PathBuf {
        Self::app_dir(dirs::data_dir())
    }

    fn app_dir(base: Option<PathBuf>) -> PathBuf {
        base.unwrap_or_else(|| PathBuf::from(".")).join("pharmtutor")
    }

    /// Environment wins over the file so keys need not be written to disk.
    pub fn resolved_api_key(&self) -> Option<String> {
        let from_env = API_KEY_VARS.iter().find_map(|var| env::var(var).ok());
        Self::pick_api_key(from_env, self.api_key.clone())
    }

    fn pick_api_key(from_env: Option<String>, from_file: Option<String>) -> Option<String> {
        [from_env, from_file]
            .into_iter()
            .flatten()
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.api_key, None);
        assert_eq!(config.request_timeout_secs, 30);
        assert!((config.quiz_temperature - 0.9).abs() < f32::EPSILON);
        assert!(config.catalog_path().is_none());
    }

    #[test]
    fn test_config_serde_partial_file() {
        let toml_str = r#"
theme = "gruvbox-dark"
model = "gemini-2.0-flash"
catalog_path = "/tmp/drugs.txt"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "gruvbox-dark");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.catalog_path(), Some(PathBuf::from("/tmp/drugs.txt")));
        // Unset fields fall back to defaults
        assert_eq!(config.log_level, "info");
        assert!((config.flashcard_temperature - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.api_key = Some("abc".to_string());
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.api_key, deserialized.api_key);
        assert_eq!(config.api_base_url, deserialized.api_base_url);
        assert_eq!(config.request_timeout_secs, deserialized.request_timeout_secs);
    }

    #[test]
    fn test_blank_catalog_path_is_ignored() {
        let mut config = Config::default();
        config.catalog_path = Some("   ".to_string());
        assert!(config.catalog_path().is_none());
    }

    #[test]
    fn test_env_key_beats_file_key() {
        let picked = Config::pick_api_key(Some("env".into()), Some("file".into()));
        assert_eq!(picked.as_deref(), Some("env"));
    }

    #[test]
    fn test_blank_keys_are_skipped() {
        assert_eq!(
            Config::pick_api_key(Some("  ".into()), Some(" file ".into())).as_deref(),
            Some("file")
        );
        assert_eq!(Config::pick_api_key(None, Some(String::new())), None);
    }
}
