//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$NOTICEBOARD_CONFIG` (environment variable)
//! 2. `~/.config/noticeboard/config.toml` (Linux/macOS)
//!    `%APPDATA%\noticeboard\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Airtable connection settings.
    pub airtable: AirtableConfig,
    /// Search behavior tuning.
    pub search: SearchConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// `strftime` format string for sent times in table output.
    pub date_format: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

/// Airtable connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirtableConfig {
    /// API key. The `AIRTABLE_API_KEY` environment variable takes
    /// precedence, so keys can stay out of config files.
    pub api_key: String,
    /// Base id (`app…`).
    pub base_id: String,
    /// Table name inside the base.
    pub table: String,
}

/// Search behavior tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Retry the sender filter with a fuzzy matcher when the substring
    /// pass finds nothing.
    pub fuzzy_senders: bool,
    /// Jaro-Winkler similarity cutoff for the fuzzy pass.
    pub fuzzy_threshold: f64,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            date_format: "%Y-%m-%d %H:%M".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            table: "Announcements".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_senders: false,
            fuzzy_threshold: 0.85,
        }
    }
}

impl AirtableConfig {
    /// The API key with the environment override applied.
    pub fn resolved_api_key(&self) -> String {
        pick_key(std::env::var("AIRTABLE_API_KEY").ok(), &self.api_key)
    }
}

/// Choose between an environment-supplied key and the configured one.
/// A variable that is set but empty does not count as an override.
fn pick_key(env_val: Option<String>, configured: &str) -> String {
    env_val
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| configured.to_string())
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("NOTICEBOARD_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("noticeboard").join("config.toml"))
}

/// Return the cache directory used for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("noticeboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.airtable.table, "Announcements");
        assert!(cfg.airtable.api_key.is_empty());
        assert!(!cfg.search.fuzzy_senders);
        assert!((cfg.search.fuzzy_threshold - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
        assert_eq!(parsed.airtable.table, cfg.airtable.table);
        assert_eq!(parsed.search.fuzzy_senders, cfg.search.fuzzy_senders);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[airtable]
base_id = "appSchool123"

[search]
fuzzy_senders = true
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.airtable.base_id, "appSchool123");
        assert!(cfg.search.fuzzy_senders);
        // Other fields use defaults
        assert_eq!(cfg.airtable.table, "Announcements");
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_pick_key_prefers_non_empty_env() {
        assert_eq!(
            pick_key(Some("keyFromEnv".to_string()), "keyFromFile"),
            "keyFromEnv"
        );
    }

    #[test]
    fn test_pick_key_falls_back_when_unset_or_empty() {
        assert_eq!(pick_key(None, "keyFromFile"), "keyFromFile");
        assert_eq!(pick_key(Some(String::new()), "keyFromFile"), "keyFromFile");
    }

    #[test]
    fn test_resolved_api_key_reads_env() {
        // Process-wide mutation; no other test's outcome depends on
        // this variable.
        let cfg = AirtableConfig {
            api_key: "keyFromFile".to_string(),
            ..Default::default()
        };
        std::env::set_var("AIRTABLE_API_KEY", "keyFromEnv");
        assert_eq!(cfg.resolved_api_key(), "keyFromEnv");
        std::env::remove_var("AIRTABLE_API_KEY");
        assert_eq!(cfg.resolved_api_key(), "keyFromFile");
    }

    #[test]
    fn test_config_file_path_env_override() {
        let injected = PathBuf::from("/tmp/noticeboard-test.toml");
        std::env::set_var("NOTICEBOARD_CONFIG", &injected);
        assert_eq!(config_file_path(), Some(injected.clone()));
        std::env::remove_var("NOTICEBOARD_CONFIG");
        // Without the variable the standard directory (or None) wins
        assert_ne!(config_file_path(), Some(injected));
    }
}
