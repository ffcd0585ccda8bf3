//! Configuration persistence.
//!
//! Stores the three provider credentials and the selected provider as JSON
//! in the user's config directory (e.g. `~/.config/askshot/config.json` on
//! Linux). Loaded once at startup; written on explicit save and whenever the
//! selected provider changes.

use crate::error::Result;
use crate::provider::Provider;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted application configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub openai_key: String,
    #[serde(default)]
    pub gemini_key: String,
    #[serde(default)]
    pub claude_key: String,
    #[serde(default)]
    pub selected: Provider,
}

impl AppConfig {
    /// Returns the default config file path, creating the directory if needed.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "askshot").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("config.json")
        })
    }

    /// Loads configuration from the default location.
    ///
    /// A missing file yields defaults (written back to disk, so a config
    /// file exists after first launch) rather than an error. Empty
    /// credentials fall back to the conventional environment variables
    /// (`.env` files are honored).
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .map(|path| Self::load_or_init(&path))
            .unwrap_or_default();
        config.apply_env_fallback();
        config
    }

    /// Loads from `path`, creating a default file there first if none exists.
    ///
    /// An existing but unreadable file is left untouched and defaults are
    /// used for the session.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            Self::load_from(path).unwrap_or_default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                log::warn!("failed to write default config: {}", e);
            }
            config
        }
    }

    /// Loads configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persists configuration to the default location.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    /// Persists configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Fills empty credentials from environment variables.
    fn apply_env_fallback(&mut self) {
        let _ = dotenvy::dotenv();
        if self.openai_key.is_empty()
            && let Ok(key) = env::var("OPENAI_API_KEY")
        {
            self.openai_key = key;
        }
        if self.gemini_key.is_empty()
            && let Ok(key) = env::var("GEMINI_API_KEY")
        {
            self.gemini_key = key;
        }
        if self.claude_key.is_empty()
            && let Ok(key) = env::var("ANTHROPIC_API_KEY")
        {
            self.claude_key = key;
        }
    }

    /// Returns the stored credential for a provider.
    pub fn credential(&self, provider: Provider) -> &str {
        match provider {
            Provider::OpenAi => &self.openai_key,
            Provider::Gemini => &self.gemini_key,
            Provider::Claude => &self.claude_key,
        }
    }

    /// Mutable access to the stored credential for a provider.
    pub fn credential_mut(&mut self, provider: Provider) -> &mut String {
        match provider {
            Provider::OpenAi => &mut self.openai_key,
            Provider::Gemini => &mut self.gemini_key,
            Provider::Claude => &mut self.claude_key,
        }
    }

    /// Whether a non-empty credential exists for the provider.
    pub fn has_credential(&self, provider: Provider) -> bool {
        !self.credential(provider).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(tag: &str) -> PathBuf {
        env::temp_dir().join(format!("askshot-config-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn credentials_round_trip_for_all_providers() {
        let path = temp_config_path("roundtrip");
        let mut config = AppConfig::default();
        *config.credential_mut(Provider::OpenAi) = "sk-openai".to_string();
        *config.credential_mut(Provider::Gemini) = "AIza-gemini".to_string();
        *config.credential_mut(Provider::Claude) = "sk-ant-claude".to_string();
        config.selected = Provider::Claude;

        config.save_to(&path).unwrap();
        let reloaded = AppConfig::load_from(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(reloaded, config);
        for provider in Provider::ALL {
            assert_eq!(reloaded.credential(provider), config.credential(provider));
        }
    }

    #[test]
    fn missing_fields_default_rather_than_fail() {
        let path = temp_config_path("partial");
        fs::write(&path, r#"{ "selected": "gemini" }"#).unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.selected, Provider::Gemini);
        assert!(!config.has_credential(Provider::Gemini));
    }

    #[test]
    fn first_load_writes_a_default_config_file() {
        let path = temp_config_path("first-load");
        let _ = fs::remove_file(&path);

        let config = AppConfig::load_or_init(&path);
        assert_eq!(config, AppConfig::default());

        // the defaults now live on disk
        let on_disk = AppConfig::load_from(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(on_disk, config);
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let path = temp_config_path("missing");
        assert!(AppConfig::load_from(&path).is_err());
    }
}
