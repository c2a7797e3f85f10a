use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::api::client::ChatwootClient;
use crate::error::{Error, Result};

const CONFIG_FILE: &str = "chatwoot.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    /// Personal agent token. Needed for labels and assignments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_bot_token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join(CONFIG_FILE))
    }

    /// Stored config, or an empty one when nothing usable is on disk.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                log::warn!("ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path().ok_or(Error::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Layer `overrides` on top of `self`: its non-empty fields win, absent ones keep the stored value.
    pub fn merge(mut self, overrides: ClientConfig) -> Self {
        if !overrides.base_url.is_empty() {
            self.base_url = overrides.base_url;
        }
        if overrides.account_id.is_some() {
            self.account_id = overrides.account_id;
        }
        if overrides.agent_token.is_some() {
            self.agent_token = overrides.agent_token;
        }
        if overrides.agent_bot_token.is_some() {
            self.agent_bot_token = overrides.agent_bot_token;
        }
        self
    }

    pub fn client(&self) -> ChatwootClient {
        ChatwootClient::new(&self.base_url)
    }

    /// Token for bot-permitted calls; falls back to the agent token.
    pub fn bot_token(&self) -> &str {
        self.agent_bot_token
            .as_deref()
            .or(self.agent_token.as_deref())
            .unwrap_or_default()
    }

    pub fn agent_token(&self) -> &str {
        self.agent_token.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = ClientConfig {
            base_url: "https://support.example.com".into(),
            account_id: Some(2),
            agent_token: Some("agent".into()),
            agent_bot_token: None,
        };
        config.save_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("agent_bot_token"));
        assert_eq!(ClientConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn tokens_only_file_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "agent_token = \"agent\"\naccount_id = 4\n").unwrap();
        let config = ClientConfig::load_from(&path).unwrap();
        assert!(config.base_url.is_empty());
        assert_eq!(config.account_id, Some(4));
        assert_eq!(config.agent_token(), "agent");
    }

    #[test]
    fn rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "base_url = [").unwrap();
        assert!(matches!(ClientConfig::load_from(&path), Err(Error::ConfigParse(_))));
    }

    #[test]
    fn merge_prefers_overrides_and_keeps_stored_values() {
        let stored = ClientConfig {
            base_url: "https://stored.example.com".into(),
            account_id: Some(1),
            agent_token: Some("stored-agent".into()),
            agent_bot_token: Some("stored-bot".into()),
        };
        let overrides = ClientConfig {
            account_id: Some(9),
            agent_bot_token: Some("flag-bot".into()),
            ..ClientConfig::default()
        };
        let merged = stored.merge(overrides);
        assert_eq!(merged.base_url, "https://stored.example.com");
        assert_eq!(merged.account_id, Some(9));
        assert_eq!(merged.agent_token(), "stored-agent");
        assert_eq!(merged.bot_token(), "flag-bot");
    }

    #[test]
    fn bot_token_falls_back_to_agent_token() {
        let mut config = ClientConfig::new("https://x");
        assert_eq!(config.bot_token(), "");
        config.agent_token = Some("agent".into());
        assert_eq!(config.bot_token(), "agent");
        config.agent_bot_token = Some("bot".into());
        assert_eq!(config.bot_token(), "bot");
        assert_eq!(config.agent_token(), "agent");
    }
}
