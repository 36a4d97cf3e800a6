//! Board configuration

use crate::domain::card::{CardColor, CardInput, ColumnId, Priority};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Key holding the current-version board payload
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Key holding the pre-Backlog payload, migrated on first load
    #[serde(default = "default_legacy_storage_key")]
    pub legacy_storage_key: String,

    /// Quiet period after the last change before the board is written
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,

    #[serde(default = "default_column")]
    pub default_column: ColumnId,

    #[serde(default = "default_priority")]
    pub default_priority: Priority,

    #[serde(default = "default_color")]
    pub default_color: CardColor,
}

fn default_storage_key() -> String {
    "kanban.backlog.v2".to_string()
}

fn default_legacy_storage_key() -> String {
    "kanban.backlog.v1".to_string()
}

fn default_save_debounce_ms() -> u64 {
    300
}

fn default_column() -> ColumnId {
    ColumnId::Backlog
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn default_color() -> CardColor {
    CardColor::Yellow
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            legacy_storage_key: default_legacy_storage_key(),
            save_debounce_ms: default_save_debounce_ms(),
            default_column: default_column(),
            default_priority: default_priority(),
            default_color: default_color(),
        }
    }
}

impl BoardConfig {
    /// Parses YAML, filling any missing field with its default
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| BoardError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the config file at `path`; a missing file yields the defaults
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            debug!(path = %path.display(), "BoardConfig::load: no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path).await?;
        debug!(path = %path.display(), "BoardConfig::load: parsed config file");
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() || self.legacy_storage_key.trim().is_empty() {
            return Err(BoardError::ConfigError(
                "storage keys must not be empty".to_string(),
            ));
        }
        if self.storage_key == self.legacy_storage_key {
            return Err(BoardError::ConfigError(format!(
                "storage_key and legacy_storage_key must differ (both '{}')",
                self.storage_key
            )));
        }
        Ok(())
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// A blank draft carrying the configured defaults
    pub fn card_input(&self, title: impl Into<String>) -> CardInput {
        CardInput::new(title)
            .with_priority(self.default_priority)
            .with_color(self.default_color)
            .in_column(self.default_column)
    }
}
