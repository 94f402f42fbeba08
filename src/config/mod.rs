pub mod lexicon;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::composer::{Emphasis, GenerationSettings, Length, Tone};
use crate::utils::{AppError, AppResult};

pub use lexicon::LexiconConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_path: String,
    pub news_slot: String,
    pub viewpoints_slot: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    pub length: Length,
    pub tone: Tone,
    pub emphasis: Emphasis,
    pub output_dir: String,
}

impl GenerationConfig {
    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            length: self.length,
            tone: self.tone,
            emphasis: self.emphasis,
        }
    }
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from("config/settings.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> AppResult<Self> {
        let config_path = path.as_ref();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("{}: {}", config_path.display(), e)))?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> AppResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.storage.database_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                database_path: "./data/newsclass.db".to_string(),
                news_slot: "news".to_string(),
                viewpoints_slot: "viewpoints".to_string(),
            },
            generation: GenerationConfig {
                length: Length::Medium,
                tone: Tone::Neutral,
                emphasis: Emphasis::Balanced,
                output_dir: "./data/comments".to_string(),
            },
        }
    }
}
