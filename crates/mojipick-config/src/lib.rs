//! # mojipick configuration
//!
//! Configuration sources (in priority order):
//! 1. CLI arguments (applied by the binary)
//! 2. Environment variables (`MOJIPICK_GENERAL__MAX_RECENT=20`)
//! 3. User config (~/.config/mojipick/config.toml)
//! 4. Defaults

pub mod language;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use language::resolve_language;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "MOJIPICK_";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "mojipick", "mojipick")
}

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config/mojipick"))
}

/// Get the directory holding the dataset and user stores
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.local/share/mojipick"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Data files
    pub data: DataConfig,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Language for names and keywords, or "system"
    pub language: String,
    /// How many recently used emoji to remember
    pub max_recent: usize,
    /// Default skin tone (default, light, medium-light, medium, medium-dark, dark)
    pub skin_tone: String,
    /// Verbose logging
    pub debug: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            language: "system".to_string(),
            max_recent: 40,
            skin_tone: "default".to_string(),
            debug: false,
        }
    }
}

impl GeneralConfig {
    /// `max_recent`, never below one
    pub fn recent_limit(&self) -> usize {
        self.max_recent.max(1)
    }

    /// The language to use, with "system" resolved from the locale
    pub fn effective_language(&self) -> String {
        resolve_language(&self.language)
    }
}

/// Locations of the data files
///
/// Relative file names are resolved against `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
    /// Canonical dataset written by the importer
    pub dataset: PathBuf,
    /// Names, keywords and categories overrides
    pub overrides: PathBuf,
    pub favorites: PathBuf,
    pub recent: PathBuf,
    /// Local copy of emoji-test.txt
    pub source_cache: PathBuf,
    /// Where emoji-test.txt is downloaded from
    pub source_url: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            dataset: PathBuf::from("emoji_data.json"),
            overrides: PathBuf::from("emoji_translations.json"),
            favorites: PathBuf::from("emoji_favorites.json"),
            recent: PathBuf::from("emoji_recent.json"),
            source_cache: PathBuf::from("emoji-test.txt"),
            source_url: "https://unicode.org/Public/emoji/latest/emoji-test.txt".to_string(),
        }
    }
}

impl DataConfig {
    /// Directory relative file names live in
    pub fn base_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(data_dir)
    }

    /// Resolve a configured file name to a full path
    pub fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.base_dir().join(file)
        }
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.resolve(&self.dataset)
    }

    pub fn overrides_path(&self) -> PathBuf {
        self.resolve(&self.overrides)
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.resolve(&self.favorites)
    }

    pub fn recent_path(&self) -> PathBuf {
        self.resolve(&self.recent)
    }

    pub fn source_cache_path(&self) -> PathBuf {
        self.resolve(&self.source_cache)
    }
}

/// Configuration manager
pub struct ConfigManager {
    config: Arc<RwLock<Config>>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for the user config file
    pub fn new() -> anyhow::Result<Self> {
        Self::with_path(config_dir().join("config.toml"))
    }

    /// Create a config manager for a specific file
    pub fn with_path(config_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let config_path = config_path.into();
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
        }
        let config = Self::load_from_file(&config_path)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Load configuration from file, environment and defaults
    fn load_from_file(path: &Path) -> anyhow::Result<Config> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        Ok(figment.extract()?)
    }

    /// Get current configuration
    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Update configuration
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.config.write();
        f(&mut config);
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        let config = self.config.read();
        let content = toml::to_string_pretty(&*config)?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.config_path, content)?;
        tracing::info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.max_recent, 40);
        assert_eq!(config.general.language, "system");
        assert_eq!(config.data.dataset, PathBuf::from("emoji_data.json"));
        assert!(!config.general.debug);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[data]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nlanguage = \"it\"\n").unwrap();

        let config = ConfigManager::with_path(&path).unwrap().config();
        assert_eq!(config.general.language, "it");
        assert_eq!(config.general.max_recent, 40);
        assert_eq!(config.data, DataConfig::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.toml")).unwrap();
        assert_eq!(manager.config().general, GeneralConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let manager = ConfigManager::with_path(&path).unwrap();
        manager.update(|c| {
            c.general.max_recent = 12;
            c.general.skin_tone = "medium".to_string();
        });
        manager.save().unwrap();

        let reloaded = ConfigManager::with_path(&path).unwrap().config();
        assert_eq!(reloaded.general.max_recent, 12);
        assert_eq!(reloaded.general.skin_tone, "medium");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nmax_recent = \"lots\"\n").unwrap();
        assert!(ConfigManager::with_path(&path).is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let data = DataConfig {
            data_dir: Some(PathBuf::from("/srv/emoji")),
            favorites: PathBuf::from("/home/me/favs.json"),
            ..Default::default()
        };
        assert_eq!(data.dataset_path(), PathBuf::from("/srv/emoji/emoji_data.json"));
        assert_eq!(data.favorites_path(), PathBuf::from("/home/me/favs.json"));
        assert_eq!(data.source_cache_path(), PathBuf::from("/srv/emoji/emoji-test.txt"));
    }

    #[test]
    fn test_recent_limit_never_zero() {
        let general = GeneralConfig {
            max_recent: 0,
            ..Default::default()
        };
        assert_eq!(general.recent_limit(), 1);
    }
}
