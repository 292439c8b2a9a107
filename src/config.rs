//! Configuration management for spotify-stats

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Spotify's documented maximum number of ids per batch request.
pub const MAX_BATCH_SIZE: usize = 50;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Report settings
    pub report: ReportConfig,

    /// Genre lookup and cache settings
    pub genres: GenreConfig,

    /// Spotify Web API endpoints
    pub spotify: SpotifyConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Folder containing the unzipped streaming history JSON files
    pub history_dir: PathBuf,
}

/// Report rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of rows in every top list
    pub top_n: usize,

    /// Directory charts are written to
    pub output_dir: PathBuf,
}

/// Genre resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreConfig {
    /// Cache file; when it exists no Spotify request is made
    pub cache_path: PathBuf,

    /// Ids per Spotify request (1-50)
    pub batch_size: usize,
}

/// Spotify endpoints. Credentials are read from the environment, never from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    /// Client-credentials token endpoint
    pub token_url: String,

    /// Web API base URL
    pub api_base: String,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            history_dir: PathBuf::from("./data/"),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for GenreConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("genres.csv"),
            batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_base: "https://api.spotify.com/v1".to_string(),
        }
    }
}

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub history_dir: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;
        Ok(config_dir.join(crate::APP_NAME).join("config.toml"))
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(dir) = overrides.history_dir {
            self.general.history_dir = dir;
        }
        if let Some(n) = overrides.top_n {
            self.report.top_n = n;
        }
        if let Some(dir) = overrides.output_dir {
            self.report.output_dir = dir;
        }
        if let Some(path) = overrides.cache_path {
            self.genres.cache_path = path;
        }
        self
    }

    /// Validate configuration values.
    ///
    /// Call this after loading (and after overrides) to ensure all values are
    /// within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if self.report.top_n == 0 {
            return Err(Error::config("top_n must be at least 1"));
        }

        if !(1..=MAX_BATCH_SIZE).contains(&self.genres.batch_size) {
            return Err(Error::config(format!(
                "batch_size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.genres.batch_size
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level must be one of {:?}, got '{}'",
                valid_levels, self.general.log_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.report.top_n, 10);
        assert_eq!(config.genres.batch_size, 50);
        assert_eq!(config.genres.cache_path, PathBuf::from("genres.csv"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[report]\ntop_n = 5\n").unwrap();
        assert_eq!(config.report.top_n, 5);
        assert_eq!(config.report.output_dir, PathBuf::from("."));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config::default().with_overrides(Overrides {
            history_dir: Some(PathBuf::from("/tmp/history")),
            top_n: Some(3),
            output_dir: None,
            cache_path: Some(PathBuf::from("cache.csv")),
        });
        assert_eq!(config.general.history_dir, PathBuf::from("/tmp/history"));
        assert_eq!(config.report.top_n, 3);
        assert_eq!(config.report.output_dir, PathBuf::from("."));
        assert_eq!(config.genres.cache_path, PathBuf::from("cache.csv"));
    }

    #[test]
    fn test_validate_rejects_zero_top_n() {
        let mut config = Config::default();
        config.report.top_n = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_oversized_batch() {
        let mut config = Config::default();
        config.genres.batch_size = 51;
        assert!(config.validate().is_err());
        config.genres.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.general.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.spotify.api_base, config.spotify.api_base);
    }
}
