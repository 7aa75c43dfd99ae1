//! Configuration loading.
//!
//! Reads `~/.config/bloomloop/config.toml` with defaults for anything the file
//! leaves out. A missing or broken file never stops the visual from starting.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial inner width in logical pixels
    pub width: u32,
    /// Initial inner height in logical pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Bloomloop".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Shader effect configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectConfig {
    /// Added to the effect clock before the first frame so the shader never
    /// starts from its zero-time state.
    pub time_offset: f32,
    /// Display-referred (sRGB) colour the feedback loop fades towards
    pub background_color: [f32; 3],
    /// Pointer uniform before any input arrives, top-left origin
    pub initial_pointer: [f32; 2],
    /// Fixed RNG seed; random per run when absent
    pub seed: Option<u64>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            time_offset: 200.0,
            // #f8e8ee
            background_color: [248.0 / 255.0, 232.0 / 255.0, 238.0 / 255.0],
            initial_pointer: [0.65, 0.3],
            seed: None,
        }
    }
}

/// Synthetic input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AmbientConfig {
    /// Generate pointer events while nobody is interacting
    pub enabled: bool,
    /// Milliseconds between synthetic events
    pub period_ms: u64,
    /// Quiet time after real input before synthetic events resume
    pub debounce_ms: u64,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period_ms: 1400,
            debounce_ms: 200,
        }
    }
}

impl AmbientConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub effect: EffectConfig,
    pub ambient: AmbientConfig,
}

impl Config {
    /// Get the config directory path (~/.config/bloomloop)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("bloomloop"))
    }

    /// Get the config file path (~/.config/bloomloop/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Load config from the default location, or return defaults if it is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::info!("Could not determine config path, using defaults");
            return Self::default();
        };

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.effect.time_offset, 200.0);
        assert_eq!(config.effect.initial_pointer, [0.65, 0.3]);
        assert_eq!(config.ambient.period(), Duration::from_millis(1400));
        assert_eq!(config.ambient.debounce(), Duration::from_millis(200));
        assert!(config.ambient.enabled);
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config() {
        let partial = r#"
            [effect]
            time_offset = 0.0
            seed = 7

            [ambient]
            enabled = false
        "#;
        let config: Config = toml::from_str(partial).unwrap();
        assert_eq!(config.effect.time_offset, 0.0);
        assert_eq!(config.effect.seed, Some(7));
        assert!(!config.ambient.enabled);
        assert_eq!(config.ambient.period_ms, 1400);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\ntitle = \"petals\"\nwidth = 1024").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.window.title, "petals");
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window\nwidth = ").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
