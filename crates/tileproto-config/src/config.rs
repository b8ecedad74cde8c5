//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level tileproto configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Scroll-camera settings.
    pub camera: CameraConfig,
    /// World generation settings.
    pub world: WorldConfig,
    /// Logging settings.
    pub log: LogConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title. Also the prefix of the debug overlay.
    pub title: String,
}

/// Scroll-camera configuration.
///
/// Velocities are in world units per fixed step; one block is one world unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical extent of the view in world units. Horizontal extent follows
    /// from the window aspect ratio.
    pub view_height: f32,
    /// Velocity gained per fixed step while a direction key is held.
    pub accel: f32,
    /// Per-axis velocity clamp.
    pub max_speed: f32,
    /// Velocity divisor applied every fixed step.
    pub decay: f32,
}

/// World generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for the deterministic generator.
    pub seed: u64,
    /// Which block generator fills chunks.
    pub generator: GeneratorKind,
}

/// Selects the world data source implementation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Deterministic per chunk coordinate: re-admitted chunks reproduce the
    /// same block grid.
    #[default]
    Seeded,
    /// An unseeded uniform stream; chunk contents change on re-admission.
    Uniform,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive override (e.g. "debug", "info,wgpu=error").
    /// Empty uses the built-in default filter.
    pub level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1366,
            height: 768,
            fullscreen: false,
            vsync: true,
            title: "tileproto".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            view_height: 15.0,
            accel: 0.08,
            max_speed: 0.8,
            decay: 1.2,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            generator: GeneratorKind::Seeded,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::new(),
        }
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// A file that exists but fails to parse does not abort startup: the
    /// defaults are used and a warning is logged, leaving the file on disk
    /// for the user to fix.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            match ron::from_str::<Config>(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    Ok(config)
                }
                Err(err) => {
                    log::warn!(
                        "Config at {} is invalid ({err}); falling back to defaults",
                        config_path.display()
                    );
                    Ok(Config::default())
                }
            }
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1366"));
        assert!(ron_str.contains("height: 768"));
        assert!(ron_str.contains("view_height: 15.0"));
        assert!(ron_str.contains("title: \"tileproto\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `camera` and `log` sections entirely
        let ron_str = "(window: (), world: (seed: 42))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.generator, GeneratorKind::Seeded);
    }

    #[test]
    fn test_generator_kind_parses() {
        let config: Config = ron::from_str("(world: (generator: Uniform))").unwrap();
        assert_eq!(config.world.generator, GeneratorKind::Uniform);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.window.height = 1080;
        config.world.seed = 0xC0FFEE;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid ron}}").unwrap();

        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        // The broken file is left in place for the user to inspect.
        let on_disk = std::fs::read_to_string(dir.path().join("config.ron")).unwrap();
        assert_eq!(on_disk, "{{not valid ron}}");
    }
}
