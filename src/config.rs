//! Application configuration.
//!
//! Stored as JSON. Every field is optional in the file; missing fields take
//! their default value.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transform::Camera;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Ignores `width` and `height` and uses the desktop resolution.
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Solar System Simulator".to_string(),
            width: 960,
            height: 540,
            fullscreen: false,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: Camera,
    pub clear_color: [f32; 4],
    /// Tagged shader file with `#shader vertex` and `#shader fragment` sections.
    pub shader: PathBuf,
    /// Optional image applied to every body.
    pub texture: Option<PathBuf>,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Also write the log to this file.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: Camera::default(),
            clear_color: [0.2, 0.3, 0.8, 1.0],
            shader: PathBuf::from("assets/shaders/body.glsl"),
            texture: None,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Reads a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Location of the per-user config file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("orrery").join("config.json"))
    }

    /// Loads the per-user config file, or the defaults if there is none.
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Writes the config as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The configured log level, `Info` if it does not parse.
    pub fn log_level(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.log_level).unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("orrery-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "window": { "width": 1280 }, "camera": { "fov": 90.0 }, "log_level": "debug" }"#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 540);
        assert_eq!(config.camera.fov, 90.0);
        assert_eq!(config.camera.near, Camera::default().near);
        assert_eq!(config.log_level(), log::LevelFilter::Debug);
        assert_eq!(config.shader, PathBuf::from("assets/shaders/body.glsl"));
    }

    #[test]
    fn test_unknown_log_level_falls_back() {
        let config = Config {
            log_level: "chatty".to_string(),
            ..Default::default()
        };
        assert_eq!(config.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved/config.json");
        let mut config = Config::default();
        config.texture = Some(PathBuf::from("assets/textures/planet.png"));
        config.clear_color = [0.0, 0.0, 0.0, 1.0];

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(Config::load(temp_path("missing.json")), Err(Error::Io(_))));

        let path = temp_path("broken.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
        std::fs::remove_file(&path).ok();
    }
}
