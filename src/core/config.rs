//! Player-tunable settings, stored as JSON in the platform config directory.

use super::constants::{DEFAULT_MINI_GAME_TIMEOUT_MS, FPS, KEY_HOLD_WINDOW_MS, SETTLE_DELAY_MS};
use super::error::ConfigError;
use crate::challenges::scroller::ScrollerConfig;
use crate::challenges::whack::WhackConfig;
use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Frames per second the driver runs at. Spawn maths is normalised by it.
    pub fps: u32,
    /// Pause between a mini-game finishing and control returning to the handler.
    pub settle_delay_ms: u64,
    /// Overall mini-game time limit; 0 disables it.
    pub mini_game_timeout_ms: u64,
    pub hold_window_ms: u64,
    pub scroller: ScrollerConfig,
    pub whack: WhackConfig,
    /// Prefix prepended to sound identifiers when loading clips.
    pub sound_dir: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fps: FPS,
            settle_delay_ms: SETTLE_DELAY_MS,
            mini_game_timeout_ms: DEFAULT_MINI_GAME_TIMEOUT_MS,
            hold_window_ms: KEY_HOLD_WINDOW_MS,
            scroller: ScrollerConfig::default(),
            whack: WhackConfig::default(),
            sound_dir: None,
        }
    }
}

impl GameConfig {
    /// Location of the config file, e.g. `~/.config/lexiplay/config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("", "", "lexiplay").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join(CONFIG_FILE))
    }

    /// Time budget of one frame at `fps`.
    pub fn frame_ms(&self) -> u64 {
        1000 / self.fps.max(1) as u64
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let mut config: GameConfig = serde_json::from_str(&raw)?;
        config.fps = config.fps.max(1);
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "lexiplay-config-{}-{}-{}",
            std::process::id(),
            id,
            name
        ))
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.fps, 60);
        assert_eq!(config.settle_delay_ms, 1000);
        assert!((config.scroller.scroll_speed - 0.67).abs() < f64::EPSILON);
        assert_eq!(config.whack.columns, 3);
    }

    #[test]
    fn test_frame_ms_follows_fps() {
        let mut config = GameConfig::default();
        assert_eq!(config.frame_ms(), 16);
        config.fps = 30;
        assert_eq!(config.frame_ms(), 33);
        config.fps = 0;
        assert_eq!(config.frame_ms(), 1000);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let path = temp_path("partial.json");
        fs::write(&path, r#"{"fps": 30, "whack": {"rows": 2}}"#).unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.fps, 30);
        assert_eq!(config.whack.rows, 2);
        assert_eq!(config.whack.columns, 3);
        assert_eq!(config.settle_delay_ms, 1000);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_zero_fps_is_clamped() {
        let path = temp_path("zero.json");
        fs::write(&path, r#"{"fps": 0}"#).unwrap();
        assert_eq!(GameConfig::load(&path).unwrap().fps, 1);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = temp_path("missing.json");
        assert_eq!(GameConfig::load_or_default(&path), GameConfig::default());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let path = temp_path("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Parse(_))));
        assert_eq!(GameConfig::load_or_default(&path), GameConfig::default());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved.json");
        let mut config = GameConfig::default();
        config.mini_game_timeout_ms = 5_000;
        config.save(&path).unwrap();

        assert_eq!(GameConfig::load(&path).unwrap(), config);
        fs::remove_file(&path).ok();
    }
}
