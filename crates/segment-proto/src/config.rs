use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Timing constants for the segment watcher and the error auto-advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Length of the volume ramp at the end of every segment.
    #[serde(default = "default_fade_window_secs")]
    pub fade_window_secs: f64,
    /// Volume reached at the segment boundary.
    #[serde(default = "default_fade_floor")]
    pub fade_floor: f64,
    /// "prev" restarts the current segment once playback is this far past its start.
    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: f64,
    /// Delay before moving on after a playback error.
    #[serde(default = "default_error_advance_delay_ms")]
    pub error_advance_delay_ms: u64,
    /// Position-update cadence of the simulated media element.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// User-configurable paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Log file for the headless player.
    /// Defaults to `~/.local/share/segplay/segplay.log`.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Base directory for relative episode paths given on the command line.
    #[serde(default)]
    pub episodes_dir: Option<PathBuf>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fade_window_secs: default_fade_window_secs(),
            fade_floor: default_fade_floor(),
            restart_threshold_secs: default_restart_threshold_secs(),
            error_advance_delay_ms: default_error_advance_delay_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            episodes_dir: None,
        }
    }
}

fn default_fade_window_secs() -> f64 {
    0.75
}

fn default_fade_floor() -> f64 {
    0.3
}

fn default_restart_threshold_secs() -> f64 {
    2.0
}

fn default_error_advance_delay_ms() -> u64 {
    3000
}

fn default_tick_ms() -> u64 {
    250
}

fn default_log_file() -> PathBuf {
    platform::log_file()
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Read a config file without creating it.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }

    /// Resolve an episode path against `paths.episodes_dir` when it is relative.
    pub fn resolve_episode(&self, path: &Path) -> PathBuf {
        match &self.paths.episodes_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playback: PlaybackConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.playback.fade_window_secs, 0.75);
        assert_eq!(config.playback.fade_floor, 0.3);
        assert_eq!(config.playback.restart_threshold_secs, 2.0);
        assert_eq!(config.playback.error_advance_delay_ms, 3000);
        assert_eq!(config.playback.tick_ms, 250);
        assert!(config.paths.log_file.ends_with("segplay.log"));
        assert!(config.paths.episodes_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [playback]
            fade_floor = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(config.playback.fade_floor, 0.0);
        assert_eq!(config.playback.fade_window_secs, 0.75);
        assert_eq!(config.playback.error_advance_delay_ms, 3000);
    }

    #[test]
    fn test_resolve_episode() {
        let mut config = Config::default();
        let rel = Path::new("ama/2024-01-29.json");
        assert_eq!(config.resolve_episode(rel), rel);

        config.paths.episodes_dir = Some(PathBuf::from("/srv/episodes"));
        assert_eq!(
            config.resolve_episode(rel),
            PathBuf::from("/srv/episodes/ama/2024-01-29.json")
        );
        assert_eq!(
            config.resolve_episode(Path::new("/abs/ep.json")),
            PathBuf::from("/abs/ep.json")
        );
    }

    #[test]
    fn test_load_from_roundtrips_saved_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.playback.tick_ms = 100;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.playback.tick_ms, 100);
    }
}
