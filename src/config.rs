use directories::ProjectDirs;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::session::{clamp_points, ClickRule, FieldSize, SessionConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Player preferences; never holds game state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub points: u32,
    pub rule: ClickRule,
    pub auto_play_ms: u64,
    pub fade_secs: u32,
    pub field_width: f64,
    pub field_height: f64,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            points: session.points,
            rule: session.rule,
            auto_play_ms: session.auto_play_interval.as_millis() as u64,
            fade_secs: session.fade_secs,
            field_width: session.field.width,
            field_height: session.field.height,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        let field = FieldSize {
            width: cfg.field_width.max(1.0),
            height: cfg.field_height.max(1.0),
        };
        Self {
            points: clamp_points(i64::from(cfg.points)),
            rule: cfg.rule,
            field,
            fade_secs: cfg.fade_secs,
            auto_play_interval: Duration::from_millis(cfg.auto_play_ms.max(1)),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "numtap") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("numtap_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_load(&self) -> Result<Config, ConfigError> {
        let bytes = fs::read(&self.path)?;
        Ok(serde_json::from_slice::<Config>(&bytes)?)
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if !self.path.exists() {
            info!("no config at {}, using defaults", self.path.display());
            return Config::default();
        }
        self.try_load().unwrap_or_else(|e| {
            warn!("ignoring {}: {}", self.path.display(), e);
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
