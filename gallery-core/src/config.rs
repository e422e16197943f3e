use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_UNDO_WINDOW_SECS: u64 = 10;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn default_undo_window_secs() -> u64 {
    DEFAULT_UNDO_WINDOW_SECS
}

/// YAML config file structure (`~/.gallery/config.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigYaml {
    /// Directory holding the collection blobs. Defaults to `<gallery dir>/data`.
    pub data_dir: Option<PathBuf>,
    /// How long a deleted artwork or comment can be restored with undo
    #[serde(default = "default_undo_window_secs")]
    pub undo_window_secs: u64,
    /// Persist collections even when they are empty
    #[serde(default)]
    pub write_empty_collections: bool,
}

impl Default for ConfigYaml {
    fn default() -> Self {
        ConfigYaml {
            data_dir: None,
            undo_window_secs: DEFAULT_UNDO_WINDOW_SECS,
            write_empty_collections: false,
        }
    }
}

impl ConfigYaml {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Serialization(e.to_string()))
    }
}

/// Application configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub undo_window: Duration,
    pub write_empty_collections: bool,
}

impl Config {
    /// Load from `.env` / environment in dev mode, otherwise from the config file.
    pub fn load() -> Self {
        let dev_mode = std::env::var("GALLERY_DEV_MODE").is_ok() || dotenvy::dotenv().is_ok();
        if dev_mode {
            info!("Dev mode activated - loading from environment");
            Self::from_env()
        } else {
            info!("Production mode - loading from config.yaml");
            Self::load_from_gallery_dir(&gallery_dir())
        }
    }

    fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| var(name).filter(|s| !s.is_empty());

        let data_dir = var("GALLERY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| gallery_dir().join("data"));

        let undo_window_secs = match var("GALLERY_UNDO_WINDOW_SECS") {
            Some(raw) => raw.parse::<u64>().unwrap_or_else(|e| {
                warn!("Invalid GALLERY_UNDO_WINDOW_SECS {:?}: {}, using default", raw, e);
                DEFAULT_UNDO_WINDOW_SECS
            }),
            None => DEFAULT_UNDO_WINDOW_SECS,
        };

        let write_empty_collections = var("GALLERY_WRITE_EMPTY")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            data_dir,
            undo_window: Duration::from_secs(undo_window_secs),
            write_empty_collections,
        }
    }

    /// Read `config.yaml` from `gallery_dir`.
    ///
    /// A missing or unreadable file yields the defaults; the gallery must always start.
    pub fn load_from_gallery_dir(gallery_dir: &Path) -> Self {
        let config_path = gallery_dir.join("config.yaml");
        let yaml = match std::fs::read_to_string(&config_path) {
            Ok(contents) => ConfigYaml::from_yaml_str(&contents).unwrap_or_else(|e| {
                warn!(
                    "Failed to parse {}: {}, using defaults",
                    config_path.display(),
                    e
                );
                ConfigYaml::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", config_path.display());
                ConfigYaml::default()
            }
            Err(e) => {
                warn!(
                    "Failed to read {}: {}, using defaults",
                    config_path.display(),
                    e
                );
                ConfigYaml::default()
            }
        };
        Self::from_yaml(yaml, gallery_dir)
    }

    fn from_yaml(yaml: ConfigYaml, gallery_dir: &Path) -> Self {
        Self {
            data_dir: yaml.data_dir.unwrap_or_else(|| gallery_dir.join("data")),
            undo_window: Duration::from_secs(yaml.undo_window_secs),
            write_empty_collections: yaml.write_empty_collections,
        }
    }

    /// Write this configuration to `<gallery_dir>/config.yaml`
    pub fn save_to_gallery_dir(&self, gallery_dir: &Path) -> Result<(), ConfigError> {
        let yaml = ConfigYaml {
            data_dir: Some(self.data_dir.clone()),
            undo_window_secs: self.undo_window.as_secs(),
            write_empty_collections: self.write_empty_collections,
        };
        let contents =
            serde_yaml::to_string(&yaml).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        std::fs::create_dir_all(gallery_dir)?;
        std::fs::write(gallery_dir.join("config.yaml"), contents)?;
        Ok(())
    }
}

/// `~/.gallery`, or `./.gallery` when there is no home directory
pub fn gallery_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".gallery"))
        .unwrap_or_else(|| PathBuf::from(".gallery"))
}
