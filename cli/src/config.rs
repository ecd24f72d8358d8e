use anyhow::{Context, Result, anyhow};
use dirs::home_dir;
use ragpilot_backend_client::DEFAULT_API_ROOT;
use ragpilot_retrieval::RetrievalSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "config.toml";
pub const HOME_ENV: &str = "RAGPILOT_HOME";
pub const API_ROOT_ENV: &str = "RAGPILOT_API_ROOT";

/// Settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every RPC path is joined onto
    #[serde(default = "default_api_root")]
    pub api_root: String,

    #[serde(default)]
    pub retrieval: RetrievalSettings,
}

fn default_api_root() -> String {
    DEFAULT_API_ROOT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_root: default_api_root(),
            retrieval: RetrievalSettings::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.retrieval.validate().map_err(|msg| anyhow!(msg))?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Resolve the config for one invocation.
    ///
    /// `explicit` must exist; the home config is optional. `RAGPILOT_API_ROOT`
    /// beats the file and `api_root` (the `--api-root` flag) beats both.
    pub fn load(explicit: Option<&Path>, api_root: Option<&str>) -> Result<Self> {
        let home = ragpilot_home();
        let mut config = match config_path(explicit, home.as_deref()) {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        if let Ok(env_root) = std::env::var(API_ROOT_ENV)
            && !env_root.trim().is_empty()
        {
            config.api_root = env_root;
        }
        if let Some(root) = api_root {
            config.api_root = root.to_string();
        }
        Ok(config)
    }
}

/// `$RAGPILOT_HOME`, else `~/.ragpilot`.
pub fn ragpilot_home() -> Option<PathBuf> {
    if let Ok(env_home) = std::env::var(HOME_ENV)
        && !env_home.is_empty()
    {
        return Some(PathBuf::from(env_home));
    }
    let mut home = home_dir()?;
    home.push(".ragpilot");
    Some(home)
}

fn config_path(explicit: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    home.map(|home| home.join(CONFIG_FILE))
        .filter(|path| path.is_file())
}
