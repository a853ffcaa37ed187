use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

use crate::sync::ConfirmFailurePolicy;

const APP_NAME: &str = "txreview";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  #[serde(default)]
  pub approvals: ApprovalsConfig,
  /// Directory for the log file (defaults to $XDG_DATA_HOME/txreview)
  pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the transaction service
  pub url: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
  30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalsConfig {
  /// What to do when the server rejects an approval: keep or revert
  #[serde(default)]
  pub on_confirm_failure: ConfirmFailurePolicy,
}

impl ApiConfig {
  pub fn base_url(&self) -> Result<Url> {
    Url::parse(&self.url).map_err(|e| eyre!("Invalid API url '{}': {}", self.url, e))
  }
}

impl Config {
  /// Config with defaults for everything but the API url.
  pub fn with_url(url: String) -> Self {
    Self {
      api: ApiConfig {
        url,
        timeout_secs: default_timeout_secs(),
      },
      approvals: ApprovalsConfig::default(),
      log_dir: None,
    }
  }

  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./txreview.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/txreview/config.yaml
  ///
  /// Without a file, `url_override` alone is enough to run with defaults.
  pub fn load(explicit_path: Option<&Path>, url_override: Option<String>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match (path, url_override.clone()) {
      (Some(p), _) => Self::load_from_path(&p)?,
      (None, Some(url)) => Self::with_url(url),
      (None, None) => {
        return Err(eyre!(
          "No configuration file found. Create one at ~/.config/txreview/config.yaml\n\
                 or pass the service address with --url."
        ))
      }
    };

    if let Some(url) = url_override {
      config.api.url = url;
    }
    config.api.base_url()?;

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("txreview.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join(APP_NAME).join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Where the log file goes
  pub fn log_dir(&self) -> PathBuf {
    self
      .log_dir
      .clone()
      .or_else(|| dirs::data_local_dir().map(|d| d.join(APP_NAME)))
      .unwrap_or_else(|| PathBuf::from("."))
  }
}
