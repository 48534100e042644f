//! Server configuration
//!
//! Settings are read from a TOML file (optional) and then overridden by
//! environment variables. Everything has a usable default, so a missing
//! file is not an error.
//!
//! Without a wrapper the popup draws on the controlling terminal, which an
//! MCP client's own TUI usually holds in raw mode, and both then read the
//! same keystrokes. Run it in a terminal emulator window instead:
//!
//! ```toml
//! handoff_dir = "/home/me/.local/share/ring-mcp/handoff"
//!
//! [presenter]
//! program = "/usr/bin/alacritty"
//! args = ["--class", "ring", "-e", "/usr/local/bin/ring-popup"]
//! timeout_secs = 600
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Name of the popup executable installed next to the server
pub const POPUP_BINARY: &str = "ring-popup";

/// Points at an alternative config file
pub const CONFIG_PATH_ENV: &str = "RING_MCP_CONFIG";

/// Overrides `handoff_dir`
pub const HANDOFF_DIR_ENV: &str = "RING_MCP_HANDOFF_DIR";

/// Overrides `presenter.program`
pub const PRESENTER_ENV: &str = "RING_MCP_PRESENTER";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Top-level configuration for the ring server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Directory holding in-flight handoff artifacts
    pub handoff_dir: Option<PathBuf>,

    /// How to launch the presentation process
    pub presenter: PresenterConfig,
}

/// Presentation process launch settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Executable to spawn; defaults to the bundled popup
    pub program: Option<PathBuf>,

    /// Arguments placed before title, message and handoff path
    pub args: Vec<String>,

    /// Kill the popup after this many seconds (unset waits forever)
    pub timeout_secs: Option<u64>,
}

impl RingConfig {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: RingConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration from CLI path, env var, default location, or defaults,
    /// then apply environment overrides
    pub fn load(cli_path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!("Loading config from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `RING_MCP_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = non_empty_env(HANDOFF_DIR_ENV) {
            self.handoff_dir = Some(PathBuf::from(dir));
        }
        if let Some(program) = non_empty_env(PRESENTER_ENV) {
            self.presenter.program = Some(PathBuf::from(program));
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.presenter.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "presenter.timeout_secs must be at least 1 (omit it to wait forever)".to_string(),
            ));
        }

        if let Some(program) = &self.presenter.program {
            if program.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "presenter.program must not be empty".to_string(),
                ));
            }
        }

        if let Some(dir) = &self.handoff_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::ValidationError(
                    "handoff_dir must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Effective handoff directory
    pub fn handoff_dir(&self) -> PathBuf {
        self.handoff_dir.clone().unwrap_or_else(default_handoff_dir)
    }

    /// Effective presenter executable
    pub fn presenter_program(&self) -> PathBuf {
        self.presenter
            .program
            .clone()
            .unwrap_or_else(default_presenter_program)
    }

    /// Effective popup wait limit
    pub fn presenter_timeout(&self) -> Option<Duration> {
        self.presenter.timeout_secs.map(Duration::from_secs)
    }
}

/// `<config_dir>/ring-mcp/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ring-mcp").join("config.toml"))
}

/// `<data_local_dir>/ring-mcp/handoff`
pub fn default_handoff_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ring-mcp")
        .join("handoff")
}

/// The popup shipped alongside the running executable, else whatever is on PATH
pub fn default_presenter_program() -> PathBuf {
    let file_name = format!("{}{}", POPUP_BINARY, std::env::consts::EXE_SUFFIX);

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&file_name)))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| PathBuf::from(file_name))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
