//! Configuration loading and image directory resolution
//!
//! Bootstrap settings come from an optional TOML file. A missing file is not
//! an error: built-in defaults apply and the caller logs a warning.
//!
//! Image directory priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `ARENA_IMAGE_DIR`
//! 3. TOML config file
//! 4. None (uploads only)

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::vote::VotePolicy;
use crate::{Error, Result};

/// Environment variable naming the image directory
pub const IMAGE_DIR_ENV: &str = "ARENA_IMAGE_DIR";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TomlConfig {
    /// Directory served as the image catalog (optional)
    #[serde(default)]
    pub image_dir: Option<PathBuf>,

    /// Instruction table (`id;instruction` CSV), optional
    #[serde(default)]
    pub instructions_csv: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Round cap per session; every matched pair is used when absent
    #[serde(default)]
    pub max_rounds: Option<usize>,

    #[serde(default)]
    pub vote_policy: VotePolicy,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            image_dir: None,
            instructions_csv: None,
            port: default_port(),
            max_rounds: None,
            vote_policy: VotePolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Default config file location: `<config_dir>/image-arena/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("image-arena").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Load the config from `explicit` or the default location
///
/// Missing files fall back to defaults; a file that exists but does not parse
/// is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let candidate = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    match candidate {
        Some(path) if path.is_file() => {
            let config = load_toml_config(&path)?;
            Ok((config, ConfigSource::File(path)))
        }
        _ => Ok((TomlConfig::default(), ConfigSource::Defaults)),
    }
}

/// Resolve the image directory following the priority order above
pub fn resolve_image_dir(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    config: &TomlConfig,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    config.image_dir.clone()
}
