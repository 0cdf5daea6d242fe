//! Configuration for the debug adapter connection.
//!
//! Values resolve with a fixed precedence: a config file overrides
//! environment variables, which override the built-in defaults. Loading is
//! explicit - nothing here is read lazily from global state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable naming the visualizer host.
pub const ENV_HOST: &str = "STATECRAFT_DEBUG_HOST";
/// Environment variable naming the visualizer port.
pub const ENV_PORT: &str = "STATECRAFT_DEBUG_PORT";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 7071;

/// Where the debug adapter connects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Visualizer host name or address.
    pub host: String,
    /// Visualizer TCP port.
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

/// Errors raised while loading adapter configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}'")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value '{value}' in {var}")]
    InvalidEnv { var: String, value: String },
}

/// Partial overrides, as found in a file or the environment.
#[derive(Debug, Default, Deserialize)]
struct Overrides {
    host: Option<String>,
    port: Option<u16>,
}

impl Config {
    /// Resolve configuration from defaults, then the environment, then an
    /// optional JSON config file.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply(Overrides::from_env()?);
        if let Some(path) = file {
            config.apply(Overrides::from_file(path)?);
        }
        Ok(config)
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
    }
}

impl Overrides {
    fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var(ENV_HOST).ok();
        let port = match std::env::var(ENV_PORT) {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_PORT.to_owned(),
                value: raw.clone(),
            })?),
            Err(_) => None,
        };
        Ok(Overrides { host, port })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
