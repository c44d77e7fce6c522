//! Connection configuration from flags, environment, and `.env` files
//!
//! Precedence, highest first: command-line flag, process environment,
//! `.env` file. clap reads the `MONGO_*` variables itself; the env file has
//! to be loaded before the final parse so its values are visible to clap.
//! Values loaded from a file never override variables that are already set.

use clap::Args;
use expunge_common::{ExpungeError, Result};
use expunge_mongodb::{ConnectionConfig, ConnectionSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_USER: &str = "MONGO_USER";
pub const ENV_PASSWORD: &str = "MONGO_PASSWORD";
pub const ENV_HOST: &str = "MONGO_HOST";
pub const ENV_PORT: &str = "MONGO_PORT";
pub const ENV_DATABASE: &str = "MONGO_DATABASE";
pub const ENV_COLLECTION: &str = "MONGO_COLLECTION";

/// Connection flags; each falls back to its `MONGO_*` variable
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Load variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Database user
    #[arg(long, env = ENV_USER)]
    pub user: Option<String>,

    /// Password; kept out of help output and meant to come from the environment
    #[arg(long, env = ENV_PASSWORD, hide = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Server host
    #[arg(long, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = ENV_PORT)]
    pub port: Option<String>,

    /// Database name
    #[arg(long, env = ENV_DATABASE)]
    pub database: Option<String>,

    /// Collection name
    #[arg(long, env = ENV_COLLECTION)]
    pub collection: Option<String>,
}

impl ConfigArgs {
    /// Builds the connection config from the parsed flags
    ///
    /// Unset or empty values are reported together, by variable name.
    pub fn resolve(&self) -> Result<ConnectionConfig> {
        let mut missing = Vec::new();
        let mut field = |value: &Option<String>, var: &'static str| -> String {
            match value {
                Some(value) if !value.is_empty() => value.clone(),
                _ => {
                    missing.push(var);
                    String::new()
                }
            }
        };

        let config = ConnectionConfig {
            user: field(&self.user, ENV_USER),
            password: field(&self.password, ENV_PASSWORD),
            host: field(&self.host, ENV_HOST),
            port: field(&self.port, ENV_PORT),
            database: field(&self.database, ENV_DATABASE),
            collection: field(&self.collection, ENV_COLLECTION),
        };

        if !missing.is_empty() {
            return Err(ExpungeError::Config(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )));
        }
        Ok(config)
    }
}

/// Driver tuning flags
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Socket connect timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub connect_timeout: u64,

    /// How long to wait for a usable server, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub server_selection_timeout: u64,

    /// Application name reported to the server
    #[arg(long, default_value = "expunge")]
    pub app_name: String,
}

impl SettingsArgs {
    pub fn to_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            connect_timeout: Some(Duration::from_secs(self.connect_timeout)),
            server_selection_timeout: Some(Duration::from_secs(self.server_selection_timeout)),
            app_name: Some(self.app_name.clone()),
            ..ConnectionSettings::default()
        }
    }
}

/// Loads an env file into the process environment
///
/// With an explicit `path` the file must exist. Without one, `./.env` (or the
/// first `.env` found in a parent directory) is loaded if present. Returns the
/// path that was loaded.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|()| Some(path.to_path_buf()))
            .map_err(|e| {
                ExpungeError::Config(format!("failed to load {}: {}", path.display(), e))
            }),
        None => match dotenvy::dotenv() {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(ExpungeError::Config(format!("failed to load .env: {}", e))),
        },
    }
}
