//! Connection configuration and driver settings

use crate::validation::{validate_port, ValidatedCollectionName, ValidatedDatabaseName};
use expunge_common::{ExpungeError, Result};
use std::fmt;
use std::time::Duration;

/// Placeholder written wherever the password would otherwise appear
const REDACTED: &str = "****";

/// Connection parameters for a single delete run
///
/// Built once at startup and only read afterwards. `Debug` never prints the
/// password; use [`ConnectionConfig::redacted_uri`] for log output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub database: String,
    pub collection: String,
}

impl ConnectionConfig {
    /// Checks that every field is present and well formed
    ///
    /// All empty fields are reported in one error. Port, database and
    /// collection are then checked individually.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("user", &self.user),
            ("password", &self.password),
            ("host", &self.host),
            ("port", &self.port),
            ("database", &self.database),
            ("collection", &self.collection),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ExpungeError::Config(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )));
        }

        validate_port(&self.port)?;
        ValidatedDatabaseName::new(&self.database)?;
        ValidatedCollectionName::new(&self.collection)?;
        Ok(())
    }

    /// Builds `mongodb://<user>:<password>@<host>:<port>/`
    ///
    /// Credentials are percent-encoded, as the driver requires for `@`, `:`
    /// and `/` in user names and passwords.
    pub fn connection_string(&self) -> String {
        self.uri_with_password(&urlencoding::encode(&self.password))
    }

    /// Same as [`ConnectionConfig::connection_string`] with the password masked
    pub fn redacted_uri(&self) -> String {
        self.uri_with_password(REDACTED)
    }

    /// `database.collection` namespace this config targets
    pub fn namespace(&self) -> String {
        format!("{}.{}", self.database, self.collection)
    }

    fn uri_with_password(&self, password: &str) -> String {
        format!(
            "mongodb://{}:{}@{}:{}/",
            urlencoding::encode(&self.user),
            password,
            bracket_ipv6(&self.host),
            self.port
        )
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("user", &self.user)
            .field("password", &REDACTED)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .finish()
    }
}

/// Literal IPv6 hosts need brackets inside a URI
fn bracket_ipv6(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}

/// Driver settings applied on top of the parsed connection string
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    /// Socket connect timeout (default: 10s)
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout (default: 30s)
    pub server_selection_timeout: Option<Duration>,
    /// Maximum number of pooled connections (default: 1, one operation per process)
    pub max_pool_size: Option<u32>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            max_pool_size: Some(1),
            app_name: Some("expunge".to_string()),
        }
    }
}
