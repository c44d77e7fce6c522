//! MongoDB connection management with health checking and explicit close

use crate::config::{ConnectionConfig, ConnectionSettings};
use crate::delete::DeleteOne;
use crate::session::Session;
use async_trait::async_trait;
use bson::{doc, Document as BsonDocument};
use expunge_common::{ExpungeError, Result};
use mongodb::{options::ClientOptions, Client, Collection};
use std::marker::PhantomData;
use tracing::{debug, info, warn};

/// Database the liveness check runs against
const ADMIN_DATABASE: &str = "admin";

/// Lifecycle of an established [`Connection`]
///
/// A connection only exists once the driver accepted the options, so it
/// starts `Connected`; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Closed,
}

/// MongoDB connection owned by a single delete run
pub struct Connection {
    client: Client,
    redacted_uri: String,
    state: ConnectionState,
}

impl Connection {
    /// Validates `config` and builds a client for it
    ///
    /// Fails with `ExpungeError::Config` for missing or malformed fields.
    /// Driver errors are classified by kind (transport and auth failures become
    /// `ExpungeError::Connection`). The driver connects lazily, so an unreachable
    /// server surfaces from [`Connection::verify`] once server selection times out.
    pub async fn connect(config: &ConnectionConfig, settings: &ConnectionSettings) -> Result<Self> {
        config.validate()?;

        let uri = config.connection_string();
        let redacted_uri = config.redacted_uri();
        info!(uri = %redacted_uri, "Connecting to MongoDB");

        let mut client_options = ClientOptions::parse(uri.as_str())
            .await
            .map_err(|e| {
                warn!(uri = %redacted_uri, error = %e, "Connection failed");
                ExpungeError::from(e)
            })?;

        // Apply driver settings
        if let Some(connect) = settings.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = settings.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(max) = settings.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(app) = &settings.app_name {
            client_options.app_name = Some(app.clone());
        }

        let client = Client::with_options(client_options).map_err(|e| {
            warn!(uri = %redacted_uri, error = %e, "Connection failed");
            ExpungeError::Connection(e.to_string())
        })?;

        debug!(uri = %redacted_uri, "Client created");
        Ok(Self {
            client,
            redacted_uri,
            state: ConnectionState::Connected,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Connection URI with the password masked
    pub fn redacted_uri(&self) -> &str {
        &self.redacted_uri
    }

    /// Get a reference to the client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Check that the server is reachable and accepts our credentials
    pub async fn verify(&self) -> Result<()> {
        self.ensure_open()?;
        self.client
            .database(ADMIN_DATABASE)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ExpungeError::Connection(format!("Ping failed: {}", e)))?;
        debug!(uri = %self.redacted_uri, "Ping succeeded");
        Ok(())
    }

    /// Handle to `database.name`, valid while this connection is borrowed
    pub fn collection<'a>(&'a self, database: &str, name: &str) -> CollectionHandle<'a> {
        CollectionHandle {
            inner: self.client.database(database).collection(name),
            _connection: PhantomData,
        }
    }

    /// Shut the client down
    ///
    /// Closing twice is an error and leaves the driver untouched.
    pub async fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.state = ConnectionState::Closed;
        self.client.clone().shutdown().await;
        info!(uri = %self.redacted_uri, "Connection closed");
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            ConnectionState::Connected => Ok(()),
            ConnectionState::Closed => Err(ExpungeError::Connection(
                "connection is already closed".to_string(),
            )),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.state == ConnectionState::Connected {
            warn!(uri = %self.redacted_uri, "Connection dropped without being closed");
        }
    }
}

#[async_trait]
impl Session for Connection {
    type Collection<'a> = CollectionHandle<'a>;

    async fn verify(&self) -> Result<()> {
        Connection::verify(self).await
    }

    fn collection<'a>(&'a self, database: &str, name: &str) -> CollectionHandle<'a> {
        Connection::collection(self, database, name)
    }

    async fn close(&mut self) -> Result<()> {
        Connection::close(self).await
    }
}

/// Untyped collection borrowed from a [`Connection`]
pub struct CollectionHandle<'a> {
    inner: Collection<BsonDocument>,
    _connection: PhantomData<&'a Connection>,
}

impl<'a> CollectionHandle<'a> {
    /// Collection name
    pub fn name(&self) -> &str {
        self.inner.name()
    }
}

#[async_trait]
impl<'a> DeleteOne for CollectionHandle<'a> {
    fn namespace(&self) -> String {
        self.inner.namespace().to_string()
    }

    async fn delete_one(&self, filter: BsonDocument) -> Result<u64> {
        let result = self
            .inner
            .delete_one(filter)
            .await
            .map_err(|e| ExpungeError::Operation(e.to_string()))?;
        Ok(result.deleted_count)
    }
}
