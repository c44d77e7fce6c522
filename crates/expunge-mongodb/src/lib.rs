//! MongoDB delete-by-identifier for expunge
//!
//! This crate connects to a MongoDB deployment described by a
//! [`ConnectionConfig`], verifies it with a ping, deletes at most one document
//! by `_id`, and closes the connection again.
//!
//! # Flow
//! - [`DocumentId::parse`] rejects malformed identifiers locally
//! - [`Connection::connect`] validates the config and builds the client
//! - [`run_scoped`] pings, deletes, and closes exactly once
//! - [`delete_document`] chains all of the above

pub mod config;
pub mod connection;
pub mod delete;
pub mod identifier;
pub mod session;
pub mod validation;

pub use config::{ConnectionConfig, ConnectionSettings};
pub use connection::{CollectionHandle, Connection, ConnectionState};
pub use delete::{delete_by_identifier, delete_document, id_filter, DeleteOne, DeleteResult};
pub use expunge_common::{ErrorKind, ExpungeError, Result};
pub use identifier::DocumentId;
pub use session::{run_scoped, Session};
pub use validation::{validate_port, ValidatedCollectionName, ValidatedDatabaseName};
