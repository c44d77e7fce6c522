//! Single-document deletion by identifier

use crate::config::{ConnectionConfig, ConnectionSettings};
use crate::connection::Connection;
use crate::identifier::DocumentId;
use crate::session::run_scoped;
use async_trait::async_trait;
use bson::{doc, Document as BsonDocument};
use expunge_common::{ExpungeError, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of a single-document delete
///
/// `deleted_count` is always 0 (nothing matched) or 1 (document removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    deleted_count: u64,
}

impl DeleteResult {
    /// Nothing matched the filter
    pub const NOT_FOUND: DeleteResult = DeleteResult { deleted_count: 0 };

    /// The target document was removed
    pub const DELETED: DeleteResult = DeleteResult { deleted_count: 1 };

    /// Builds a result from the count reported by the store
    ///
    /// # Errors
    /// Returns `ExpungeError::Operation` for counts above 1, which a
    /// delete-one request can never legitimately produce.
    pub fn from_count(count: u64) -> Result<Self> {
        match count {
            0 => Ok(Self::NOT_FOUND),
            1 => Ok(Self::DELETED),
            n => Err(ExpungeError::Operation(format!(
                "delete-one reported {} deleted documents",
                n
            ))),
        }
    }

    /// Number of documents removed (0 or 1)
    pub fn deleted_count(&self) -> u64 {
        self.deleted_count
    }

    /// Returns true if the document was removed
    pub fn is_deleted(&self) -> bool {
        self.deleted_count == 1
    }
}

/// A collection that can delete at most one document matching a filter
#[async_trait]
pub trait DeleteOne: Send + Sync {
    /// `database.collection` namespace, for logging
    fn namespace(&self) -> String;

    /// Deletes at most one document matching `filter`, returning how many were removed
    async fn delete_one(&self, filter: BsonDocument) -> Result<u64>;
}

/// Filter matching exactly the document with this identifier
pub fn id_filter(id: &DocumentId) -> BsonDocument {
    doc! { "_id": id.object_id() }
}

/// Deletes the document with `id` from `collection`
///
/// A missing document is not an error: the result simply reports 0.
pub async fn delete_by_identifier<C>(collection: &C, id: &DocumentId) -> Result<DeleteResult>
where
    C: DeleteOne + ?Sized,
{
    let filter = id_filter(id);
    debug!(namespace = %collection.namespace(), %filter, "Deleting document");

    let result = DeleteResult::from_count(collection.delete_one(filter).await?)?;

    info!(
        namespace = %collection.namespace(),
        id = %id,
        deleted_count = result.deleted_count(),
        "Delete completed"
    );
    Ok(result)
}

/// Parses `raw_id`, connects with `config`, and deletes the matching document
///
/// The identifier is parsed before the configuration is even validated, so a
/// malformed identifier fails without any network traffic. Once connected, the
/// connection is closed exactly once whatever the outcome.
pub async fn delete_document(
    config: &ConnectionConfig,
    settings: &ConnectionSettings,
    raw_id: &str,
) -> Result<DeleteResult> {
    let id = DocumentId::parse(raw_id)?;
    let connection = Connection::connect(config, settings).await?;
    run_scoped(connection, &config.database, &config.collection, &id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory collection keyed by `_id`
    struct MemoryCollection {
        ids: Mutex<HashSet<ObjectId>>,
        calls: AtomicUsize,
    }

    impl MemoryCollection {
        fn with_ids(ids: &[&str]) -> Self {
            Self {
                ids: Mutex::new(
                    ids.iter()
                        .map(|s| ObjectId::parse_str(s).unwrap())
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DeleteOne for MemoryCollection {
        fn namespace(&self) -> String {
            "db.coll".to_string()
        }

        async fn delete_one(&self, filter: BsonDocument) -> Result<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let id = filter
                .get_object_id("_id")
                .map_err(|e| ExpungeError::Operation(e.to_string()))?;
            Ok(u64::from(self.ids.lock().unwrap().remove(&id)))
        }
    }

    /// Store that reports whatever count it was built with
    struct MiscountingCollection(u64);

    #[async_trait]
    impl DeleteOne for MiscountingCollection {
        fn namespace(&self) -> String {
            "db.coll".to_string()
        }

        async fn delete_one(&self, _filter: BsonDocument) -> Result<u64> {
            Ok(self.0)
        }
    }

    struct FailingCollection;

    #[async_trait]
    impl DeleteOne for FailingCollection {
        fn namespace(&self) -> String {
            "db.coll".to_string()
        }

        async fn delete_one(&self, _filter: BsonDocument) -> Result<u64> {
            Err(ExpungeError::Operation("not primary".to_string()))
        }
    }

    const ID: &str = "642f238625b383fba5ca34f0";

    #[test]
    fn test_id_filter() {
        let id = DocumentId::parse(ID).unwrap();
        let filter = id_filter(&id);
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.get_object_id("_id").unwrap(), id.object_id());
    }

    #[test]
    fn test_delete_present_then_absent() {
        let collection = MemoryCollection::with_ids(&[ID]);
        let id = DocumentId::parse(ID).unwrap();

        let first = tokio_test::block_on(delete_by_identifier(&collection, &id)).unwrap();
        assert_eq!(first, DeleteResult::DELETED);
        assert!(first.is_deleted());

        let second = tokio_test::block_on(delete_by_identifier(&collection, &id)).unwrap();
        assert_eq!(second.deleted_count(), 0);
        assert_eq!(collection.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_delete_absent_is_not_an_error() {
        let collection = MemoryCollection::with_ids(&["0123456789abcdef01234567"]);
        let id = DocumentId::parse(ID).unwrap();

        let result = tokio_test::block_on(delete_by_identifier(&collection, &id)).unwrap();
        assert_eq!(result, DeleteResult::NOT_FOUND);
        assert_eq!(collection.ids.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_through_trait_object() {
        let collection: Box<dyn DeleteOne> = Box::new(MemoryCollection::with_ids(&[ID]));
        let id = DocumentId::parse(ID).unwrap();
        let result = tokio_test::block_on(delete_by_identifier(collection.as_ref(), &id)).unwrap();
        assert!(result.is_deleted());
    }

    #[test]
    fn test_store_error_propagates() {
        let id = DocumentId::parse(ID).unwrap();
        let err = tokio_test::block_on(delete_by_identifier(&FailingCollection, &id)).unwrap_err();
        assert_eq!(err, ExpungeError::Operation("not primary".to_string()));
    }

    #[test]
    fn test_count_above_one_is_an_error() {
        let id = DocumentId::parse(ID).unwrap();
        let err =
            tokio_test::block_on(delete_by_identifier(&MiscountingCollection(2), &id)).unwrap_err();
        assert!(matches!(err, ExpungeError::Operation(_)));
    }

    #[test]
    fn test_delete_result_serializes() {
        let json = serde_json::to_string(&DeleteResult::DELETED).unwrap();
        assert_eq!(json, r#"{"deleted_count":1}"#);
    }

    #[test]
    fn test_invalid_identifier_fails_before_connecting() {
        // Empty config would fail validation; the identifier check runs first
        let config = ConnectionConfig {
            user: String::new(),
            password: String::new(),
            host: String::new(),
            port: String::new(),
            database: String::new(),
            collection: String::new(),
        };
        let err = tokio_test::block_on(delete_document(
            &config,
            &ConnectionSettings::default(),
            "zz",
        ))
        .unwrap_err();
        assert!(matches!(err, ExpungeError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_invalid_config_fails_before_connecting() {
        let config = ConnectionConfig {
            user: "u".to_string(),
            password: "p".to_string(),
            host: "localhost".to_string(),
            port: String::new(),
            database: "db".to_string(),
            collection: "coll".to_string(),
        };
        let err = tokio_test::block_on(delete_document(
            &config,
            &ConnectionSettings::default(),
            ID,
        ))
        .unwrap_err();
        assert_eq!(
            err,
            ExpungeError::Config("missing required configuration: port".to_string())
        );
    }
}
