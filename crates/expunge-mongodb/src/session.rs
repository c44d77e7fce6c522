//! Scoped use of an open store session
//!
//! [`run_scoped`] owns a session for the duration of one delete: it verifies
//! liveness, runs the delete, then closes the session exactly once no matter
//! which step failed.

use crate::delete::{delete_by_identifier, DeleteOne, DeleteResult};
use crate::identifier::DocumentId;
use async_trait::async_trait;
use expunge_common::Result;
use tracing::warn;

/// An open session against a document store
#[async_trait]
pub trait Session: Send + Sync {
    /// Collection handle borrowed from the session
    type Collection<'a>: DeleteOne
    where
        Self: 'a;

    /// Liveness check against the server
    async fn verify(&self) -> Result<()>;

    /// Handle to `database.name`; never touches the network
    fn collection<'a>(&'a self, database: &str, name: &str) -> Self::Collection<'a>;

    /// Releases the session
    async fn close(&mut self) -> Result<()>;
}

/// Verifies `session`, deletes `id` from `database.collection`, then closes
///
/// The session is consumed and closed exactly once. A close failure after an
/// earlier error is logged and the earlier error is returned. A close failure
/// after a successful delete is logged and the delete result is kept, since the
/// document is already gone.
pub async fn run_scoped<S: Session>(
    mut session: S,
    database: &str,
    collection: &str,
    id: &DocumentId,
) -> Result<DeleteResult> {
    let outcome = verify_and_delete(&session, database, collection, id).await;
    let closed = session.close().await;
    settle(outcome, closed)
}

async fn verify_and_delete<S: Session>(
    session: &S,
    database: &str,
    collection: &str,
    id: &DocumentId,
) -> Result<DeleteResult> {
    session.verify().await?;
    let handle = session.collection(database, collection);
    delete_by_identifier(&handle, id).await
}

fn settle(outcome: Result<DeleteResult>, closed: Result<()>) -> Result<DeleteResult> {
    match (outcome, closed) {
        (outcome, Ok(())) => outcome,
        (Ok(result), Err(close_err)) => {
            warn!(
                error = %close_err,
                deleted_count = result.deleted_count(),
                "Failed to close connection after delete"
            );
            Ok(result)
        }
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "Failed to close connection after earlier error");
            Err(err)
        }
    }
}
