pub mod hosted;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use hosted::HostedStore;

/// A session resolved against the hosted backend. Carried in request
/// extensions so handlers receive an explicit session context instead of
/// re-resolving it ambiently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user_id: Uuid,
    pub email: Option<String>,
}

/// Boundary to the hosted auth/database service. Record rows cross this
/// boundary as JSON values; the typed views on top own (de)serialization.
///
/// Reads are scoped to the owning user and writes ride the caller's access
/// token, so the backend's row-level ownership rules apply to every call.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Exchange a one-time authorization code for a persisted session.
    async fn exchange_code(&self, code: &str) -> Result<Session>;

    /// Resolve the session behind an access token.
    async fn validate_session(&self, token: &str) -> Result<Session>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, token: &str) -> Result<()>;

    /// All records in `collection` owned by `user_id`, oldest first.
    async fn list_records(
        &self,
        collection: &str,
        user_id: Uuid,
        token: &str,
    ) -> Result<Vec<Value>>;

    /// Insert one record and return the stored row.
    async fn insert_record(&self, collection: &str, token: &str, record: Value) -> Result<Value>;

    /// Patch a subset of fields on the record with `id` and return the
    /// updated row. Last write wins; there is no version check.
    async fn update_record(
        &self,
        collection: &str,
        token: &str,
        id: Uuid,
        patch: Value,
    ) -> Result<Value>;
}
