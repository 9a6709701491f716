//! # Liaison Identity Store
//!
//! Durable mapping between platform contact ids and external contact ids,
//! scoped by the platform-issued credential.
//!
//! The synchronization engine consumes this contract but never owns the
//! store. Any conforming implementation must guarantee that a read observes
//! the effect of a prior write completed before the read began (no stale
//! negatives under sequential single-writer use). Concurrent writers to the
//! same pair are not ordered by the contract: last write wins.
//!
//! Adapters:
//! - [`InMemoryIdentityStore`] - process-local, for tests and single-process
//!   deployments
//! - [`PgIdentityStore`] - Postgres-backed, one row per pair

use async_trait::async_trait;
use thiserror::Error;

use liaison_connector::ids::{ExternalId, PlatformId, ScopeToken};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryIdentityStore;
pub use postgres::PgIdentityStore;

/// Errors raised by identity-store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl StoreError {
    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Durable mapping between one platform contact id and one external contact
/// id, per scope.
///
/// For a given scope at most one external id maps to a given platform id and
/// vice versa; `save_ids` keeps the lookups 1:1 by evicting any stale pair
/// sharing either id. Pairs are never mutated in place, only deleted and
/// recreated. Each call is its own atomic unit; no transaction spans more
/// than one operation.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Upsert a pair. Idempotent; last write wins.
    async fn save_ids(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
        external_id: &ExternalId,
    ) -> StoreResult<bool>;

    /// Look up the external id paired with a platform id.
    async fn ext_id(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
    ) -> StoreResult<Option<ExternalId>>;

    /// Look up the platform id paired with an external id.
    async fn platform_id(
        &self,
        scope: &ScopeToken,
        external_id: &ExternalId,
    ) -> StoreResult<Option<PlatformId>>;

    /// Remove a pair. Succeeds as a no-op when the pair is absent.
    async fn delete_ids(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
        external_id: &ExternalId,
    ) -> StoreResult<bool>;

    /// Remove every pair for a scope. Used on uninstall.
    async fn delete_all_ids(&self, scope: &ScopeToken) -> StoreResult<bool>;
}
