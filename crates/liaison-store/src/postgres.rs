//! Postgres-backed identity store.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use liaison_connector::ids::{ExternalId, PlatformId, ScopeToken};

use crate::{IdentityStore, StoreResult};

/// Schema for the identity-link table.
///
/// The two uniqueness constraints keep the lookups 1:1 per scope; `save_ids`
/// evicts a conflicting reverse entry before upserting so the constraint
/// cannot trip under last-write-wins rewrites.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS identity_links (
    scope        TEXT NOT NULL,
    platform_id  TEXT NOT NULL,
    external_id  TEXT NOT NULL,
    created_at   TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (scope, platform_id),
    UNIQUE (scope, external_id)
);
";

/// Postgres [`IdentityStore`] adapter, one row per pair.
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing table if it does not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    #[instrument(skip(self), fields(scope = %scope))]
    async fn save_ids(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
        external_id: &ExternalId,
    ) -> StoreResult<bool> {
        // Evict a stale pair holding this external id for another platform id.
        sqlx::query(
            "DELETE FROM identity_links
             WHERE scope = $1 AND external_id = $2 AND platform_id <> $3",
        )
        .bind(scope.as_str())
        .bind(external_id.as_str())
        .bind(platform_id.as_str())
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO identity_links (scope, platform_id, external_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (scope, platform_id)
             DO UPDATE SET external_id = EXCLUDED.external_id",
        )
        .bind(scope.as_str())
        .bind(platform_id.as_str())
        .bind(external_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    async fn ext_id(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
    ) -> StoreResult<Option<ExternalId>> {
        let row = sqlx::query(
            "SELECT external_id FROM identity_links
             WHERE scope = $1 AND platform_id = $2",
        )
        .bind(scope.as_str())
        .bind(platform_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ExternalId::new(r.get::<String, _>("external_id"))))
    }

    async fn platform_id(
        &self,
        scope: &ScopeToken,
        external_id: &ExternalId,
    ) -> StoreResult<Option<PlatformId>> {
        let row = sqlx::query(
            "SELECT platform_id FROM identity_links
             WHERE scope = $1 AND external_id = $2",
        )
        .bind(scope.as_str())
        .bind(external_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PlatformId::new(r.get::<String, _>("platform_id"))))
    }

    #[instrument(skip(self), fields(scope = %scope))]
    async fn delete_ids(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
        external_id: &ExternalId,
    ) -> StoreResult<bool> {
        sqlx::query(
            "DELETE FROM identity_links
             WHERE scope = $1 AND platform_id = $2 AND external_id = $3",
        )
        .bind(scope.as_str())
        .bind(platform_id.as_str())
        .bind(external_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    #[instrument(skip(self), fields(scope = %scope))]
    async fn delete_all_ids(&self, scope: &ScopeToken) -> StoreResult<bool> {
        sqlx::query("DELETE FROM identity_links WHERE scope = $1")
            .bind(scope.as_str())
            .execute(&self.pool)
            .await?;

        Ok(true)
    }
}
