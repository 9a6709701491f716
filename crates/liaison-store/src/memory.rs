//! In-memory identity store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use liaison_connector::ids::{ExternalId, PlatformId, ScopeToken};

use crate::{IdentityStore, StoreResult};

/// Forward and reverse lookup maps for one scope.
#[derive(Debug, Default)]
struct ScopePairs {
    by_platform: HashMap<String, String>,
    by_external: HashMap<String, String>,
}

impl ScopePairs {
    /// Insert a pair, evicting any stale pair sharing either id so the two
    /// maps stay 1:1.
    fn insert(&mut self, platform_id: &str, external_id: &str) {
        if let Some(old_external) = self.by_platform.remove(platform_id) {
            self.by_external.remove(&old_external);
        }
        if let Some(old_platform) = self.by_external.remove(external_id) {
            self.by_platform.remove(&old_platform);
        }
        self.by_platform
            .insert(platform_id.to_string(), external_id.to_string());
        self.by_external
            .insert(external_id.to_string(), platform_id.to_string());
    }

    fn remove(&mut self, platform_id: &str, external_id: &str) {
        self.by_platform.remove(platform_id);
        self.by_external.remove(external_id);
    }

    fn is_empty(&self) -> bool {
        self.by_platform.is_empty()
    }
}

/// Process-local [`IdentityStore`] adapter.
///
/// Safe for concurrent access across scopes; writes to the same pair are
/// last-write-wins, matching the store contract.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    scopes: RwLock<HashMap<String, ScopePairs>>,
}

impl InMemoryIdentityStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn save_ids(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
        external_id: &ExternalId,
    ) -> StoreResult<bool> {
        let mut scopes = self.scopes.write().await;
        scopes
            .entry(scope.as_str().to_string())
            .or_default()
            .insert(platform_id.as_str(), external_id.as_str());
        Ok(true)
    }

    async fn ext_id(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
    ) -> StoreResult<Option<ExternalId>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .get(scope.as_str())
            .and_then(|pairs| pairs.by_platform.get(platform_id.as_str()))
            .map(|id| ExternalId::new(id.clone())))
    }

    async fn platform_id(
        &self,
        scope: &ScopeToken,
        external_id: &ExternalId,
    ) -> StoreResult<Option<PlatformId>> {
        let scopes = self.scopes.read().await;
        Ok(scopes
            .get(scope.as_str())
            .and_then(|pairs| pairs.by_external.get(external_id.as_str()))
            .map(|id| PlatformId::new(id.clone())))
    }

    async fn delete_ids(
        &self,
        scope: &ScopeToken,
        platform_id: &PlatformId,
        external_id: &ExternalId,
    ) -> StoreResult<bool> {
        let mut scopes = self.scopes.write().await;
        if let Some(pairs) = scopes.get_mut(scope.as_str()) {
            pairs.remove(platform_id.as_str(), external_id.as_str());
            if pairs.is_empty() {
                scopes.remove(scope.as_str());
            }
        }
        Ok(true)
    }

    async fn delete_all_ids(&self, scope: &ScopeToken) -> StoreResult<bool> {
        let mut scopes = self.scopes.write().await;
        scopes.remove(scope.as_str());
        Ok(true)
    }
}
