//! Bidirectional contact synchronization engine.
//!
//! One engine instance serves every installed account; the scope token
//! carried by each call keeps their identity links apart. Outbound handlers
//! react to platform lifecycle events and drive the external system; inbound
//! operations let the external side push changes back into the platform.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use liaison_connector::error::{ConnectorError, ConnectorResult};
use liaison_connector::ids::{ExternalId, PlatformId, ScopeToken};
use liaison_connector::mapping::{FieldMapper, FieldMapping, SchemaSide};
use liaison_connector::record::{ContactRecord, FieldValue, PLATFORM_ID_FIELD};
use liaison_connector::traits::{ExternalConsumer, PlatformClient};
use liaison_connector::types::SyncOutcome;

use liaison_store::IdentityStore;

use crate::events::{EventEnvelope, EventKind, EventResponse};
use crate::properties;

/// Synchronizes contacts between the platform and one external system.
pub struct ContactSyncEngine {
    consumer: Arc<dyn ExternalConsumer>,
    platform: Arc<dyn PlatformClient>,
    store: Arc<dyn IdentityStore>,
    mapper: FieldMapper,
}

impl std::fmt::Debug for ContactSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactSyncEngine")
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ContactSyncEngine`].
#[derive(Default)]
pub struct ContactSyncEngineBuilder {
    consumer: Option<Arc<dyn ExternalConsumer>>,
    platform: Option<Arc<dyn PlatformClient>>,
    store: Option<Arc<dyn IdentityStore>>,
    mappings: Option<Vec<FieldMapping>>,
}

impl ContactSyncEngineBuilder {
    pub fn consumer(mut self, consumer: Arc<dyn ExternalConsumer>) -> Self {
        self.consumer = Some(consumer);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn PlatformClient>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn store(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn mappings(mut self, mappings: Vec<FieldMapping>) -> Self {
        self.mappings = Some(mappings);
        self
    }

    /// Validate the configuration and build the engine.
    pub fn build(self) -> ConnectorResult<ContactSyncEngine> {
        let consumer = self
            .consumer
            .ok_or_else(|| ConnectorError::invalid_configuration("consumer is required"))?;
        let platform = self
            .platform
            .ok_or_else(|| ConnectorError::invalid_configuration("platform client is required"))?;
        let store = self
            .store
            .ok_or_else(|| ConnectorError::invalid_configuration("identity store is required"))?;
        let mappings = self
            .mappings
            .ok_or_else(|| ConnectorError::invalid_configuration("mappings is required"))?;
        let mapper = FieldMapper::new(mappings)?;
        Ok(ContactSyncEngine {
            consumer,
            platform,
            store,
            mapper,
        })
    }
}

impl ContactSyncEngine {
    pub fn builder() -> ContactSyncEngineBuilder {
        ContactSyncEngineBuilder::default()
    }

    pub fn mapper(&self) -> &FieldMapper {
        &self.mapper
    }

    pub(crate) fn consumer(&self) -> &dyn ExternalConsumer {
        self.consumer.as_ref()
    }

    pub(crate) fn platform(&self) -> &dyn PlatformClient {
        self.platform.as_ref()
    }

    pub(crate) fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    /// Dispatch one delivered event to its handler.
    pub async fn handle_event(&self, kind: EventKind, envelope: &EventEnvelope) -> EventResponse {
        let scope = envelope.scope();
        let outcome = match kind {
            EventKind::Install => self.install(scope).await,
            EventKind::Uninstall => self.uninstall(scope).await,
            EventKind::ContactCreated => {
                self.contact_created(scope, envelope.contact_payload(kind).as_ref())
                    .await
            }
            EventKind::ContactUpdated => {
                self.contact_updated(scope, envelope.contact_payload(kind).as_ref())
                    .await
            }
            EventKind::ContactDeleted => {
                self.contact_deleted(scope, envelope.contact_id(kind).as_ref())
                    .await
            }
        };
        EventResponse::data(outcome)
    }

    /// Install the integration for an account: create the mapped contact
    /// properties on the platform. The initial import is a separate step.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn install(&self, scope: &ScopeToken) -> SyncOutcome {
        match properties::install_properties(self.platform.as_ref(), &self.mapper, scope).await {
            Ok(()) => {
                debug!("integration installed");
                SyncOutcome::ok()
            }
            Err(err) => SyncOutcome::failed(err.to_string()),
        }
    }

    /// Uninstall the integration for an account. Identity links are dropped
    /// best-effort; uninstall never fails.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn uninstall(&self, scope: &ScopeToken) -> SyncOutcome {
        if let Err(err) = self.store.delete_all_ids(scope).await {
            warn!(error = %err, "failed to drop identity links on uninstall");
        }
        SyncOutcome::ok()
    }

    /// A contact was created on the platform: create it on the external side
    /// and remember the id pair.
    #[instrument(skip(self, contact), fields(scope = %scope))]
    pub async fn contact_created(
        &self,
        scope: &ScopeToken,
        contact: Option<&ContactRecord>,
    ) -> SyncOutcome {
        let Some(contact) = contact else {
            return SyncOutcome::failed("no data");
        };
        let mapped = self.mapper.map_to(contact, SchemaSide::External);
        match self.consumer.create_contact(&mapped).await {
            Ok(ext_id) => {
                match contact.platform_id_text() {
                    Some(platform_id) => {
                        let platform_id = PlatformId::new(platform_id);
                        if let Err(err) = self.store.save_ids(scope, &platform_id, &ext_id).await {
                            warn!(error = %err, "failed to persist identity link");
                        }
                    }
                    None => warn!("created contact carries no platform id"),
                }
                SyncOutcome::ok_with_id(ext_id.as_str())
            }
            Err(err) => SyncOutcome::failed(err.to_string()),
        }
    }

    /// A contact was updated on the platform: push the change to the
    /// external side, addressed by the stored external id.
    #[instrument(skip(self, contact), fields(scope = %scope))]
    pub async fn contact_updated(
        &self,
        scope: &ScopeToken,
        contact: Option<&ContactRecord>,
    ) -> SyncOutcome {
        let Some(contact) = contact else {
            return SyncOutcome::failed("no data");
        };
        let Some(platform_id) = contact.platform_id_text() else {
            return SyncOutcome::failed("no data");
        };
        let platform_id = PlatformId::new(platform_id);
        let ext_id = match self.store.ext_id(scope, &platform_id).await {
            Ok(Some(ext_id)) => ext_id,
            Ok(None) => return SyncOutcome::failed("external contact not found"),
            Err(err) => return SyncOutcome::failed(err.to_string()),
        };
        let mut mapped = self.mapper.map_to(contact, SchemaSide::External);
        mapped.set(
            self.mapper.ext_id_key(),
            FieldValue::String(ext_id.as_str().to_owned()),
        );
        match self.consumer.update_contact(&mapped).await {
            Ok(()) => SyncOutcome::ok(),
            Err(err) => SyncOutcome::failed(err.to_string()),
        }
    }

    /// A contact was deleted on the platform: delete it on the external side.
    /// The identity link is dropped whether or not the external delete
    /// succeeds; the contact is gone from the platform either way.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn contact_deleted(
        &self,
        scope: &ScopeToken,
        platform_id: Option<&PlatformId>,
    ) -> SyncOutcome {
        let Some(platform_id) = platform_id else {
            return SyncOutcome::failed("no data");
        };
        let ext_id = match self.store.ext_id(scope, platform_id).await {
            Ok(Some(ext_id)) => ext_id,
            Ok(None) => return SyncOutcome::failed("external contact not found"),
            Err(err) => return SyncOutcome::failed(err.to_string()),
        };
        let result = self.consumer.delete_contact(&ext_id).await;
        if let Err(err) = self.store.delete_ids(scope, platform_id, &ext_id).await {
            warn!(error = %err, "failed to drop identity link");
        }
        match result {
            Ok(()) => SyncOutcome::ok(),
            Err(err) => SyncOutcome::failed(err.to_string()),
        }
    }

    /// The external side created a contact: create it on the platform and
    /// remember the id pair.
    #[instrument(skip(self, contact), fields(scope = %scope))]
    pub async fn create_contact(
        &self,
        scope: &ScopeToken,
        contact: &ContactRecord,
    ) -> SyncOutcome {
        let mapped = self.mapper.map_to(contact, SchemaSide::Platform);
        match self.platform.create_contact(&mapped, scope).await {
            Ok(platform_id) => {
                match contact.get_text(self.mapper.ext_id_key()) {
                    Some(ext_id) => {
                        let ext_id = ExternalId::new(ext_id);
                        if let Err(err) = self.store.save_ids(scope, &platform_id, &ext_id).await {
                            warn!(error = %err, "failed to persist identity link");
                        }
                    }
                    None => warn!("external contact carries no id"),
                }
                SyncOutcome::ok_with_id(platform_id.as_str())
            }
            Err(err) => SyncOutcome::failed(err.to_string()),
        }
    }

    /// The external side updated a contact: push the change to the platform,
    /// addressed by the stored platform id.
    #[instrument(skip(self, contact), fields(scope = %scope))]
    pub async fn update_contact(
        &self,
        scope: &ScopeToken,
        contact: &ContactRecord,
    ) -> SyncOutcome {
        let Some(ext_id) = contact.get_text(self.mapper.ext_id_key()) else {
            return SyncOutcome::failed("no data");
        };
        let ext_id = ExternalId::new(ext_id);
        let platform_id = match self.store.platform_id(scope, &ext_id).await {
            Ok(Some(platform_id)) => platform_id,
            Ok(None) => return SyncOutcome::failed("Not found"),
            Err(err) => return SyncOutcome::failed(err.to_string()),
        };
        let mut mapped = self.mapper.map_to(contact, SchemaSide::Platform);
        mapped.set(
            PLATFORM_ID_FIELD,
            FieldValue::String(platform_id.as_str().to_owned()),
        );
        match self.platform.update_contact(&mapped, scope).await {
            Ok(()) => SyncOutcome::ok(),
            Err(err) => SyncOutcome::failed(err.to_string()),
        }
    }

    /// The external side deleted a contact: delete it on the platform. The
    /// identity link is dropped only once the platform delete has succeeded,
    /// so a failed delete can be retried.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn delete_contact(&self, scope: &ScopeToken, ext_id: &ExternalId) -> SyncOutcome {
        let platform_id = match self.store.platform_id(scope, ext_id).await {
            Ok(Some(platform_id)) => platform_id,
            Ok(None) => return SyncOutcome::failed("Not found"),
            Err(err) => return SyncOutcome::failed(err.to_string()),
        };
        match self.platform.delete_contact(&platform_id, scope).await {
            Ok(()) => {
                if let Err(err) = self.store.delete_ids(scope, &platform_id, ext_id).await {
                    warn!(error = %err, "failed to drop identity link");
                }
                SyncOutcome::ok()
            }
            Err(err) => SyncOutcome::failed(err.to_string()),
        }
    }
}
