//! Shared mock connectors for engine and import tests.

use std::sync::Mutex;

use liaison_connector::async_trait;
use liaison_connector::error::{ConnectorError, ConnectorResult};
use liaison_connector::ids::{ExternalId, PlatformId, ScopeToken};
use liaison_connector::mapping::{FieldMapping, FieldSpec};
use liaison_connector::record::ContactRecord;
use liaison_connector::transform::Transform;
use liaison_connector::traits::{ExternalConsumer, PlatformClient};
use liaison_connector::types::{BulkCreateEntry, BulkCreateResponse, PropertyDef};

/// The mapping set used across engine and import tests.
pub fn sample_mappings() -> Vec<FieldMapping> {
    vec![
        FieldMapping {
            platform: FieldSpec::named("id"),
            external: FieldSpec::named("id").with_transform(Transform::ParseInteger),
        },
        FieldMapping::pair("firstname", "prenom"),
        FieldMapping::pair("lastname", "nom"),
        FieldMapping::pair("email", "email"),
        FieldMapping::pair("phone", "telephone"),
        FieldMapping {
            platform: FieldSpec::named("signup_date")
                .with_type("date")
                .with_transform(Transform::date_to_iso()),
            external: FieldSpec::named("date_inscription")
                .with_transform(Transform::iso_to_date()),
        },
        FieldMapping {
            platform: FieldSpec::named("validation").with_type("number"),
            external: FieldSpec::named("validation"),
        },
        FieldMapping::pair("account", "compte"),
    ]
}

pub fn scope() -> ScopeToken {
    ScopeToken::new("test-token")
}

/// Scripted [`ExternalConsumer`] that records every call.
#[derive(Default)]
pub struct MockConsumer {
    pub fail_create: bool,
    pub fail_update: bool,
    pub fail_delete: bool,
    /// Pages served by `list_contacts`, indexed from page 1.
    pub pages: Vec<Vec<ContactRecord>>,
    /// When set, `list_contacts` fails at this page.
    pub fail_list_at: Option<u32>,
    pub created: Mutex<Vec<ContactRecord>>,
    pub updated: Mutex<Vec<ContactRecord>>,
    pub deleted: Mutex<Vec<ExternalId>>,
    pub list_calls: Mutex<Vec<u32>>,
}

impl MockConsumer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExternalConsumer for MockConsumer {
    async fn create_contact(&self, contact: &ContactRecord) -> ConnectorResult<ExternalId> {
        self.created.lock().unwrap().push(contact.clone());
        if self.fail_create {
            return Err(ConnectorError::remote("external create failed"));
        }
        Ok(ExternalId::new("122"))
    }

    async fn update_contact(&self, contact: &ContactRecord) -> ConnectorResult<()> {
        self.updated.lock().unwrap().push(contact.clone());
        if self.fail_update {
            return Err(ConnectorError::remote("external update failed"));
        }
        Ok(())
    }

    async fn delete_contact(&self, id: &ExternalId) -> ConnectorResult<()> {
        self.deleted.lock().unwrap().push(id.clone());
        if self.fail_delete {
            return Err(ConnectorError::remote("external delete failed"));
        }
        Ok(())
    }

    async fn list_contacts(
        &self,
        page: u32,
        _page_size: u32,
    ) -> ConnectorResult<Vec<ContactRecord>> {
        self.list_calls.lock().unwrap().push(page);
        if self.fail_list_at == Some(page) {
            return Err(ConnectorError::remote("listing failed"));
        }
        Ok(self
            .pages
            .get((page - 1) as usize)
            .cloned()
            .unwrap_or_default())
    }
}

/// Scripted [`PlatformClient`] that records every call.
#[derive(Default)]
pub struct MockPlatform {
    pub fail_create: bool,
    pub fail_update: bool,
    pub fail_delete: bool,
    pub fail_properties: bool,
    /// Whole bulk calls fail at the transport level.
    pub error_bulk: bool,
    /// Whole bulk calls come back rejected with no per-record entries.
    pub fail_bulk: bool,
    /// Per-record indices that fail in every bulk call.
    pub bulk_entry_failures: Vec<usize>,
    /// Report whole-call failure even though every entry succeeds.
    pub contradict_bulk_success: bool,
    /// Drop the last entry of every bulk response.
    pub truncate_bulk_response: bool,
    pub created: Mutex<Vec<ContactRecord>>,
    pub updated: Mutex<Vec<ContactRecord>>,
    pub deleted: Mutex<Vec<PlatformId>>,
    pub bulk_calls: Mutex<Vec<Vec<ContactRecord>>>,
    pub property_calls: Mutex<Vec<Vec<PropertyDef>>>,
    pub counter: Mutex<u64>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn create_contact(
        &self,
        contact: &ContactRecord,
        _scope: &ScopeToken,
    ) -> ConnectorResult<PlatformId> {
        self.created.lock().unwrap().push(contact.clone());
        if self.fail_create {
            return Err(ConnectorError::remote("platform create failed"));
        }
        Ok(PlatformId::new("19597"))
    }

    async fn create_contacts(
        &self,
        contacts: &[ContactRecord],
        _scope: &ScopeToken,
    ) -> ConnectorResult<BulkCreateResponse> {
        self.bulk_calls.lock().unwrap().push(contacts.to_vec());
        if self.error_bulk {
            return Err(ConnectorError::remote("bulk transport failed"));
        }
        if self.fail_bulk {
            return Ok(BulkCreateResponse::failed("bulk create rejected"));
        }
        let mut counter = self.counter.lock().unwrap();
        let mut entries: Vec<BulkCreateEntry> = contacts
            .iter()
            .enumerate()
            .map(|(index, _)| {
                if self.bulk_entry_failures.contains(&index) {
                    BulkCreateEntry::failed("invalid record")
                } else {
                    *counter += 1;
                    BulkCreateEntry::created(PlatformId::new(format!("p{}", *counter)))
                }
            })
            .collect();
        if self.truncate_bulk_response {
            entries.pop();
        }
        let success = entries.iter().all(|e| e.success) && !self.contradict_bulk_success;
        Ok(BulkCreateResponse {
            success,
            error: None,
            contacts: entries,
        })
    }

    async fn update_contact(
        &self,
        contact: &ContactRecord,
        _scope: &ScopeToken,
    ) -> ConnectorResult<()> {
        self.updated.lock().unwrap().push(contact.clone());
        if self.fail_update {
            return Err(ConnectorError::remote("platform update failed"));
        }
        Ok(())
    }

    async fn delete_contact(
        &self,
        id: &PlatformId,
        _scope: &ScopeToken,
    ) -> ConnectorResult<()> {
        self.deleted.lock().unwrap().push(id.clone());
        if self.fail_delete {
            return Err(ConnectorError::remote("platform delete failed"));
        }
        Ok(())
    }

    async fn create_property(
        &self,
        property: &PropertyDef,
        scope: &ScopeToken,
    ) -> ConnectorResult<()> {
        self.create_properties(std::slice::from_ref(property), scope)
            .await
    }

    async fn create_properties(
        &self,
        properties: &[PropertyDef],
        _scope: &ScopeToken,
    ) -> ConnectorResult<()> {
        self.property_calls.lock().unwrap().push(properties.to_vec());
        if self.fail_properties {
            return Err(ConnectorError::remote("property creation failed"));
        }
        Ok(())
    }
}

/// Identity store whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl liaison_store::IdentityStore for FailingStore {
    async fn save_ids(
        &self,
        _scope: &ScopeToken,
        _platform_id: &PlatformId,
        _ext_id: &ExternalId,
    ) -> liaison_store::StoreResult<bool> {
        Err(liaison_store::StoreError::internal("store down"))
    }

    async fn ext_id(
        &self,
        _scope: &ScopeToken,
        _platform_id: &PlatformId,
    ) -> liaison_store::StoreResult<Option<ExternalId>> {
        Err(liaison_store::StoreError::internal("store down"))
    }

    async fn platform_id(
        &self,
        _scope: &ScopeToken,
        _ext_id: &ExternalId,
    ) -> liaison_store::StoreResult<Option<PlatformId>> {
        Err(liaison_store::StoreError::internal("store down"))
    }

    async fn delete_ids(
        &self,
        _scope: &ScopeToken,
        _platform_id: &PlatformId,
        _external_id: &ExternalId,
    ) -> liaison_store::StoreResult<bool> {
        Err(liaison_store::StoreError::internal("store down"))
    }

    async fn delete_all_ids(&self, _scope: &ScopeToken) -> liaison_store::StoreResult<bool> {
        Err(liaison_store::StoreError::internal("store down"))
    }
}
