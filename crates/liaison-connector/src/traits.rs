//! Collaborator traits.
//!
//! The engine talks to two remote systems through these boundaries. Both are
//! implemented elsewhere (network clients); the engine only depends on the
//! contracts. Remote failures come back as [`ConnectorError::Remote`] and are
//! surfaced verbatim in operation outcomes, never retried.
//!
//! [`ConnectorError::Remote`]: crate::error::ConnectorError::Remote

use async_trait::async_trait;

use crate::error::ConnectorResult;
use crate::ids::{ExternalId, PlatformId, ScopeToken};
use crate::record::ContactRecord;
use crate::types::{BulkCreateResponse, PropertyDef};

/// Client for the external CRM-like system.
///
/// Contact payloads handed to this trait are already expressed in the
/// external schema. Authentication against the external system is the
/// implementation's own concern; it is not scoped by the platform token.
#[async_trait]
pub trait ExternalConsumer: Send + Sync {
    /// Create a contact, returning the identifier the external system
    /// assigned to it.
    async fn create_contact(&self, contact: &ContactRecord) -> ConnectorResult<ExternalId>;

    /// Update an existing contact. The payload carries the external identity
    /// field, already resolved by the caller.
    async fn update_contact(&self, contact: &ContactRecord) -> ConnectorResult<()>;

    /// Delete the contact with the given external id.
    async fn delete_contact(&self, id: &ExternalId) -> ConnectorResult<()>;

    /// Fetch one page of the external contact listing.
    ///
    /// Pages are numbered from 1. An empty page means the listing is
    /// exhausted; the sequence is finite and non-restartable.
    async fn list_contacts(
        &self,
        page: u32,
        page_size: u32,
    ) -> ConnectorResult<Vec<ContactRecord>>;
}

/// Client for the platform API.
///
/// All operations are scoped by the platform-issued credential.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Create a contact, returning the platform-assigned id.
    async fn create_contact(
        &self,
        contact: &ContactRecord,
        scope: &ScopeToken,
    ) -> ConnectorResult<PlatformId>;

    /// Create a batch of contacts in one call.
    ///
    /// The response's `contacts` must pair positionally with the submitted
    /// records: entry *i* reports on record *i*, with a placeholder entry for
    /// every failure. Reordering or dropping entries breaks identity
    /// attribution downstream.
    async fn create_contacts(
        &self,
        contacts: &[ContactRecord],
        scope: &ScopeToken,
    ) -> ConnectorResult<BulkCreateResponse>;

    /// Update an existing contact. The payload carries the platform `id`
    /// field, already resolved by the caller.
    async fn update_contact(
        &self,
        contact: &ContactRecord,
        scope: &ScopeToken,
    ) -> ConnectorResult<()>;

    /// Delete the contact with the given platform id.
    async fn delete_contact(&self, id: &PlatformId, scope: &ScopeToken) -> ConnectorResult<()>;

    /// Create a single contact property.
    async fn create_property(
        &self,
        property: &PropertyDef,
        scope: &ScopeToken,
    ) -> ConnectorResult<()>;

    /// Create a batch of contact properties in one call.
    async fn create_properties(
        &self,
        properties: &[PropertyDef],
        scope: &ScopeToken,
    ) -> ConnectorResult<()>;
}
