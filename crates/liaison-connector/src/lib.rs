//! # Liaison Connector
//!
//! Core abstractions for the liaison bidirectional contact-synchronization
//! connector.
//!
//! This crate defines the vocabulary shared by the synchronization engine and
//! its collaborators:
//!
//! - [`ids`] - Opaque identifiers (`ScopeToken`, `PlatformId`, `ExternalId`)
//! - [`record`] - The schema-agnostic contact record (field bag)
//! - [`mapping`] - Declarative field mappings and the bidirectional
//!   [`FieldMapper`](mapping::FieldMapper)
//! - [`transform`] - Pure, total value transforms (date formats, coercions)
//! - [`types`] - Operation outcomes and property definitions
//! - [`error`] - Error taxonomy
//! - [`traits`] - Collaborator contracts
//!   ([`ExternalConsumer`](traits::ExternalConsumer),
//!   [`PlatformClient`](traits::PlatformClient))
//!
//! ## Example
//!
//! ```
//! use liaison_connector::prelude::*;
//!
//! let mapper = FieldMapper::new(vec![
//!     FieldMapping::pair("id", "id"),
//!     FieldMapping::pair("firstname", "prenom"),
//! ])
//! .unwrap();
//!
//! let platform = ContactRecord::new().with("firstname", "Giselle");
//! let external = mapper.map_to(&platform, SchemaSide::External);
//! assert_eq!(external.get_text("prenom"), Some("Giselle".to_string()));
//! ```

pub mod error;
pub mod ids;
pub mod mapping;
pub mod record;
pub mod traits;
pub mod transform;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use liaison_connector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ConnectorError, ConnectorResult};
    pub use crate::ids::{ExternalId, PlatformId, ScopeToken};
    pub use crate::mapping::{FieldMapper, FieldMapping, FieldSpec, SchemaSide};
    pub use crate::record::{ContactRecord, FieldValue, PLATFORM_ID_FIELD};
    pub use crate::traits::{ExternalConsumer, PlatformClient};
    pub use crate::transform::Transform;
    pub use crate::types::{BulkCreateEntry, BulkCreateResponse, PropertyDef, SyncOutcome};
}

// Re-export async_trait for collaborator implementors
pub use async_trait::async_trait;
