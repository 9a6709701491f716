//! Contact synchronization engine for the liaison connector.
//!
//! Wires an [`ExternalConsumer`](liaison_connector::traits::ExternalConsumer),
//! a [`PlatformClient`](liaison_connector::traits::PlatformClient), an
//! [`IdentityStore`](liaison_store::IdentityStore) and a field mapping set
//! into a [`ContactSyncEngine`] that keeps contacts aligned in both
//! directions:
//!
//! - platform lifecycle events ([`EventKind`]) drive the external system;
//! - calls from the external side drive the platform;
//! - [`ContactSyncEngine::import_all`] seeds the platform with every contact
//!   the external system already has.
//!
//! All store access is scoped by the event's
//! [`ScopeToken`](liaison_connector::ids::ScopeToken), so one engine serves
//! every installed account.

pub mod engine;
pub mod events;
pub mod import;
pub mod properties;

#[cfg(test)]
pub(crate) mod support;

pub use engine::{ContactSyncEngine, ContactSyncEngineBuilder};
pub use events::{EventAuth, EventEnvelope, EventKind, EventResponse};
pub use import::{BulkOutcome, ImportFailure, DEFAULT_PAGE_SIZE};
pub use properties::install_properties;
