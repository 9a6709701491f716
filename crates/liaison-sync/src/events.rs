//! Event transport boundary types.
//!
//! The transport that delivers platform lifecycle events (and authenticates
//! them) lives outside this crate; these are the shapes it hands to the
//! engine and gets back.

use serde::{Deserialize, Serialize};

use liaison_connector::ids::{PlatformId, ScopeToken};
use liaison_connector::record::ContactRecord;

/// The platform lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Integration installed.
    Install,
    /// Integration uninstalled.
    Uninstall,
    /// A contact was created on the platform.
    ContactCreated,
    /// A contact was updated on the platform.
    ContactUpdated,
    /// A contact was deleted on the platform.
    ContactDeleted,
}

impl EventKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Install => "install",
            EventKind::Uninstall => "uninstall",
            EventKind::ContactCreated => "contact_created",
            EventKind::ContactUpdated => "contact_updated",
            EventKind::ContactDeleted => "contact_deleted",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(EventKind::Install),
            "uninstall" => Ok(EventKind::Uninstall),
            "contact_created" => Ok(EventKind::ContactCreated),
            "contact_updated" => Ok(EventKind::ContactUpdated),
            "contact_deleted" => Ok(EventKind::ContactDeleted),
            _ => Err(format!("Unknown event kind: {s}")),
        }
    }
}

/// Authentication block of a delivered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAuth {
    /// The platform-issued credential; the scope for every store access the
    /// event triggers.
    pub token: ScopeToken,

    /// Client identifier, when the transport provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

/// One event as delivered by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Authentication block.
    pub auth: EventAuth,

    /// Event payload. The platform nests the contact under a key named after
    /// the event kind; a flat contact object is accepted too.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EventEnvelope {
    /// Create an envelope from a scope and raw payload.
    pub fn new(token: ScopeToken, data: serde_json::Value) -> Self {
        Self {
            auth: EventAuth {
                token,
                client: None,
            },
            data,
        }
    }

    /// The scope this event is authenticated for.
    pub fn scope(&self) -> &ScopeToken {
        &self.auth.token
    }

    fn payload_value(&self, kind: EventKind) -> Option<&serde_json::Value> {
        match &self.data {
            serde_json::Value::Object(map) => match map.get(kind.as_str()) {
                Some(nested) => Some(nested),
                None if !map.is_empty() => Some(&self.data),
                None => None,
            },
            _ => None,
        }
    }

    /// Decode the contact payload for a create/update event.
    pub fn contact_payload(&self, kind: EventKind) -> Option<ContactRecord> {
        self.payload_value(kind)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Extract the platform contact id for a delete event.
    pub fn contact_id(&self, kind: EventKind) -> Option<PlatformId> {
        let payload = self.payload_value(kind)?;
        let id = payload.get("contact_id").or_else(|| payload.get("id"))?;
        match id {
            serde_json::Value::String(s) => Some(PlatformId::new(s.clone())),
            serde_json::Value::Number(n) => Some(PlatformId::new(n.to_string())),
            _ => None,
        }
    }
}

/// The shape handed back to the transport after handling an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    /// Handler result payload.
    pub data: serde_json::Value,

    /// Response discriminator, always `"data"`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl EventResponse {
    /// Wrap a handler result.
    pub fn data(payload: impl Serialize) -> Self {
        Self {
            data: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
            kind: "data".to_string(),
        }
    }
}
