//! Operation outcome types and property definitions.

use serde::{Deserialize, Serialize};

use crate::ids::PlatformId;

/// Outcome of a single-contact operation, in the shape the event transport
/// returns to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// Whether the operation succeeded.
    pub success: bool,

    /// Identifier assigned by the remote system, when the operation creates
    /// or resolves one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Error detail when the operation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncOutcome {
    /// A successful outcome with no identifier.
    pub fn ok() -> Self {
        Self {
            success: true,
            id: None,
            error: None,
        }
    }

    /// A successful outcome carrying the remote identifier.
    pub fn ok_with_id(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            error: None,
        }
    }

    /// A failed outcome.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// One entry of a platform bulk-create response.
///
/// Entries are paired positionally with the submitted records: entry *i*
/// reports on record *i* of the request. The platform client must preserve
/// order and emit a placeholder entry for every failed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCreateEntry {
    /// Whether this record was created.
    pub success: bool,

    /// Platform id assigned to the created contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PlatformId>,

    /// Error detail for this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BulkCreateEntry {
    /// A created record with its assigned id.
    pub fn created(id: impl Into<PlatformId>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            error: None,
        }
    }

    /// A failed record.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// Response of a platform bulk-create call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkCreateResponse {
    /// True only if every record in the request was created.
    pub success: bool,

    /// Page-level error when the call failed as a whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Per-record outcomes, positionally paired with the request.
    #[serde(default)]
    pub contacts: Vec<BulkCreateEntry>,
}

impl BulkCreateResponse {
    /// A response where every record was created, ids in request order.
    pub fn all_created(ids: impl IntoIterator<Item = PlatformId>) -> Self {
        Self {
            success: true,
            error: None,
            contacts: ids.into_iter().map(BulkCreateEntry::created).collect(),
        }
    }

    /// A response that failed as a whole, with no per-record detail.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            contacts: Vec::new(),
        }
    }
}

/// A platform property definition derived from the mapping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property name.
    pub name: String,

    /// Property type, "text" unless the mapping declares otherwise.
    #[serde(rename = "type")]
    pub property_type: String,
}

impl PropertyDef {
    /// A property of the default "text" type.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: "text".to_string(),
        }
    }
}
