//! Field mappings between the platform schema and the external schema.
//!
//! A mapping list is the single source of truth for which fields are
//! meaningful. Translation is a projection: fields absent from the list are
//! dropped, deliberately, on every pass.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ConnectorError, ConnectorResult};
use crate::record::{ContactRecord, PLATFORM_ID_FIELD};
use crate::transform::Transform;
use crate::types::PropertyDef;

/// Which of the two schemas a record is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSide {
    /// The platform's contact schema.
    Platform,
    /// The external system's contact schema.
    External,
}

impl SchemaSide {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaSide::Platform => "platform",
            SchemaSide::External => "external",
        }
    }

    /// The opposite side.
    pub fn other(&self) -> SchemaSide {
        match self {
            SchemaSide::Platform => SchemaSide::External,
            SchemaSide::External => SchemaSide::Platform,
        }
    }
}

impl std::fmt::Display for SchemaSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One side of a field mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name in this schema.
    pub name: String,

    /// Declared property type, platform side only (defaults to "text" when
    /// deriving property definitions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    /// Transform applied when converting a raw value from the other system's
    /// representation into this field's representation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

impl FieldSpec {
    /// Create a field spec with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            transform: None,
        }
    }

    /// Set the declared property type.
    #[must_use]
    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// A bidirectional mapping between one platform field and one external field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapping {
    /// The platform side of the mapping.
    pub platform: FieldSpec,
    /// The external side of the mapping.
    pub external: FieldSpec,
}

impl FieldMapping {
    /// Create a plain mapping between two field names.
    pub fn pair(platform: impl Into<String>, external: impl Into<String>) -> Self {
        Self {
            platform: FieldSpec::named(platform),
            external: FieldSpec::named(external),
        }
    }

    fn side(&self, side: SchemaSide) -> &FieldSpec {
        match side {
            SchemaSide::Platform => &self.platform,
            SchemaSide::External => &self.external,
        }
    }
}

/// A validated mapping list, the pure bidirectional transform between the two
/// contact schemas.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    mappings: Vec<FieldMapping>,
    ext_id_key: String,
}

impl FieldMapper {
    /// Validate a mapping list and build a mapper from it.
    ///
    /// Invariants checked here: platform field names are unique, external
    /// field names are unique, and a mapping for the platform identity field
    /// (`"id"`) exists — its external name becomes the external identity key.
    pub fn new(mappings: Vec<FieldMapping>) -> ConnectorResult<Self> {
        if mappings.is_empty() {
            return Err(ConnectorError::invalid_mapping("mapping list is empty"));
        }

        let mut platform_names = HashSet::new();
        let mut external_names = HashSet::new();
        for mapping in &mappings {
            if !platform_names.insert(mapping.platform.name.as_str()) {
                return Err(ConnectorError::invalid_mapping(format!(
                    "duplicate platform field '{}'",
                    mapping.platform.name
                )));
            }
            if !external_names.insert(mapping.external.name.as_str()) {
                return Err(ConnectorError::invalid_mapping(format!(
                    "duplicate external field '{}'",
                    mapping.external.name
                )));
            }
        }

        let ext_id_key = mappings
            .iter()
            .find(|m| m.platform.name == PLATFORM_ID_FIELD)
            .map(|m| m.external.name.clone())
            .ok_or_else(|| {
                ConnectorError::invalid_mapping(format!(
                    "no mapping for platform identity field '{PLATFORM_ID_FIELD}'"
                ))
            })?;

        Ok(Self {
            mappings,
            ext_id_key,
        })
    }

    /// The external-schema field name that holds the external identity value.
    ///
    /// Callers use this to locate or overwrite the identity field
    /// independently of the rest of the mapping.
    pub fn ext_id_key(&self) -> &str {
        &self.ext_id_key
    }

    /// The mapping list.
    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }

    /// Translate a record into the target schema.
    ///
    /// For each mapping, the value at the source-side name is read; a
    /// transform declared on the *target* side is applied to the raw value,
    /// otherwise the value is copied unchanged. Source fields absent from the
    /// record are omitted from the result; record fields absent from the
    /// mapping list are dropped. This is a projection, not a merge.
    pub fn map_to(&self, record: &ContactRecord, target: SchemaSide) -> ContactRecord {
        let source = target.other();
        let mut result = ContactRecord::new();

        for mapping in &self.mappings {
            let source_spec = mapping.side(source);
            let target_spec = mapping.side(target);

            let Some(raw) = record.get(&source_spec.name) else {
                continue;
            };

            let value = match &target_spec.transform {
                Some(transform) => transform.apply(raw.clone()),
                None => raw.clone(),
            };

            result.set(target_spec.name.clone(), value);
        }

        result
    }

    /// Derive the platform property definitions to create at install time.
    ///
    /// One property per mapping, named and typed from the platform side
    /// (type defaults to "text"), excluding the identity field.
    pub fn platform_properties(&self) -> Vec<PropertyDef> {
        self.mappings
            .iter()
            .filter(|m| m.platform.name != PLATFORM_ID_FIELD)
            .map(|m| PropertyDef {
                name: m.platform.name.clone(),
                property_type: m
                    .platform
                    .field_type
                    .clone()
                    .unwrap_or_else(|| "text".to_string()),
            })
            .collect()
    }
}
