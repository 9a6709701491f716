//! Field value transformations.
//!
//! Transforms convert a raw value coming from the *other* system's
//! representation into the representation the target field expects (date
//! format normalization, string-to-integer coercion, and the like).
//!
//! Transforms are pure and total: a value a transform cannot convert is
//! returned unchanged, never rejected. A mapping list that pairs incompatible
//! transforms with its data is a configuration defect, not a runtime error
//! the engine recovers from.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::FieldValue;

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

/// Transformation to apply to a field value when writing the target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    /// Convert to lowercase.
    Lowercase,
    /// Convert to uppercase.
    Uppercase,
    /// Trim whitespace.
    Trim,
    /// Replace occurrences.
    Replace {
        /// Pattern to find.
        from: String,
        /// Replacement value.
        to: String,
    },
    /// Coerce a numeric string to an integer. Inverse: the plain copy of an
    /// integer back into a field that accepts numbers.
    ParseInteger,
    /// Parse a naive local timestamp and render it as RFC 3339 (UTC).
    DateToIso {
        /// Format of the incoming timestamp.
        #[serde(default = "default_date_format")]
        format: String,
    },
    /// Parse an RFC 3339 timestamp and render it as a naive local timestamp.
    /// Inverse of [`Transform::DateToIso`].
    IsoToDate {
        /// Format of the outgoing timestamp.
        #[serde(default = "default_date_format")]
        format: String,
    },
    /// Chain multiple transforms.
    Chain {
        /// Ordered list of transforms to apply.
        transforms: Vec<Transform>,
    },
}

impl Transform {
    /// Apply the transform to a value.
    ///
    /// Unconvertible inputs pass through unchanged so that a transform can
    /// never lose data or fail an otherwise valid mapping pass.
    pub fn apply(&self, value: FieldValue) -> FieldValue {
        match self {
            Transform::Lowercase => map_string(value, |s| s.to_lowercase()),
            Transform::Uppercase => map_string(value, |s| s.to_uppercase()),
            Transform::Trim => map_string(value, |s| s.trim().to_string()),
            Transform::Replace { from, to } => map_string(value, |s| s.replace(from, to)),
            Transform::ParseInteger => match value {
                FieldValue::String(s) => match s.trim().parse::<i64>() {
                    Ok(i) => FieldValue::Integer(i),
                    Err(_) => FieldValue::String(s),
                },
                other => other,
            },
            Transform::DateToIso { format } => match value {
                FieldValue::String(s) => match NaiveDateTime::parse_from_str(&s, format) {
                    Ok(naive) => {
                        FieldValue::String(naive.and_utc().to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
                    }
                    Err(_) => FieldValue::String(s),
                },
                other => other,
            },
            Transform::IsoToDate { format } => match value {
                FieldValue::String(s) => match DateTime::parse_from_rfc3339(&s) {
                    Ok(dt) => FieldValue::String(
                        dt.with_timezone(&Utc).format(format).to_string(),
                    ),
                    Err(_) => FieldValue::String(s),
                },
                other => other,
            },
            Transform::Chain { transforms } => transforms
                .iter()
                .fold(value, |current, t| t.apply(current)),
        }
    }

    /// Convenience constructor for the default-format date pair.
    pub fn date_to_iso() -> Self {
        Transform::DateToIso {
            format: default_date_format(),
        }
    }

    /// Convenience constructor for the default-format date pair.
    pub fn iso_to_date() -> Self {
        Transform::IsoToDate {
            format: default_date_format(),
        }
    }
}

fn map_string(value: FieldValue, f: impl FnOnce(&str) -> String) -> FieldValue {
    match value {
        FieldValue::String(s) => FieldValue::String(f(&s)),
        other => other,
    }
}
