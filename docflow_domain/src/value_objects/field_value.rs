// /////////////////////////////////////////////////////////////////////////////
// docflow
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Document payload value
//!
//! `FieldValue` is the tagged sum described in the design notes: a scalar
//! (`Null`/`String`/`Int`/`Float`/`Bool`/`Timestamp`) or an ordered sequence
//! of scalars. The tag is never exposed to callers of `Document`; typed
//! accessors on `Document` coerce or fail instead.

use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single scalar payload value — the element type of a multi-valued
/// field and the non-sequence variant of `FieldValue`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    pub fn as_string(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::String(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Timestamp(t) => Some(t.to_rfc3339()),
        }
    }
}

impl From<ScalarValue> for FieldValue {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Null => FieldValue::Null,
            ScalarValue::String(s) => FieldValue::String(s),
            ScalarValue::Int(i) => FieldValue::Int(i),
            ScalarValue::Float(f) => FieldValue::Float(f),
            ScalarValue::Bool(b) => FieldValue::Bool(b),
            ScalarValue::Timestamp(t) => FieldValue::Timestamp(t),
        }
    }
}

/// Document payload value: scalar, or an ordered sequence of scalars.
///
/// A field may be promoted from scalar to `Sequence` (via `add_to_field`)
/// but a `Sequence` is never demoted back to a scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Sequence(Vec<ScalarValue>),
}

impl FieldValue {
    /// Convert this value to its scalar-equivalent representation: a
    /// single scalar stays itself; a `Sequence` yields its first element
    /// (or `Null` if empty), matching `getString` semantics on a
    /// multi-valued field ("returns the first element").
    pub fn as_scalar(&self) -> ScalarValue {
        match self {
            Self::Null => ScalarValue::Null,
            Self::String(s) => ScalarValue::String(s.clone()),
            Self::Int(i) => ScalarValue::Int(*i),
            Self::Float(f) => ScalarValue::Float(*f),
            Self::Bool(b) => ScalarValue::Bool(*b),
            Self::Timestamp(t) => ScalarValue::Timestamp(*t),
            Self::Sequence(seq) => seq.first().cloned().unwrap_or(ScalarValue::Null),
        }
    }

    /// Coerce to a single string (`getString` semantics).
    pub fn as_string(&self) -> Option<String> {
        self.as_scalar().as_string()
    }

    /// Coerce to a list of strings (`getStringList` semantics): a scalar
    /// is wrapped in a one-element sequence, a sequence is mapped
    /// element-wise.
    pub fn as_string_list(&self) -> Vec<String> {
        match self {
            Self::Sequence(seq) => seq.iter().filter_map(ScalarValue::as_string).collect(),
            other => other.as_string().into_iter().collect(),
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Promote this value to a `Sequence`, retaining a prior scalar as
    /// element 0, and append `next`.
    pub fn promote_and_append(self, next: ScalarValue) -> Self {
        match self {
            Self::Sequence(mut seq) => {
                seq.push(next);
                Self::Sequence(seq)
            }
            scalar => Self::Sequence(vec![scalar.as_scalar(), next]),
        }
    }

    /// Append another `FieldValue`'s scalar(s) to this one, unpacking the
    /// other value if it is itself a sequence. Used by `set_or_add` and
    /// the cross-document splice variant.
    pub fn promote_and_append_all(self, other: &FieldValue) -> Self {
        let incoming: Vec<ScalarValue> = match other {
            Self::Sequence(seq) => seq.clone(),
            scalar => vec![scalar.as_scalar()],
        };
        let mut seq = match self {
            Self::Sequence(seq) => seq,
            scalar => vec![scalar.as_scalar()],
        };
        seq.extend(incoming);
        Self::Sequence(seq)
    }

    fn try_from_json_scalar(value: &serde_json::Value) -> Result<ScalarValue, PipelineError> {
        match value {
            serde_json::Value::Null => Ok(ScalarValue::Null),
            serde_json::Value::Bool(b) => Ok(ScalarValue::Bool(*b)),
            serde_json::Value::String(s) => Ok(ScalarValue::String(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ScalarValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ScalarValue::Float(f))
                } else {
                    Err(PipelineError::validation(format!("unsupported numeric value: {n}")))
                }
            }
            other => Err(PipelineError::validation(format!(
                "unsupported scalar field value: {other}"
            ))),
        }
    }

    pub fn from_json(value: serde_json::Value) -> Result<Self, PipelineError> {
        match value {
            serde_json::Value::Array(items) => {
                let scalars = items
                    .iter()
                    .map(Self::try_from_json_scalar)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Sequence(scalars))
            }
            scalar => Ok(Self::try_from_json_scalar(&scalar)?.into()),
        }
    }

    fn scalar_to_json(scalar: &ScalarValue) -> serde_json::Value {
        match scalar {
            ScalarValue::Null => serde_json::Value::Null,
            ScalarValue::String(s) => serde_json::Value::String(s.clone()),
            ScalarValue::Int(i) => serde_json::json!(i),
            ScalarValue::Float(f) => serde_json::json!(f),
            ScalarValue::Bool(b) => serde_json::Value::Bool(*b),
            ScalarValue::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Sequence(seq) => serde_json::Value::Array(seq.iter().map(Self::scalar_to_json).collect()),
            other => Self::scalar_to_json(&other.as_scalar()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldValueVisitor;

        impl<'de> Visitor<'de> for FieldValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a scalar or array document field value")
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let value: serde_json::Value = serde_json::Value::deserialize(de::value::MapAccessDeserializer::new(map))?;
                FieldValue::from_json(value).map_err(de::Error::custom)
            }

            fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let value: serde_json::Value = serde_json::Value::deserialize(de::value::SeqAccessDeserializer::new(seq))?;
                FieldValue::from_json(value).map_err(de::Error::custom)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::String(v.to_string()))
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Int(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Int(v as i64))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Float(v))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(FieldValue::Null)
            }
        }

        deserializer.deserialize_any(FieldValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotes_scalar_to_sequence_retaining_original_as_first_element() {
        let value = FieldValue::from("x").promote_and_append(ScalarValue::String("y".into()));
        assert_eq!(value.as_string_list(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn single_valued_string_list_has_one_element() {
        let value = FieldValue::from("solo");
        assert_eq!(value.as_string_list(), vec!["solo".to_string()]);
    }

    #[test]
    fn json_round_trip_preserves_sequence() {
        let value = FieldValue::Sequence(vec![ScalarValue::String("a".into()), ScalarValue::Int(1)]);
        let json = value.to_json();
        let parsed = FieldValue::from_json(json).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn rejects_non_scalar_array_elements() {
        let bad = serde_json::json!([{"nested": "object"}]);
        assert!(FieldValue::from_json(bad).is_err());
    }
}
