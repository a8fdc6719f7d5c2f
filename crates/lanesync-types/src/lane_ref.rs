//! The owning-lane reference carried by a card record.
//!
//! Stores expose the card→lane association in several shapes: the associated
//! record itself (with an `id`), a wrapper whose `value` is that record, a
//! wrapper whose `value` is the bare key, or just the bare key. [`LaneRef`]
//! captures each shape as a variant and [`LaneRef::resolve`] walks them in a
//! fixed priority order: direct identity, wrapped value, bare scalar.

use serde::{Deserialize, Serialize};

use crate::ids::LaneId;

/// A scalar key as it appears on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefKey {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl RefKey {
    /// Canonical text form. Integral floats print without a fraction, so
    /// `3.0` and `3` name the same lane.
    pub fn to_key(&self) -> String {
        match self {
            RefKey::Text(s) => s.clone(),
            RefKey::Integer(n) => n.to_string(),
            RefKey::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            RefKey::Float(f) => f.to_string(),
        }
    }
}

impl From<&str> for RefKey {
    fn from(s: &str) -> Self {
        RefKey::Text(s.to_string())
    }
}

impl From<i64> for RefKey {
    fn from(n: i64) -> Self {
        RefKey::Integer(n)
    }
}

/// Contents of a wrapped reference's `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WrappedRef {
    Object { id: RefKey },
    Scalar(RefKey),
    Opaque(serde_json::Value),
}

/// Owning-lane reference, in every shape a store may produce.
///
/// Variant order matters for untagged deserialization: a record with a usable
/// `id` is `Direct` even when it also carries a `value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LaneRef {
    Direct { id: RefKey },
    Wrapped { value: WrappedRef },
    Scalar(RefKey),
    Opaque(serde_json::Value),
}

impl LaneRef {
    /// Reference by plain lane identity.
    pub fn direct(id: impl Into<String>) -> Self {
        LaneRef::Direct { id: RefKey::Text(id.into()) }
    }

    /// Resolve to a lane identity, or `None` when no shape yields one.
    pub fn resolve(&self) -> Option<LaneId> {
        match self {
            LaneRef::Direct { id } => Some(LaneId::new(id.to_key())),
            LaneRef::Wrapped { value: WrappedRef::Object { id } } => Some(LaneId::new(id.to_key())),
            LaneRef::Wrapped { value: WrappedRef::Scalar(key) } => Some(LaneId::new(key.to_key())),
            LaneRef::Wrapped { value: WrappedRef::Opaque(_) } => None,
            LaneRef::Scalar(key) => Some(LaneId::new(key.to_key())),
            LaneRef::Opaque(_) => None,
        }
    }
}

impl From<&LaneId> for LaneRef {
    fn from(id: &LaneId) -> Self {
        LaneRef::direct(id.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
