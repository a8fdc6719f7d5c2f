//! Typed identifiers for lanes and cards.
//!
//! Both wrap the external store's opaque identity as text. The store hands out
//! strings or numbers; either way the engine only compares them, so the text
//! form is canonical. Ordering is plain byte-wise string ordering, which is
//! what the ranking tie-break relies on.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A lane (group) identifier.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneId(String);

/// A card (item) identifier.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

// ── Shared behavior ─────────────────────────────────────────────────────────

macro_rules! impl_typed_id {
    ($T:ident, $name:literal) => {
        impl $T {
            /// Wrap an external identity.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identity as text.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the owned text form.
            pub fn into_string(self) -> String {
                self.0
            }

            /// Check if this is the empty identity.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl From<&str> for $T {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $T {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<$T> for String {
            fn from(id: $T) -> String {
                id.0
            }
        }

        impl Borrow<str> for $T {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $T {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $name, self.0)
            }
        }
    };
}

impl_typed_id!(LaneId, "LaneId");
impl_typed_id!(CardId, "CardId");

// ============================================================================
// Tests
// ============================================================================
