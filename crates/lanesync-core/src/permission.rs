//! Move permission as a tri-state.
//!
//! The gate is evaluated per record, so until the board has seen at least one
//! card there is nothing to ask it about. That state is `Unknown`, and it is
//! read-only: the board fails closed.

use lanesync_types::CardRecord;
use strum::Display;

use crate::dispatch::MoveBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    #[default]
    Unknown,
    Allowed,
    Denied,
}

impl Permission {
    /// Ask the backend about a probe card (the first card of the snapshot).
    pub fn probe<B: MoveBackend + ?Sized>(backend: &B, probe: Option<&CardRecord>) -> Self {
        match probe {
            None => Permission::Unknown,
            Some(card) if backend.can_move(card) => Permission::Allowed,
            Some(_) => Permission::Denied,
        }
    }

    pub fn is_read_only(&self) -> bool {
        *self != Permission::Allowed
    }
}
