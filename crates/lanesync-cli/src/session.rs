//! Recorded board sessions.
//!
//! A session is a JSON document listing what happened to a board, in order:
//!
//! ```json
//! { "steps": [
//!     { "snapshot": { "lanes": { "status": "available", "items": [..] },
//!                     "cards": { "status": "loading" } } },
//!     { "move": { "card": "c2", "from": { "lane": "A", "rank": 1 },
//!                 "to": { "lane": "B", "rank": 0 } } },
//!     { "load_more": { "lane": "A" } },
//!     { "commit_gate": { "allowed": false } }
//! ] }
//! ```
//!
//! Snapshot records stay raw JSON here; they are mapped with the board config
//! at replay time.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use lanesync_core::MoveRequest;
use lanesync_types::LaneId;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// A refresh from the store. A missing source counts as still loading.
    Snapshot {
        #[serde(default)]
        lanes: Value,
        #[serde(default)]
        cards: Value,
    },
    Move(MoveRequest),
    LoadMore { lane: LaneId },
    /// Flip the store's "allowed now" answer for subsequent commits.
    CommitGate { allowed: bool },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Snapshot { .. } => write!(f, "snapshot"),
            Step::Move(m) => match &m.to {
                Some(to) => write!(
                    f,
                    "move {} {}@{} -> {}@{}",
                    m.card, m.from.lane, m.from.rank, to.lane, to.rank
                ),
                None => write!(f, "move {} {}@{} -> nowhere", m.card, m.from.lane, m.from.rank),
            },
            Step::LoadMore { lane } => write!(f, "load more {}", lane),
            Step::CommitGate { allowed } => write!(f, "commit gate {}", if *allowed { "open" } else { "closed" }),
        }
    }
}

impl Session {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid session JSON")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }
}
