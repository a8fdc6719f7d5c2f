//! Board configuration, loaded from RON.
//!
//! ```ron
//! (
//!     batch_size: Some(20),
//!     card_sort_key: "SortOrder",
//!     card_lane_ref: "Card_Lane",
//!     lane_sort_key: Some("Position"),
//!     lane_guid: "LaneGuid",
//!     on_denied_commit: Rollback,
//!     refresh_after_move: true,
//! )
//! ```
//!
//! The attribute names tell [`ingest`](crate::ingest) where to find each
//! field on a raw store record. The rest tunes the engine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use crate::window::BatchSize;

/// What to do when the commit gate refuses a move that was already applied
/// locally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum DeniedCommitPolicy {
    /// Undo the local move and restore the card's previous pending entry.
    #[default]
    Rollback,
    /// Leave the optimistic state; the store will never confirm it.
    Keep,
}

/// Engine tuning, independent of record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub batch_size: BatchSize,
    pub on_denied_commit: DeniedCommitPolicy,
    pub refresh_after_move: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            batch_size: BatchSize::Unbounded,
            on_denied_commit: DeniedCommitPolicy::default(),
            refresh_after_move: default_refresh_after_move(),
        }
    }
}

impl EngineSettings {
    pub fn with_batch_size(mut self, batch: impl Into<BatchSize>) -> Self {
        self.batch_size = batch.into();
        self
    }

    pub fn with_denied_commit(mut self, policy: DeniedCommitPolicy) -> Self {
        self.on_denied_commit = policy;
        self
    }

    pub fn with_refresh_after_move(mut self, refresh: bool) -> Self {
        self.refresh_after_move = refresh;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Cards revealed per lane per batch; `None` or `<= 0` shows all.
    #[serde(default)]
    pub batch_size: Option<i64>,

    /// Card attribute holding the raw sort value.
    #[serde(default)]
    pub card_sort_key: String,

    /// Card attribute holding the owning-lane reference.
    #[serde(default)]
    pub card_lane_ref: String,

    /// Lane attribute holding the raw sort value. Unset ⇒ lanes order by id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane_sort_key: Option<String>,

    /// Lane attribute holding the external key passed to commits.
    #[serde(default)]
    pub lane_guid: String,

    #[serde(default)]
    pub on_denied_commit: DeniedCommitPolicy,

    #[serde(default = "default_refresh_after_move")]
    pub refresh_after_move: bool,
}

fn default_refresh_after_move() -> bool {
    true
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            card_sort_key: String::new(),
            card_lane_ref: String::new(),
            lane_sort_key: None,
            lane_guid: String::new(),
            on_denied_commit: DeniedCommitPolicy::default(),
            refresh_after_move: default_refresh_after_move(),
        }
    }
}

/// Errors loading or validating a [`BoardConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Required attribute mappings are unset.
    #[error("configuration incomplete, missing: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },
}

impl BoardConfig {
    /// Parse and validate.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Check that every required attribute mapping is set. Reports all of
    /// them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("card_sort_key", &self.card_sort_key),
            ("card_lane_ref", &self.card_lane_ref),
            ("lane_guid", &self.lane_guid),
        ];
        let missing: Vec<&'static str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Incomplete { missing })
        }
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            batch_size: BatchSize::from(self.batch_size),
            on_denied_commit: self.on_denied_commit,
            refresh_after_move: self.refresh_after_move,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
