//! Raw lane and card records, and the source envelopes they arrive in.
//!
//! These are the engine's view of the external store: an identity, a raw sort
//! value, (for cards) the owning-lane reference, and an opaque attribute map
//! carried through untouched as the record payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::ids::{CardId, LaneId};
use crate::lane_ref::LaneRef;
use crate::sort::SortValue;

/// A lane as fetched from the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    pub id: LaneId,
    #[serde(default)]
    pub sort: SortValue,
    /// External key handed to the commit action; distinct from `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl LaneRecord {
    pub fn new(id: impl Into<LaneId>, sort: impl Into<SortValue>) -> Self {
        Self {
            id: id.into(),
            sort: sort.into(),
            guid: None,
            attributes: Map::new(),
        }
    }

    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Display label: `title` or `name` attribute, else the identity.
    pub fn label(&self) -> String {
        label_from(&self.attributes).unwrap_or_else(|| self.id.to_string())
    }
}

/// A card as fetched from the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub id: CardId,
    #[serde(default)]
    pub sort: SortValue,
    /// Owning lane. `None` means the store gave no association at all.
    #[serde(default)]
    pub lane: Option<LaneRef>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl CardRecord {
    /// A card directly referencing its lane by identity.
    pub fn new(id: impl Into<CardId>, lane: impl Into<String>, sort: impl Into<SortValue>) -> Self {
        Self {
            id: id.into(),
            sort: sort.into(),
            lane: Some(LaneRef::direct(lane)),
            attributes: Map::new(),
        }
    }

    pub fn with_lane_ref(mut self, lane: Option<LaneRef>) -> Self {
        self.lane = lane;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Resolve the owning lane. See [`LaneRef::resolve`].
    pub fn lane_id(&self) -> Option<LaneId> {
        self.lane.as_ref().and_then(LaneRef::resolve)
    }

    /// Display label: `title` or `name` attribute, else the identity.
    pub fn label(&self) -> String {
        label_from(&self.attributes).unwrap_or_else(|| self.id.to_string())
    }
}

fn label_from(attributes: &Map<String, Value>) -> Option<String> {
    ["title", "name"]
        .iter()
        .find_map(|k| attributes.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/// Load state of an external source.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SourceStatus {
    #[default]
    #[strum(to_string = "unavailable", serialize = "loading")]
    #[serde(alias = "loading")]
    Unavailable,
    Available,
}

/// A list of records with its load state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source<T> {
    #[serde(default)]
    pub status: SourceStatus,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Source<T> {
    pub fn available(items: Vec<T>) -> Self {
        Self { status: SourceStatus::Available, items }
    }

    pub fn unavailable() -> Self {
        Self { status: SourceStatus::Unavailable, items: Vec::new() }
    }

    pub fn is_available(&self) -> bool {
        self.status == SourceStatus::Available
    }
}

impl<T> Default for Source<T> {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// One refresh of both sources.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub lanes: Source<LaneRecord>,
    #[serde(default)]
    pub cards: Source<CardRecord>,
}

impl BoardSnapshot {
    pub fn available(lanes: Vec<LaneRecord>, cards: Vec<CardRecord>) -> Self {
        Self {
            lanes: Source::available(lanes),
            cards: Source::available(cards),
        }
    }

    /// Both sources have data.
    pub fn is_ready(&self) -> bool {
        self.lanes.is_available() && self.cards.is_available()
    }
}
