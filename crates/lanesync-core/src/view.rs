//! View types shared by the canonical, optimistic, and windowed stages.

use std::sync::Arc;

use indexmap::IndexMap;
use lanesync_types::{CardId, CardRecord, LaneId, LaneRecord};
use serde::Serialize;
use strum::Display;

use crate::window::WindowInfo;

/// A card at a dense position within its lane.
///
/// `record` is `None` for an optimistic placeholder whose record the store
/// has not returned yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardSlot {
    pub id: CardId,
    pub rank: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Arc<CardRecord>>,
}

impl CardSlot {
    pub fn new(id: CardId, rank: usize, record: Option<Arc<CardRecord>>) -> Self {
        Self { id, rank, record }
    }
}

/// A lane at its dense display position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneEntry {
    pub id: LaneId,
    pub rank: usize,
    pub record: Arc<LaneRecord>,
}

/// Cards per lane, keyed in lane display order.
pub type CardsByLane = IndexMap<LaneId, Vec<CardSlot>>;

/// Rewrite ranks to `0..len`.
pub fn renumber(cards: &mut [CardSlot]) {
    for (i, slot) in cards.iter_mut().enumerate() {
        slot.rank = i;
    }
}

/// Position of `card` within `lane`, if it is there.
pub fn rank_of(view: &CardsByLane, lane: &LaneId, card: &CardId) -> Option<usize> {
    view.get(lane)?.iter().position(|slot| &slot.id == card)
}

/// Remove `card` from every lane that holds it, renumbering those lanes.
///
/// Returns the first removed slot. Views produced by this crate hold a card at
/// most once; the sweep keeps a malformed view from duplicating it further.
pub fn take_card(view: &mut CardsByLane, card: &CardId) -> Option<CardSlot> {
    let mut taken = None;
    for cards in view.values_mut() {
        if let Some(pos) = cards.iter().position(|slot| &slot.id == card) {
            let slot = cards.remove(pos);
            renumber(cards);
            taken.get_or_insert(slot);
        }
    }
    taken
}

/// Readiness of the board as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BoardStatus {
    /// No snapshot with both sources available has arrived yet, or the latest
    /// one had an unavailable source.
    #[default]
    Loading,
    Ready,
}

/// One lane as presented: its visible cards plus window metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneView {
    pub id: LaneId,
    pub rank: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    pub label: String,
    pub cards: Vec<CardSlot>,
    pub window: WindowInfo,
}

/// The presentation-facing board: optimistic and windowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub status: BoardStatus,
    pub read_only: bool,
    pub lanes: Vec<LaneView>,
}

impl BoardView {
    pub fn lane(&self, id: &LaneId) -> Option<&LaneView> {
        self.lanes.iter().find(|l| &l.id == id)
    }
}
