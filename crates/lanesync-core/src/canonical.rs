//! Canonical (store-truth) view derivation.
//!
//! [`CanonicalView::build`] is a pure re-derivation from one snapshot: rank the
//! lanes, give every lane an (initially empty) bucket so empty lanes still
//! render, drop cards whose owning lane can't be resolved or isn't on the
//! board, then rank each bucket. No state survives between calls.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lanesync_types::{CardId, CardRecord, LaneId, LaneRecord};
use tracing::{debug, trace, warn};

use crate::rank::normalize;
use crate::view::{CardSlot, CardsByLane, LaneEntry, rank_of};

/// Store-truth ordering derived from one snapshot. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CanonicalView {
    lanes: Vec<LaneEntry>,
    cards: CardsByLane,
    /// Every card record in the snapshot, including ones dropped from lanes.
    records: HashMap<CardId, Arc<CardRecord>>,
}

impl CanonicalView {
    /// Derive the canonical view from raw lane and card records.
    pub fn build(lanes: &[LaneRecord], cards: &[CardRecord]) -> Self {
        let mut seen_lanes = HashSet::new();
        let lane_records: Vec<&LaneRecord> = lanes
            .iter()
            .filter(|lane| {
                let fresh = seen_lanes.insert(&lane.id);
                if !fresh {
                    warn!("Duplicate lane {} in snapshot, keeping first occurrence", lane.id);
                }
                fresh
            })
            .collect();

        let lanes: Vec<LaneEntry> = normalize(
            lane_records
                .into_iter()
                .map(|lane| (lane.id.clone(), &lane.sort, Arc::new(lane.clone()))),
        )
        .into_iter()
        .map(|r| LaneEntry { id: r.id, rank: r.rank, record: r.payload })
        .collect();

        let mut buckets: Vec<Vec<(CardId, &CardRecord)>> = vec![Vec::new(); lanes.len()];
        let lane_index: HashMap<&LaneId, usize> =
            lanes.iter().enumerate().map(|(i, l)| (&l.id, i)).collect();

        let mut records = HashMap::with_capacity(cards.len());
        let mut dropped = 0usize;
        for card in cards {
            if records.contains_key(&card.id) {
                warn!("Duplicate card {} in snapshot, keeping first occurrence", card.id);
                continue;
            }
            records.insert(card.id.clone(), Arc::new(card.clone()));

            let Some(lane_id) = card.lane_id() else {
                debug!("Card {} has no resolvable lane reference, dropping", card.id);
                dropped += 1;
                continue;
            };
            let Some(&idx) = lane_index.get(&lane_id) else {
                trace!("Card {} references unknown lane {}, dropping", card.id, lane_id);
                dropped += 1;
                continue;
            };
            buckets[idx].push((card.id.clone(), card));
        }

        let mut by_lane = CardsByLane::with_capacity(lanes.len());
        for (lane, bucket) in lanes.iter().zip(buckets) {
            let slots = normalize(bucket.into_iter().map(|(id, card)| (id, &card.sort, ())))
                .into_iter()
                .map(|r| {
                    let record = records.get(&r.id).cloned();
                    CardSlot::new(r.id, r.rank, record)
                })
                .collect();
            by_lane.insert(lane.id.clone(), slots);
        }

        trace!(
            "Canonical view: {} lanes, {} cards placed, {} dropped",
            lanes.len(),
            records.len() - dropped,
            dropped
        );

        Self { lanes, cards: by_lane, records }
    }

    /// Lanes in display order.
    pub fn lanes(&self) -> &[LaneEntry] {
        &self.lanes
    }

    pub fn lane(&self, id: &LaneId) -> Option<&LaneEntry> {
        self.cards.get_index_of(id).and_then(|i| self.lanes.get(i))
    }

    /// Whether `id` is a lane of this snapshot.
    pub fn has_lane(&self, id: &LaneId) -> bool {
        self.cards.contains_key(id)
    }

    /// Cards per lane; every lane is a key, even when empty.
    pub fn cards(&self) -> &CardsByLane {
        &self.cards
    }

    /// The snapshot's record for `card`, whether or not it was placed in a lane.
    pub fn record(&self, card: &CardId) -> Option<&Arc<CardRecord>> {
        self.records.get(card)
    }

    /// Dense rank of `card` within `lane`.
    pub fn rank_of(&self, lane: &LaneId, card: &CardId) -> Option<usize> {
        rank_of(&self.cards, lane, card)
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Number of cards placed in lanes.
    pub fn card_count(&self) -> usize {
        self.cards.values().map(Vec::len).sum()
    }
}

// ============================================================================
// TESTS
// ============================================================================
