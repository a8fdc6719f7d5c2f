//! Optimistic overlay: canonical view + pending intents.
//!
//! Two pure transformations produce the optimistic view:
//!
//! - [`merge`] rebuilds it from scratch whenever a snapshot arrives: start from
//!   the canonical lanes and replay every ledger entry in ledger order.
//! - [`apply_local_move`] advances it by one user move between snapshots.
//!
//! Both insert at the requested rank clamped to the destination's length and
//! renumber every lane they touch, so the dense-rank invariant holds on every
//! produced view.

use std::sync::Arc;

use lanesync_types::{CardId, CardRecord, LaneId};
use tracing::trace;

use crate::canonical::CanonicalView;
use crate::ledger::PendingLedger;
use crate::view::{CardSlot, CardsByLane, renumber, take_card};

/// Overlay every pending entry onto `canonical`.
///
/// Entries are replayed in ledger order (oldest intent first). An entry whose
/// lane is not on the board is skipped and the card stays wherever the
/// canonical view put it. With an empty ledger the result equals
/// `canonical.cards()`.
pub fn merge(canonical: &CanonicalView, ledger: &PendingLedger) -> CardsByLane {
    let mut out = canonical.cards().clone();

    for (card, pending) in ledger.iter() {
        if !out.contains_key(&pending.lane) {
            trace!("Skipping overlay for card {}: lane {} not on board", card, pending.lane);
            continue;
        }
        let record = take_card(&mut out, card)
            .and_then(|slot| slot.record)
            .or_else(|| canonical.record(card).cloned());
        insert_clamped(&mut out, &pending.lane, card.clone(), pending.rank, record);
    }

    out
}

/// A single move as the presentation layer reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMove<'a> {
    pub card: &'a CardId,
    pub from_lane: &'a LaneId,
    pub from_rank: usize,
    pub to_lane: &'a LaneId,
    pub to_rank: usize,
}

/// Apply one move to `view`, returning the new view and the rank the card
/// landed at.
///
/// The card is taken from `from_rank` when it sits there, otherwise from
/// wherever it is in `from_lane`. Returns `None` when either lane is missing or
/// the card is not in `from_lane`; `view` is never modified.
pub fn apply_local_move(view: &CardsByLane, mv: &LocalMove<'_>) -> Option<(CardsByLane, usize)> {
    if !view.contains_key(mv.to_lane) {
        return None;
    }
    let source = view.get(mv.from_lane)?;
    let pos = match source.get(mv.from_rank) {
        Some(slot) if &slot.id == mv.card => mv.from_rank,
        _ => source.iter().position(|slot| &slot.id == mv.card)?,
    };

    let mut next = view.clone();
    let slot = next.get_mut(mv.from_lane)?.remove(pos);
    if let Some(src) = next.get_mut(mv.from_lane) {
        renumber(src);
    }
    let landed = insert_clamped(&mut next, mv.to_lane, slot.id, mv.to_rank, slot.record);
    Some((next, landed))
}

/// Insert at `min(rank, len)` and renumber the lane. Returns the landed rank.
fn insert_clamped(
    view: &mut CardsByLane,
    lane: &LaneId,
    card: CardId,
    rank: usize,
    record: Option<Arc<CardRecord>>,
) -> usize {
    let Some(dest) = view.get_mut(lane) else {
        return 0;
    };
    let at = rank.min(dest.len());
    dest.insert(at, CardSlot::new(card, at, record));
    renumber(dest);
    at
}

// ============================================================================
// TESTS
// ============================================================================
