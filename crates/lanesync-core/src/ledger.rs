//! Pending move ledger.
//!
//! One entry per card with an unconfirmed local move: where the user put it.
//! Entries are kept in intent order. Recording a card again moves its entry to
//! the back, so the overlay always replays moves in the order the user made
//! them, latest last.
//!
//! An entry leaves the ledger in exactly two ways during [`PendingLedger::reconcile`]:
//! - confirmed: the canonical view has the card at the recorded lane and rank
//! - abandoned: the recorded lane is gone from the canonical view
//!
//! There is no expiry. An entry the store never honors stays until one of
//! the above happens or a newer move for the same card replaces it.

use indexmap::IndexMap;
use lanesync_types::{CardId, LaneId};
use serde::Serialize;
use tracing::{debug, info};

use crate::canonical::CanonicalView;

/// A recorded local intent: the card belongs at `rank` in `lane`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingMove {
    pub lane: LaneId,
    pub rank: usize,
}

/// Entry displaced by [`PendingLedger::record`], kept for rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displaced {
    index: usize,
    entry: PendingMove,
}

/// Outcome of reconciling the ledger against a canonical view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub confirmed: Vec<CardId>,
    pub abandoned: Vec<CardId>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty() && self.abandoned.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PendingLedger {
    entries: IndexMap<CardId, PendingMove>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the intent for `card`, superseding any earlier entry.
    ///
    /// Returns the superseded entry, if any, so a caller can undo the record.
    pub fn record(&mut self, card: CardId, lane: LaneId, rank: usize) -> Option<Displaced> {
        let displaced = self
            .entries
            .shift_remove_full(&card)
            .map(|(index, _, entry)| Displaced { index, entry });
        if let Some(old) = &displaced {
            debug!(
                "Pending move for card {} superseded ({}@{} -> {}@{})",
                card, old.entry.lane, old.entry.rank, lane, rank
            );
        }
        self.entries.insert(card, PendingMove { lane, rank });
        displaced
    }

    /// Undo a [`record`](Self::record): drop the current entry for `card` and
    /// put back whatever it displaced, at its original position.
    pub fn restore(&mut self, card: &CardId, displaced: Option<Displaced>) {
        self.entries.shift_remove(card);
        if let Some(Displaced { index, entry }) = displaced {
            let index = index.min(self.entries.len());
            self.entries.shift_insert(index, card.clone(), entry);
        }
    }

    /// Drop entries the canonical view confirms or can no longer honor.
    pub fn reconcile(&mut self, canonical: &CanonicalView) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        self.entries.retain(|card, pending| {
            if !canonical.has_lane(&pending.lane) {
                info!("Pending move for card {} abandoned: lane {} is gone", card, pending.lane);
                report.abandoned.push(card.clone());
                return false;
            }
            if canonical.rank_of(&pending.lane, card) == Some(pending.rank) {
                debug!("Pending move for card {} confirmed at {}@{}", card, pending.lane, pending.rank);
                report.confirmed.push(card.clone());
                return false;
            }
            true
        });
        report
    }

    pub fn get(&self, card: &CardId) -> Option<&PendingMove> {
        self.entries.get(card)
    }

    pub fn contains(&self, card: &CardId) -> bool {
        self.entries.contains_key(card)
    }

    /// Entries in replay order.
    pub fn iter(&self) -> impl Iterator<Item = (&CardId, &PendingMove)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lanesync_types::{CardRecord, LaneRecord};

    fn canonical(lanes: &[&str], cards: &[(&str, &str, i64)]) -> CanonicalView {
        let lanes: Vec<LaneRecord> =
            lanes.iter().enumerate().map(|(i, id)| LaneRecord::new(*id, i as i64)).collect();
        let cards: Vec<CardRecord> =
            cards.iter().map(|(id, lane, sort)| CardRecord::new(*id, *lane, *sort)).collect();
        CanonicalView::build(&lanes, &cards)
    }

    fn order(ledger: &PendingLedger) -> Vec<&str> {
        ledger.iter().map(|(c, _)| c.as_str()).collect()
    }

    #[test]
    fn test_record_upserts_and_moves_to_back() {
        let mut ledger = PendingLedger::new();
        assert!(ledger.record("a".into(), "L".into(), 0).is_none());
        ledger.record("b".into(), "L".into(), 1);
        let displaced = ledger.record("a".into(), "M".into(), 2);

        assert_eq!(ledger.len(), 2);
        assert_eq!(order(&ledger), vec!["b", "a"]);
        assert_eq!(ledger.get(&"a".into()), Some(&PendingMove { lane: "M".into(), rank: 2 }));
        assert_eq!(displaced.map(|d| d.entry.rank), Some(0));
    }

    #[test]
    fn test_restore_puts_displaced_back_in_place() {
        let mut ledger = PendingLedger::new();
        ledger.record("a".into(), "L".into(), 0);
        ledger.record("b".into(), "L".into(), 1);
        let displaced = ledger.record("a".into(), "M".into(), 5);
        ledger.restore(&"a".into(), displaced);

        assert_eq!(order(&ledger), vec!["a", "b"]);
        assert_eq!(ledger.get(&"a".into()).map(|p| p.rank), Some(0));

        let fresh = ledger.record("c".into(), "L".into(), 0);
        ledger.restore(&"c".into(), fresh);
        assert!(!ledger.contains(&"c".into()));
    }

    #[test]
    fn test_reconcile_confirms_exact_match_only() {
        let mut ledger = PendingLedger::new();
        ledger.record("2".into(), "B".into(), 0);
        ledger.record("3".into(), "A".into(), 0);

        let view = canonical(&["A", "B"], &[("1", "A", 0), ("3", "A", 1), ("2", "B", 0)]);
        let report = ledger.reconcile(&view);

        assert_eq!(report.confirmed, vec![CardId::from("2")]);
        assert!(report.abandoned.is_empty());
        // "3" is in lane A but at rank 1, not the recorded 0.
        assert!(ledger.contains(&"3".into()));
    }

    #[test]
    fn test_reconcile_abandons_vanished_lane() {
        let mut ledger = PendingLedger::new();
        ledger.record("2".into(), "B".into(), 0);

        let view = canonical(&["A"], &[("1", "A", 0), ("2", "A", 1)]);
        let report = ledger.reconcile(&view);

        assert_eq!(report.abandoned, vec![CardId::from("2")]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_unconfirmed_entry_survives_many_snapshots() {
        let mut ledger = PendingLedger::new();
        ledger.record("1".into(), "B".into(), 0);
        for _ in 0..5 {
            let view = canonical(&["A", "B"], &[("1", "A", 0)]);
            assert!(ledger.reconcile(&view).is_empty());
        }
        assert_eq!(ledger.len(), 1);
    }
}
