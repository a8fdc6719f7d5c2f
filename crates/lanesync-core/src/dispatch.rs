//! Move requests, their validation, and the collaborator contract.
//!
//! A move goes through these states:
//!
//! ```text
//!              validate
//! request ───────────────► Rejected (terminal, nothing changed)
//!    │
//!    ▼
//! AppliedLocally ── optimistic view patched, ledger entry recorded,
//!    │              window stretched to show the landed rank
//!    ▼
//! CommitRequested ── backend.commit() called (or skipped, see CommitStatus)
//!    │
//!    ▼ (a later snapshot)
//! Confirmed   store agrees: ledger entry removed
//! Superseded  a newer move for the same card replaced the entry
//! Abandoned   destination lane vanished: entry dropped silently
//! ```
//!
//! The engine never talks to the store directly. Everything it needs from the
//! outside is behind [`MoveBackend`].

use lanesync_types::{CardId, CardRecord, DecimalKey, LaneId};
use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::canonical::CanonicalView;
use crate::permission::Permission;
use crate::view::BoardStatus;

/// External side of a move: permission, persistence, and refresh.
pub trait MoveBackend {
    /// Permission gate: may `card` be moved at all? Drives the board's
    /// read-only flag (probed with the snapshot's first card).
    fn can_move(&self, card: &CardRecord) -> bool;

    /// "Allowed now" check, consulted immediately before [`commit`](Self::commit).
    fn commit_allowed(&self, card: &CardRecord) -> bool {
        self.can_move(card)
    }

    /// Persist the move. Fire-and-forget: the outcome is observed through a
    /// later snapshot, not through a return value.
    fn commit(&mut self, request: CommitRequest);

    /// Hint that the sources should refetch soon.
    fn request_refresh(&mut self) {}
}

impl<B: MoveBackend + ?Sized> MoveBackend for &mut B {
    fn can_move(&self, card: &CardRecord) -> bool {
        (**self).can_move(card)
    }

    fn commit_allowed(&self, card: &CardRecord) -> bool {
        (**self).commit_allowed(card)
    }

    fn commit(&mut self, request: CommitRequest) {
        (**self).commit(request)
    }

    fn request_refresh(&mut self) {
        (**self).request_refresh()
    }
}

/// What the backend is asked to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRequest {
    pub card: CardId,
    pub lane: LaneId,
    /// The destination lane's external key, if its record carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane_guid: Option<String>,
    /// Destination rank as the store's decimal sort value.
    pub rank: DecimalKey,
}

/// A lane position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub lane: LaneId,
    pub rank: usize,
}

impl Position {
    pub fn new(lane: impl Into<LaneId>, rank: usize) -> Self {
        Self { lane: lane.into(), rank }
    }
}

/// A user-initiated move. `to` is `None` when the drop landed nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub card: CardId,
    pub from: Position,
    #[serde(default)]
    pub to: Option<Position>,
}

impl MoveRequest {
    pub fn new(
        card: impl Into<CardId>,
        from_lane: impl Into<LaneId>,
        from_rank: usize,
        to_lane: impl Into<LaneId>,
        to_rank: usize,
    ) -> Self {
        Self {
            card: card.into(),
            from: Position::new(from_lane, from_rank),
            to: Some(Position::new(to_lane, to_rank)),
        }
    }
}

/// Why a move was rejected. Rejection never changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    /// The board has no usable snapshot.
    NotReady,
    /// Permission is unknown or denied.
    ReadOnly,
    /// Empty card identity.
    MissingCard,
    /// The drop had no destination.
    MissingDestination,
    /// Source or destination lane is not on the board.
    UnknownLane,
    /// Same lane, and the card would land where it already is.
    NoOp,
    /// The card is not in the source lane of the optimistic view.
    CardNotAtSource,
}

/// What happened to the commit of an applied move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CommitStatus {
    /// `commit` was called.
    Requested,
    /// The card has no store record yet (optimistic placeholder); nothing to
    /// commit against. Optimistic state stands.
    SkippedMissingRecord,
    /// Commit denied at invocation time; optimistic state left in place.
    SkippedDenied,
    /// Commit denied at invocation time; the local move was undone.
    RolledBack,
}

/// Result of [`Board::move_card`](crate::Board::move_card).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Rejected(RejectReason),
    Applied {
        lane: LaneId,
        /// Rank the card landed at (requested rank clamped to the lane).
        rank: usize,
        commit: CommitStatus,
    },
}

impl MoveOutcome {
    /// The move is reflected in the optimistic view.
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied { commit, .. } if *commit != CommitStatus::RolledBack)
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self {
            MoveOutcome::Rejected(reason) => Some(*reason),
            MoveOutcome::Applied { .. } => None,
        }
    }
}

/// Validate `request` against the current board, returning its destination.
///
/// Checks run cheapest-first; the first failure wins.
pub(crate) fn validate<'r>(
    request: &'r MoveRequest,
    status: BoardStatus,
    permission: Permission,
    canonical: &CanonicalView,
) -> Result<&'r Position, RejectReason> {
    if status != BoardStatus::Ready {
        return Err(RejectReason::NotReady);
    }
    if permission.is_read_only() {
        return Err(RejectReason::ReadOnly);
    }
    if request.card.is_empty() {
        return Err(RejectReason::MissingCard);
    }
    let Some(to) = request.to.as_ref() else {
        return Err(RejectReason::MissingDestination);
    };
    if !canonical.has_lane(&request.from.lane) || !canonical.has_lane(&to.lane) {
        return Err(RejectReason::UnknownLane);
    }
    if request.from == *to {
        return Err(RejectReason::NoOp);
    }
    Ok(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanesync_types::LaneRecord;

    fn board() -> CanonicalView {
        CanonicalView::build(
            &[LaneRecord::new("A", 0), LaneRecord::new("B", 1)],
            &[CardRecord::new("1", "A", 0)],
        )
    }

    fn check(request: &MoveRequest) -> Result<&Position, RejectReason> {
        validate(request, BoardStatus::Ready, Permission::Allowed, &board())
    }

    #[test]
    fn test_valid_move_returns_destination() {
        let req = MoveRequest::new("1", "A", 0, "B", 0);
        assert_eq!(check(&req), Ok(&Position::new("B", 0)));
    }

    #[test]
    fn test_rejections() {
        let canonical = board();
        let req = MoveRequest::new("1", "A", 0, "B", 0);
        assert_eq!(
            validate(&req, BoardStatus::Loading, Permission::Allowed, &canonical),
            Err(RejectReason::NotReady)
        );
        assert_eq!(
            validate(&req, BoardStatus::Ready, Permission::Unknown, &canonical),
            Err(RejectReason::ReadOnly)
        );
        assert_eq!(
            validate(&req, BoardStatus::Ready, Permission::Denied, &canonical),
            Err(RejectReason::ReadOnly)
        );

        assert_eq!(check(&MoveRequest::new("", "A", 0, "B", 0)), Err(RejectReason::MissingCard));
        let mut dropped = req.clone();
        dropped.to = None;
        assert_eq!(check(&dropped), Err(RejectReason::MissingDestination));
        assert_eq!(check(&MoveRequest::new("1", "Z", 0, "B", 0)), Err(RejectReason::UnknownLane));
        assert_eq!(check(&MoveRequest::new("1", "A", 0, "Z", 0)), Err(RejectReason::UnknownLane));
        assert_eq!(check(&MoveRequest::new("1", "A", 0, "A", 0)), Err(RejectReason::NoOp));
    }

    #[test]
    fn test_same_lane_different_rank_is_valid() {
        let req = MoveRequest::new("1", "A", 0, "A", 3);
        assert!(check(&req).is_ok());
    }

    #[test]
    fn test_outcome_helpers() {
        let applied = MoveOutcome::Applied { lane: "B".into(), rank: 0, commit: CommitStatus::Requested };
        assert!(applied.is_applied());
        let rolled = MoveOutcome::Applied { lane: "B".into(), rank: 0, commit: CommitStatus::RolledBack };
        assert!(!rolled.is_applied());
        let rejected = MoveOutcome::Rejected(RejectReason::NoOp);
        assert_eq!(rejected.reject_reason(), Some(RejectReason::NoOp));
        assert_eq!(RejectReason::CardNotAtSource.to_string(), "card_not_at_source");
    }
}
