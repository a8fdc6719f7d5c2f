//! The single owned state container for one board.
//!
//! [`Board`] holds everything that survives between events: the last
//! canonical view, the pending ledger, the optimistic view, visibility state,
//! and the permission probe. Two entry points mutate it, and never at the same
//! time:
//!
//! - [`Board::apply_snapshot`]: re-derive canonical, reconcile, re-merge.
//! - [`Board::move_card`]: patch the optimistic view and record the intent.
//!
//! Everything the presentation layer reads goes through [`Board::view`].

use lanesync_types::{BoardSnapshot, CardId, DecimalKey, LaneId};
use tracing::{debug, info, warn};

use crate::canonical::CanonicalView;
use crate::config::{DeniedCommitPolicy, EngineSettings};
use crate::dispatch::{self, CommitRequest, CommitStatus, MoveBackend, MoveOutcome, MoveRequest, RejectReason};
use crate::ledger::{PendingLedger, PendingMove};
use crate::overlay::{LocalMove, apply_local_move, merge};
use crate::permission::Permission;
use crate::view::{self, BoardStatus, BoardView, CardsByLane, LaneView};
use crate::window::VisibilityWindow;

/// Result of [`Board::apply_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotResult {
    /// Canonical view re-derived and pending moves re-applied.
    Applied {
        lanes: usize,
        cards: usize,
        confirmed: Vec<CardId>,
        abandoned: Vec<CardId>,
    },
    /// Nothing re-derived (see reason). The board is `Loading`.
    Skipped { reason: SnapshotSkip },
}

/// Why a snapshot was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSkip {
    LanesUnavailable,
    CardsUnavailable,
}

/// Reconciliation state for one board.
///
/// # State Machine
///
/// ```text
/// +----------------+
/// |    Loading     | no snapshot yet, or the latest had a source unavailable
/// |  (moves: no)   | last derived views are kept
/// +-------+--------+
///         | apply_snapshot() with both sources available
///         v
/// +----------------+
/// |     Ready      | canonical + ledger -> optimistic -> window
/// |  (moves: yes)  |
/// +-------+--------+
///         | apply_snapshot() with a source unavailable
///         v
///      Loading
/// ```
#[derive(Debug)]
pub struct Board<B> {
    settings: EngineSettings,
    backend: B,
    status: BoardStatus,
    permission: Permission,
    canonical: CanonicalView,
    ledger: PendingLedger,
    /// Canonical with the ledger applied. Always has the same lane keys as
    /// `canonical`.
    optimistic: CardsByLane,
    window: VisibilityWindow,
    /// Bumped on every state change, for cheap change detection.
    version: u64,
}

impl<B: MoveBackend> Board<B> {
    pub fn new(settings: EngineSettings, backend: B) -> Self {
        Self {
            window: VisibilityWindow::new(settings.batch_size),
            settings,
            backend,
            status: BoardStatus::Loading,
            permission: Permission::Unknown,
            canonical: CanonicalView::default(),
            ledger: PendingLedger::new(),
            optimistic: CardsByLane::new(),
            version: 0,
        }
    }

    /// Feed a new external snapshot through the forward pipeline.
    ///
    /// Order is fixed: derive canonical, probe permission, sync windows,
    /// reconcile the ledger, then merge what is still pending.
    pub fn apply_snapshot(&mut self, snapshot: &BoardSnapshot) -> SnapshotResult {
        let skip = if !snapshot.lanes.is_available() {
            Some(SnapshotSkip::LanesUnavailable)
        } else if !snapshot.cards.is_available() {
            Some(SnapshotSkip::CardsUnavailable)
        } else {
            None
        };
        if let Some(reason) = skip {
            if self.status != BoardStatus::Loading {
                info!("Board waiting for sources: {:?}", reason);
                self.status = BoardStatus::Loading;
                self.version += 1;
            }
            return SnapshotResult::Skipped { reason };
        }

        let canonical = CanonicalView::build(&snapshot.lanes.items, &snapshot.cards.items);

        let permission = Permission::probe(&self.backend, snapshot.cards.items.first());
        if permission != self.permission {
            info!("Board permission {} -> {}", self.permission, permission);
            self.permission = permission;
        }

        self.window.sync_lanes(canonical.cards().keys());

        let report = self.ledger.reconcile(&canonical);
        self.optimistic = merge(&canonical, &self.ledger);
        self.canonical = canonical;
        self.status = BoardStatus::Ready;
        self.version += 1;

        info!(
            "Snapshot applied: {} lanes, {} cards, {} confirmed, {} abandoned, {} still pending",
            self.canonical.lane_count(),
            self.canonical.card_count(),
            report.confirmed.len(),
            report.abandoned.len(),
            self.ledger.len()
        );

        SnapshotResult::Applied {
            lanes: self.canonical.lane_count(),
            cards: self.canonical.card_count(),
            confirmed: report.confirmed,
            abandoned: report.abandoned,
        }
    }

    /// The single move entry point.
    ///
    /// A rejected move changes nothing. An applied move is visible in
    /// [`view`](Self::view) immediately, whatever the backend does with it.
    pub fn move_card(&mut self, request: &MoveRequest) -> MoveOutcome {
        let to = match dispatch::validate(request, self.status, self.permission, &self.canonical) {
            Ok(to) => to,
            Err(reason) => {
                debug!("Move of card {} rejected: {}", request.card, reason);
                return MoveOutcome::Rejected(reason);
            }
        };

        let local = LocalMove {
            card: &request.card,
            from_lane: &request.from.lane,
            from_rank: request.from.rank,
            to_lane: &to.lane,
            to_rank: to.rank,
        };
        let Some((next, landed)) = apply_local_move(&self.optimistic, &local) else {
            debug!("Move of card {} rejected: not in lane {}", request.card, request.from.lane);
            return MoveOutcome::Rejected(RejectReason::CardNotAtSource);
        };
        // Same lane, and the clamped destination is where the card already sits.
        if to.lane == request.from.lane
            && view::rank_of(&self.optimistic, &to.lane, &request.card) == Some(landed)
        {
            debug!("Move of card {} rejected: lands at its own position", request.card);
            return MoveOutcome::Rejected(RejectReason::NoOp);
        }

        let prior = std::mem::replace(&mut self.optimistic, next);
        let displaced = self.ledger.record(request.card.clone(), to.lane.clone(), landed);
        self.window.ensure_visible(&to.lane, landed);
        self.version += 1;

        info!(
            "Card {} moved {}@{} -> {}@{}",
            request.card, request.from.lane, request.from.rank, to.lane, landed
        );

        let commit = match self.canonical.record(&request.card).cloned() {
            None => {
                warn!("Card {} has no store record, commit skipped", request.card);
                CommitStatus::SkippedMissingRecord
            }
            Some(record) if !self.backend.commit_allowed(&record) => match self.settings.on_denied_commit {
                DeniedCommitPolicy::Rollback => {
                    self.optimistic = prior;
                    self.ledger.restore(&request.card, displaced);
                    info!("Commit denied for card {}, move rolled back", request.card);
                    CommitStatus::RolledBack
                }
                DeniedCommitPolicy::Keep => {
                    warn!("Commit denied for card {}, keeping optimistic position", request.card);
                    CommitStatus::SkippedDenied
                }
            },
            Some(_) => {
                let lane_guid = self.canonical.lane(&to.lane).and_then(|l| l.record.guid.clone());
                self.backend.commit(CommitRequest {
                    card: request.card.clone(),
                    lane: to.lane.clone(),
                    lane_guid,
                    rank: DecimalKey::integral(i64::try_from(landed).unwrap_or(i64::MAX)),
                });
                CommitStatus::Requested
            }
        };

        if commit != CommitStatus::RolledBack && self.settings.refresh_after_move {
            self.backend.request_refresh();
        }

        MoveOutcome::Applied { lane: to.lane.clone(), rank: landed, commit }
    }

    /// Reveal one more batch of `lane`. Returns whether the window grew.
    pub fn load_more(&mut self, lane: &LaneId) -> bool {
        let grew = self.window.load_more(lane);
        if grew {
            self.version += 1;
        }
        grew
    }

    /// The optimistic, windowed board in lane display order.
    pub fn view(&self) -> BoardView {
        let lanes = self
            .canonical
            .lanes()
            .iter()
            .map(|lane| {
                let cards = self.optimistic.get(&lane.id).map(Vec::as_slice).unwrap_or_default();
                let window = self.window.info(&lane.id, cards.len());
                LaneView {
                    id: lane.id.clone(),
                    rank: lane.rank,
                    guid: lane.record.guid.clone(),
                    label: lane.record.label(),
                    cards: cards[..window.visible_count].to_vec(),
                    window,
                }
            })
            .collect();

        BoardView { status: self.status, read_only: self.is_read_only(), lanes }
    }

    pub fn status(&self) -> BoardStatus {
        self.status
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn is_read_only(&self) -> bool {
        self.permission.is_read_only()
    }

    /// Pending entries in replay order.
    pub fn pending(&self) -> impl Iterator<Item = (&CardId, &PendingMove)> {
        self.ledger.iter()
    }

    pub fn canonical(&self) -> &CanonicalView {
        &self.canonical
    }

    /// Full optimistic view, before windowing.
    pub fn optimistic(&self) -> &CardsByLane {
        &self.optimistic
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

// ============================================================================
// TESTS
// ============================================================================
