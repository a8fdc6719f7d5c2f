//! Optimistic reordering engine for cards in lanes.
//!
//! The external store is the source of truth, but it answers late. This crate
//! keeps a board responsive in the meantime: a user's move shows up at once,
//! stays put across snapshots that haven't caught up yet, and quietly yields
//! to the store once a snapshot confirms it (or its lane disappears).
//!
//! # Pipeline
//!
//! ```text
//! snapshot ──► canonical::build ──► ledger.reconcile ──► overlay::merge ──► window ──► BoardView
//!                                         ▲                                  ▲
//! move_card ──► dispatch::validate ──► overlay::apply_local_move ──► ledger.record
//!                                         │                                  │
//!                                         └── backend.commit() ──────────────┘ ensure_visible
//! ```
//!
//! All state lives in one [`Board`]; the stages themselves are pure functions
//! over the views in [`view`].
//!
//! # Example
//!
//! ```
//! use lanesync_core::{Board, CommitRequest, EngineSettings, MoveBackend, MoveRequest};
//! use lanesync_types::{BoardSnapshot, CardRecord, LaneRecord};
//!
//! struct Store(Vec<CommitRequest>);
//!
//! impl MoveBackend for Store {
//!     fn can_move(&self, _card: &CardRecord) -> bool { true }
//!     fn commit(&mut self, request: CommitRequest) { self.0.push(request) }
//! }
//!
//! let mut board = Board::new(EngineSettings::default(), Store(Vec::new()));
//! board.apply_snapshot(&BoardSnapshot::available(
//!     vec![LaneRecord::new("todo", 0), LaneRecord::new("done", 1)],
//!     vec![CardRecord::new("c1", "todo", 0)],
//! ));
//!
//! let outcome = board.move_card(&MoveRequest::new("c1", "todo", 0, "done", 0));
//! assert!(outcome.is_applied());
//! assert_eq!(board.backend().0.len(), 1);
//! ```

pub mod board;
pub mod canonical;
pub mod config;
pub mod dispatch;
pub mod ingest;
pub mod ledger;
pub mod overlay;
pub mod permission;
pub mod rank;
pub mod view;
pub mod window;

pub use board::{Board, SnapshotResult, SnapshotSkip};
pub use canonical::CanonicalView;
pub use config::{BoardConfig, ConfigError, DeniedCommitPolicy, EngineSettings};
pub use dispatch::{
    CommitRequest, CommitStatus, MoveBackend, MoveOutcome, MoveRequest, Position, RejectReason,
};
pub use ingest::IngestError;
pub use ledger::{PendingLedger, PendingMove, ReconcileReport};
pub use permission::Permission;
pub use view::{BoardStatus, BoardView, CardSlot, CardsByLane, LaneView};
pub use window::{BatchSize, VisibilityWindow, WindowInfo};
