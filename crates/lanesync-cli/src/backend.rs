//! Scripted stand-in for the external store.

use lanesync_core::{CommitRequest, MoveBackend};
use lanesync_types::CardRecord;
use tracing::info;

/// Records commits instead of persisting them. The permission gate and the
/// "allowed now" check are plain switches a session can flip.
#[derive(Debug, Clone, Default)]
pub struct ScriptBackend {
    pub read_only: bool,
    pub deny_commits: bool,
    pub commits: Vec<CommitRequest>,
    pub refreshes: usize,
}

impl ScriptBackend {
    pub fn new(read_only: bool, deny_commits: bool) -> Self {
        Self { read_only, deny_commits, ..Self::default() }
    }
}

impl MoveBackend for ScriptBackend {
    fn can_move(&self, _card: &CardRecord) -> bool {
        !self.read_only
    }

    fn commit_allowed(&self, card: &CardRecord) -> bool {
        self.can_move(card) && !self.deny_commits
    }

    fn commit(&mut self, request: CommitRequest) {
        info!(
            card = %request.card,
            lane = %request.lane,
            lane_guid = request.lane_guid.as_deref().unwrap_or("-"),
            rank = %request.rank,
            "Commit requested"
        );
        self.commits.push(request);
    }

    fn request_refresh(&mut self) {
        self.refreshes += 1;
    }
}
