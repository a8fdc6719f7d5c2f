//! Per-lane visibility windows (pagination).
//!
//! Each lane reveals a prefix of its cards: one batch to start, another batch
//! per "load more", and enough to show a card that was just dropped past the
//! edge. Revealed counts only grow while a lane exists; they are dropped when
//! the lane leaves the board.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use lanesync_types::LaneId;
use serde::Serialize;
use tracing::debug;

/// Configured batch size. Anything `<= 0` (or unset) means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchSize {
    #[default]
    Unbounded,
    Fixed(NonZeroUsize),
}

impl BatchSize {
    pub fn get(&self) -> Option<usize> {
        match self {
            BatchSize::Unbounded => None,
            BatchSize::Fixed(n) => Some(n.get()),
        }
    }
}

impl From<Option<i64>> for BatchSize {
    fn from(raw: Option<i64>) -> Self {
        raw.and_then(|n| usize::try_from(n).ok())
            .and_then(NonZeroUsize::new)
            .map_or(BatchSize::Unbounded, BatchSize::Fixed)
    }
}

/// Window metadata for one lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    pub total: usize,
    pub hidden: usize,
    pub visible_count: usize,
    pub batch_size: Option<usize>,
    pub can_load_more: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityWindow {
    batch: BatchSize,
    revealed: HashMap<LaneId, usize>,
}

impl VisibilityWindow {
    pub fn new(batch: BatchSize) -> Self {
        Self { batch, revealed: HashMap::new() }
    }

    pub fn batch(&self) -> BatchSize {
        self.batch
    }

    /// Match the tracked lanes to the board: new lanes start at one batch,
    /// vanished lanes are forgotten. No-op when unbounded.
    pub fn sync_lanes<'a>(&mut self, lanes: impl IntoIterator<Item = &'a LaneId>) {
        let BatchSize::Fixed(batch) = self.batch else {
            return;
        };
        let mut next = HashMap::new();
        for lane in lanes {
            let count = self.revealed.get(lane).copied().unwrap_or(batch.get());
            next.insert(lane.clone(), count);
        }
        self.revealed = next;
    }

    /// Revealed count for `lane`, `None` when unbounded or untracked.
    pub fn revealed(&self, lane: &LaneId) -> Option<usize> {
        self.revealed.get(lane).copied()
    }

    /// Window metadata for a lane holding `total` cards.
    pub fn info(&self, lane: &LaneId, total: usize) -> WindowInfo {
        let visible_count = match self.batch {
            BatchSize::Unbounded => total,
            BatchSize::Fixed(batch) => {
                let revealed = self.revealed(lane).unwrap_or(0).max(batch.get());
                revealed.min(total)
            }
        };
        let hidden = total - visible_count;
        WindowInfo {
            total,
            hidden,
            visible_count,
            batch_size: self.batch.get(),
            can_load_more: hidden > 0,
        }
    }

    /// Reveal one more batch of `lane`. Returns whether anything changed.
    pub fn load_more(&mut self, lane: &LaneId) -> bool {
        let BatchSize::Fixed(batch) = self.batch else {
            return false;
        };
        match self.revealed.get_mut(lane) {
            Some(count) => {
                *count += batch.get();
                debug!("Lane {} window grown to {}", lane, count);
                true
            }
            None => false,
        }
    }

    /// Make sure `rank` in `lane` is inside the window. Returns whether the
    /// window grew.
    pub fn ensure_visible(&mut self, lane: &LaneId, rank: usize) -> bool {
        let BatchSize::Fixed(batch) = self.batch else {
            return false;
        };
        let Some(count) = self.revealed.get_mut(lane) else {
            return false;
        };
        if rank < *count {
            return false;
        }
        *count = (*count + batch.get()).max(rank + 1);
        debug!("Lane {} window grown to {} to show rank {}", lane, count, rank);
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn window(batch: i64, lanes: &[&str]) -> VisibilityWindow {
        let mut w = VisibilityWindow::new(BatchSize::from(Some(batch)));
        let ids: Vec<LaneId> = lanes.iter().map(|l| LaneId::from(*l)).collect();
        w.sync_lanes(&ids);
        w
    }

    #[test]
    fn test_batch_size_parsing() {
        assert_eq!(BatchSize::from(None), BatchSize::Unbounded);
        assert_eq!(BatchSize::from(Some(0)), BatchSize::Unbounded);
        assert_eq!(BatchSize::from(Some(-3)), BatchSize::Unbounded);
        assert_eq!(BatchSize::from(Some(4)).get(), Some(4));
    }

    #[test]
    fn test_initial_window_and_load_more() {
        let mut w = window(3, &["A"]);
        let a = LaneId::from("A");

        let info = w.info(&a, 10);
        assert_eq!((info.visible_count, info.hidden, info.can_load_more), (3, 7, true));
        assert_eq!(info.batch_size, Some(3));

        assert!(w.load_more(&a));
        assert_eq!(w.info(&a, 10).visible_count, 6);
    }

    #[test]
    fn test_short_lane_shows_everything() {
        let w = window(5, &["A"]);
        let info = w.info(&LaneId::from("A"), 2);
        assert_eq!((info.visible_count, info.hidden, info.can_load_more), (2, 0, false));
    }

    #[test]
    fn test_unbounded_shows_everything_and_ignores_requests() {
        let mut w = window(0, &["A"]);
        let a = LaneId::from("A");
        assert!(!w.load_more(&a));
        assert!(!w.ensure_visible(&a, 50));
        let info = w.info(&a, 100);
        assert_eq!((info.visible_count, info.hidden), (100, 0));
        assert_eq!(info.batch_size, None);
    }

    #[test]
    fn test_ensure_visible_expands_past_target() {
        let mut w = window(3, &["A"]);
        let a = LaneId::from("A");
        assert!(!w.ensure_visible(&a, 2));
        assert!(w.ensure_visible(&a, 5));
        assert_eq!(w.revealed(&a), Some(6));
        assert!(w.ensure_visible(&a, 20));
        assert_eq!(w.revealed(&a), Some(21));
    }

    #[test]
    fn test_sync_keeps_existing_and_drops_vanished() {
        let mut w = window(2, &["A", "B"]);
        w.load_more(&LaneId::from("A"));
        w.sync_lanes(&[LaneId::from("A"), LaneId::from("C")]);

        assert_eq!(w.revealed(&LaneId::from("A")), Some(4));
        assert_eq!(w.revealed(&LaneId::from("B")), None);
        assert_eq!(w.revealed(&LaneId::from("C")), Some(2));
        assert!(!w.load_more(&LaneId::from("B")));
    }

    #[test]
    fn test_returning_lane_starts_over() {
        let mut w = window(2, &["A"]);
        let a = LaneId::from("A");
        w.load_more(&a);
        w.sync_lanes(&[]);
        w.sync_lanes(&[a.clone()]);
        assert_eq!(w.revealed(&a), Some(2));
    }

    #[test]
    fn test_revealed_never_decreases_across_load_more() {
        let mut w = window(4, &["A"]);
        let a = LaneId::from("A");
        let mut last = w.revealed(&a).unwrap();
        for _ in 0..10 {
            w.load_more(&a);
            let now = w.revealed(&a).unwrap();
            assert!(now >= last);
            last = now;
        }
    }
}
