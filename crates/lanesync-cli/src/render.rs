//! Plain-text rendering of a [`BoardView`].
//!
//! ```text
//! board: ready
//! Todo (A) 3/5, 2 hidden
//!   0  c1  Buy milk
//!   1  c2* Write report
//!   2  c9? (not loaded)
//!   ... 2 more
//! ```
//!
//! `*` marks a card with an unconfirmed move, `?` a placeholder whose record
//! the store hasn't returned yet.

use std::collections::HashSet;

use lanesync_core::{BoardView, CardSlot, LaneView};
use lanesync_types::CardId;

pub fn render(view: &BoardView, pending: &HashSet<&CardId>) -> String {
    let mut out = format!("board: {}", view.status);
    if view.read_only {
        out.push_str(" (read-only)");
    }
    out.push('\n');

    for lane in &view.lanes {
        out.push_str(&lane_header(lane));
        out.push('\n');
        for slot in &lane.cards {
            out.push_str("  ");
            out.push_str(&card_line(slot, pending.contains(&slot.id)));
            out.push('\n');
        }
        if lane.window.can_load_more {
            out.push_str(&format!("  ... {} more\n", lane.window.hidden));
        }
    }
    out
}

fn lane_header(lane: &LaneView) -> String {
    let w = &lane.window;
    let header = format!("{} ({}) {}/{}", lane.label, lane.id, w.visible_count, w.total);
    if w.hidden > 0 {
        format!("{header}, {} hidden", w.hidden)
    } else {
        header
    }
}

fn card_line(slot: &CardSlot, pending: bool) -> String {
    let mark = match (&slot.record, pending) {
        (None, _) => "?",
        (Some(_), true) => "*",
        (Some(_), false) => " ",
    };
    let label = slot
        .record
        .as_ref()
        .map_or_else(|| "(not loaded)".to_string(), |r| r.label());
    format!("{:<2} {}{} {}", slot.rank, slot.id, mark, label)
}
