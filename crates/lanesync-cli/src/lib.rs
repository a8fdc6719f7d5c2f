//! Session replay for the `lanesync` binary.
//!
//! Drives a [`Board`] through a recorded [`Session`] and writes the windowed
//! view after every step, so a reconciliation run can be inspected (or
//! diffed) without a UI.

pub mod backend;
pub mod render;
pub mod session;

use std::collections::HashSet;
use std::io::Write;

use anyhow::{Context, Result};
use lanesync_core::{Board, BoardConfig, BoardView, MoveOutcome, SnapshotResult, ingest};
use lanesync_types::{BoardSnapshot, CardId, Source};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub use backend::ScriptBackend;
pub use session::{Session, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per step.
    Json,
}

#[derive(Serialize)]
struct JsonStep<'a> {
    step: usize,
    action: String,
    view: &'a BoardView,
}

/// Replay `session` against a fresh board, writing the view after each step.
///
/// Returns the board so callers can inspect the final state.
pub fn replay(
    config: &BoardConfig,
    session: &Session,
    backend: ScriptBackend,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<Board<ScriptBackend>> {
    let mut board = Board::new(config.settings(), backend);

    for (i, step) in session.steps.iter().enumerate() {
        let n = i + 1;
        match step {
            Step::Snapshot { lanes, cards } => {
                let snapshot = ingest_snapshot(lanes, cards, config)
                    .with_context(|| format!("step {n}: bad snapshot"))?;
                match board.apply_snapshot(&snapshot) {
                    SnapshotResult::Applied { confirmed, abandoned, .. } => {
                        info!(step = n, confirmed = confirmed.len(), abandoned = abandoned.len(), "Snapshot")
                    }
                    SnapshotResult::Skipped { reason } => info!(step = n, ?reason, "Snapshot skipped"),
                }
            }
            Step::Move(request) => match board.move_card(request) {
                MoveOutcome::Rejected(reason) => warn!(step = n, %reason, "Move rejected"),
                MoveOutcome::Applied { lane, rank, commit } => {
                    info!(step = n, %lane, rank, %commit, "Move applied")
                }
            },
            Step::LoadMore { lane } => {
                if !board.load_more(lane) {
                    info!(step = n, %lane, "Nothing more to load");
                }
            }
            Step::CommitGate { allowed } => board.backend_mut().deny_commits = !allowed,
        }

        write_step(&board, n, step, format, out)?;
    }

    Ok(board)
}

fn ingest_snapshot(lanes: &Value, cards: &Value, config: &BoardConfig) -> Result<BoardSnapshot> {
    let lanes = match lanes {
        Value::Null => Source::unavailable(),
        raw => ingest::lanes_source(raw, config)?,
    };
    let cards = match cards {
        Value::Null => Source::unavailable(),
        raw => ingest::cards_source(raw, config)?,
    };
    Ok(BoardSnapshot { lanes, cards })
}

fn write_step(
    board: &Board<ScriptBackend>,
    n: usize,
    step: &Step,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let view = board.view();
    match format {
        OutputFormat::Text => {
            let pending: HashSet<&CardId> = board.pending().map(|(card, _)| card).collect();
            writeln!(out, "== {n}: {step} ==")?;
            write!(out, "{}", render::render(&view, &pending))?;
        }
        OutputFormat::Json => {
            let line = serde_json::to_string(&JsonStep { step: n, action: step.to_string(), view: &view })?;
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BoardConfig {
        BoardConfig::from_ron_str(
            r#"(
                batch_size: Some(2),
                card_sort_key: "SortOrder",
                card_lane_ref: "Card_Lane",
                lane_sort_key: Some("Position"),
                lane_guid: "LaneGuid",
            )"#,
        )
        .unwrap()
    }

    const SESSION: &str = r#"{ "steps": [
        { "snapshot": { "lanes": { "status": "available", "items": [] } } },
        { "snapshot": {
            "lanes": { "status": "available", "items": [
                { "id": "A", "Position": 0, "LaneGuid": "ga", "title": "Todo" },
                { "id": "B", "Position": 1, "LaneGuid": "gb", "title": "Done" } ] },
            "cards": { "status": "available", "items": [
                { "id": "c1", "SortOrder": 0, "Card_Lane": { "id": "A" } },
                { "id": "c2", "SortOrder": 1, "Card_Lane": { "id": "A" } },
                { "id": "c3", "SortOrder": 2, "Card_Lane": { "value": { "id": "A" } } } ] } } },
        { "move": { "card": "c3", "from": { "lane": "A", "rank": 2 }, "to": { "lane": "B", "rank": 0 } } },
        { "commit_gate": { "allowed": false } },
        { "move": { "card": "c1", "from": { "lane": "A", "rank": 0 }, "to": { "lane": "B", "rank": 1 } } },
        { "load_more": { "lane": "A" } }
    ] }"#;

    #[test]
    fn test_replay_text() {
        let session = Session::from_json_str(SESSION).unwrap();
        let mut out = Vec::new();
        let board = replay(&config(), &session, ScriptBackend::default(), OutputFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("== 1: snapshot ==\nboard: loading (read-only)\n"));
        assert!(text.contains("== 3: move c3 A@2 -> B@0 ==\nboard: ready\nTodo (A) 2/2\n"));
        assert!(text.contains("Done (B) 1/1\n  0  c3* c3\n"));

        // Commit for c3 went through; c1's was denied and rolled back.
        let commits = &board.backend().commits;
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].lane_guid.as_deref(), Some("gb"));
        assert_eq!(board.pending().count(), 1);
    }

    #[test]
    fn test_replay_json_lines() {
        let session = Session::from_json_str(SESSION).unwrap();
        let mut out = Vec::new();
        replay(&config(), &session, ScriptBackend::default(), OutputFormat::Json, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0]["view"]["status"], "loading");
        assert_eq!(lines[1]["view"]["status"], "ready");
        assert_eq!(lines[1]["view"]["lanes"][0]["window"]["hidden"], 1);
        assert_eq!(lines[2]["action"], "move c3 A@2 -> B@0");
    }

    #[test]
    fn test_bad_snapshot_names_step() {
        let session = Session::from_json_str(
            r#"{ "steps": [ { "snapshot": { "lanes": { "status": "available", "items": 3 } } } ] }"#,
        )
        .unwrap();
        let err = replay(&config(), &session, ScriptBackend::default(), OutputFormat::Text, &mut Vec::<u8>::new())
            .unwrap_err();
        assert!(err.to_string().contains("step 1"));
    }
}
