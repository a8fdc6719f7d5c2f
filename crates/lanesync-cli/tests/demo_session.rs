//! Replays the checked-in demo session end to end.

use std::path::PathBuf;

use lanesync_cli::{OutputFormat, ScriptBackend, Session, replay};
use lanesync_core::{BoardConfig, BoardStatus};

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos").join(name)
}

#[test]
fn test_demo_session_replays() {
    let config = BoardConfig::load(demo("board.ron")).unwrap();
    let session = Session::load(demo("session.json")).unwrap();

    let mut out = Vec::new();
    let board = replay(&config, &session, ScriptBackend::default(), OutputFormat::Text, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    // Step 4 is a stale snapshot: the move must still show.
    let step4 = text.split("== 4: snapshot ==").nth(1).unwrap();
    let step4 = step4.split("== 5:").next().unwrap();
    assert!(step4.contains("Doing (doing) 2/2\n  0  104* Announce\n"));

    // Step 5 confirms it; step 7 is denied and rolled back.
    assert_eq!(board.status(), BoardStatus::Ready);
    assert_eq!(board.pending().count(), 0);
    assert_eq!(board.backend().commits.len(), 1);
    assert_eq!(board.backend().commits[0].lane_guid.as_deref(), Some("7f1d"));
    assert_eq!(board.backend().refreshes, 1);
}

#[test]
fn test_demo_session_read_only() {
    let config = BoardConfig::load(demo("board.ron")).unwrap();
    let session = Session::load(demo("session.json")).unwrap();

    let board = replay(
        &config,
        &session,
        ScriptBackend::new(true, false),
        OutputFormat::Json,
        &mut Vec::<u8>::new(),
    )
    .unwrap();

    assert!(board.is_read_only());
    assert!(board.backend().commits.is_empty());
}
