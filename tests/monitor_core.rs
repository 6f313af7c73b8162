use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jarsync::monitor::{DirectorySnapshot, MonitorCore};
use jarsync::types::MonitorState;

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

fn snapshot(files: &[(&str, u64)]) -> DirectorySnapshot {
    files
        .iter()
        .map(|(path, secs)| (PathBuf::from(path), at(*secs)))
        .collect()
}

#[test]
fn diff_is_a_pure_function_of_two_snapshots() {
    let before = snapshot(&[("/r/a", 1), ("/r/b", 1), ("/r/c", 1)]);
    let after = snapshot(&[("/r/a", 1), ("/r/b", 2), ("/r/d", 1)]);

    let changes = before.diff(&after);

    assert_eq!(changes.added.iter().collect::<Vec<_>>(), vec![&PathBuf::from("/r/d")]);
    assert_eq!(changes.removed.iter().collect::<Vec<_>>(), vec![&PathBuf::from("/r/c")]);
    assert_eq!(changes.modified.iter().collect::<Vec<_>>(), vec![&PathBuf::from("/r/b")]);

    let listed: Vec<String> = changes
        .iter()
        .map(|c| format!("{} {}", c.kind, c.path.display()))
        .collect();
    assert_eq!(listed, vec!["+ /r/d", "- /r/c", "~ /r/b"]);
}

#[test]
fn an_older_mtime_is_still_a_modification() {
    let before = snapshot(&[("/r/a", 10)]);
    let after = snapshot(&[("/r/a", 5)]);
    assert_eq!(before.diff(&after).modified.len(), 1);
}

#[test]
fn change_moves_core_to_rebuilding_until_finished() {
    let mut core = MonitorCore::new(snapshot(&[("/r/a", 1)]));
    assert_eq!(core.state(), MonitorState::Idle);

    let decision = core.observe(snapshot(&[("/r/a", 2)]));
    assert!(decision.rebuild);
    assert_eq!(core.state(), MonitorState::Rebuilding);
    assert_eq!(core.baseline(), &snapshot(&[("/r/a", 2)]));

    core.rebuild_finished(true);
    assert_eq!(core.state(), MonitorState::Idle);
    assert_eq!(core.stats().rebuilds, 1);
    assert_eq!(core.stats().failed_rebuilds, 0);
}

#[test]
fn no_change_stays_idle() {
    let mut core = MonitorCore::new(snapshot(&[("/r/a", 1)]));
    let decision = core.observe(snapshot(&[("/r/a", 1)]));
    assert!(!decision.rebuild);
    assert!(decision.changes.is_empty());
    assert_eq!(core.state(), MonitorState::Idle);
    assert_eq!(core.stats().cycles, 1);
}

#[test]
fn finishing_without_a_rebuild_is_ignored() {
    let mut core = MonitorCore::new(DirectorySnapshot::default());
    core.rebuild_finished(false);
    assert_eq!(core.stats().rebuilds, 0);
    assert_eq!(core.state(), MonitorState::Idle);
}

#[test]
fn stopped_is_terminal() {
    let mut core = MonitorCore::new(snapshot(&[("/r/a", 1)]));
    core.stop();

    let decision = core.observe(snapshot(&[("/r/a", 9), ("/r/b", 1)]));
    assert!(!decision.rebuild);
    assert_eq!(core.state(), MonitorState::Stopped);
    // The baseline is frozen once stopped.
    assert_eq!(core.baseline(), &snapshot(&[("/r/a", 1)]));
    assert_eq!(core.stats().cycles, 0);
}
