mod common;
use crate::common::archive::read_archive;
use crate::common::builders::TreeBuilder;
use crate::common::fake_rebuilder::FakeRebuilder;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tempfile::tempdir;

use jarsync::archive::{ArchiveOptions, Archiver, ExcludeSet};
use jarsync::fs::mock::MockFileSystem;
use jarsync::fs::RealFileSystem;
use jarsync::monitor::{ArchiveJob, CycleOutcome, Monitor, MonitorOptions};
use jarsync::types::MonitorState;

type TestResult = Result<(), Box<dyn Error>>;

const ROOT: &str = "/work/app";
const OUTPUT: &str = "/work/app.jar";

fn p(rel: &str) -> PathBuf {
    Path::new(ROOT).join(rel)
}

/// A mock tree with two files and a monitor over it.
fn setup(options: MonitorOptions) -> (MockFileSystem, FakeRebuilder, Monitor<FakeRebuilder>) {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file(p("a.txt"), "hello");
    fs.add_file(p("sub/b.txt"), "world");

    let rebuilder = FakeRebuilder::new();
    let monitor = Monitor::new(Arc::new(fs.clone()), ROOT, options, rebuilder.clone())
        .expect("baseline scan");
    (fs, rebuilder, monitor)
}

#[test]
fn baseline_covers_every_file() {
    let (_fs, _rebuilder, monitor) = setup(MonitorOptions::default());
    let baseline: Vec<&Path> = monitor.core().baseline().paths().collect();
    assert_eq!(baseline, vec![p("a.txt").as_path(), p("sub/b.txt").as_path()]);
    assert_eq!(monitor.state(), MonitorState::Idle);
}

#[test]
fn unchanged_tree_does_not_rebuild() {
    let (_fs, rebuilder, mut monitor) = setup(MonitorOptions::default());

    for _ in 0..3 {
        let report = monitor.poll_once();
        assert!(report.changes.is_empty());
        assert!(matches!(report.outcome, CycleOutcome::Unchanged));
    }

    assert_eq!(rebuilder.calls(), 0);
    assert_eq!(monitor.core().stats().cycles, 3);
}

#[test]
fn modified_file_triggers_exactly_one_rebuild() -> TestResult {
    let (fs, rebuilder, mut monitor) = setup(MonitorOptions::default());

    fs.add_file(p("a.txt"), "hello again");
    let report = monitor.poll_once();

    assert_eq!(report.changes.modified.iter().collect::<Vec<_>>(), vec![&p("a.txt")]);
    assert!(report.changes.added.is_empty());
    assert!(report.changes.removed.is_empty());
    assert!(matches!(report.outcome, CycleOutcome::Rebuilt(_)));
    assert_eq!(rebuilder.calls(), 1);

    // The new state is the baseline now; nothing further happens.
    assert!(matches!(monitor.poll_once().outcome, CycleOutcome::Unchanged));
    assert_eq!(rebuilder.calls(), 1);
    assert_eq!(monitor.state(), MonitorState::Idle);
    Ok(())
}

#[test]
fn delete_plus_add_is_one_removal_one_addition_one_rebuild() {
    let (fs, rebuilder, mut monitor) = setup(MonitorOptions::default());

    fs.remove(p("sub/b.txt"));
    fs.add_file(p("c.txt"), "new");
    let report = monitor.poll_once();

    assert_eq!(report.changes.removed.iter().collect::<Vec<_>>(), vec![&p("sub/b.txt")]);
    assert_eq!(report.changes.added.iter().collect::<Vec<_>>(), vec![&p("c.txt")]);
    assert!(report.changes.modified.is_empty());
    assert_eq!(report.changes.len(), 2);
    assert_eq!(rebuilder.calls(), 1);
}

#[test]
fn touch_without_content_change_still_rebuilds() -> TestResult {
    let (fs, rebuilder, mut monitor) = setup(MonitorOptions::default());

    fs.touch(p("a.txt"))?;
    let report = monitor.poll_once();

    assert_eq!(report.changes.modified.len(), 1);
    assert_eq!(rebuilder.calls(), 1);
    Ok(())
}

#[test]
fn rewrite_with_identical_mtime_goes_unnoticed() -> TestResult {
    let (fs, rebuilder, mut monitor) = setup(MonitorOptions::default());
    let before = monitor.core().baseline().get(&p("a.txt")).expect("tracked");

    fs.add_file(p("a.txt"), "different content");
    fs.set_modified(p("a.txt"), before)?;
    let report = monitor.poll_once();

    assert!(report.changes.is_empty());
    assert_eq!(rebuilder.calls(), 0);
    Ok(())
}

#[test]
fn failed_rebuild_still_replaces_the_baseline() {
    let (fs, rebuilder, mut monitor) = setup(MonitorOptions::default());
    rebuilder.set_failing(true);

    fs.add_file(p("a.txt"), "v2");
    let report = monitor.poll_once();
    assert!(matches!(report.outcome, CycleOutcome::RebuildFailed(ref msg) if msg.contains("disk full")));
    assert!(report.rebuild_attempted());
    assert_eq!(monitor.state(), MonitorState::Idle);

    // Same tree on the next tick: no automatic retry.
    rebuilder.set_failing(false);
    assert!(matches!(monitor.poll_once().outcome, CycleOutcome::Unchanged));
    assert_eq!(rebuilder.calls(), 1);

    let stats = monitor.core().stats();
    assert_eq!(stats.rebuilds, 1);
    assert_eq!(stats.failed_rebuilds, 1);

    // A later change is picked up normally.
    fs.add_file(p("a.txt"), "v3");
    assert!(matches!(monitor.poll_once().outcome, CycleOutcome::Rebuilt(_)));
    assert_eq!(rebuilder.calls(), 2);
}

#[test]
fn rewriting_the_archive_itself_is_not_a_change() {
    let options = MonitorOptions {
        excluded_output: Some(p("app.jar")),
        ..MonitorOptions::default()
    };
    let (fs, rebuilder, mut monitor) = setup(options);
    assert!(monitor.core().baseline().get(&p("app.jar")).is_none());

    fs.add_file(p("app.jar"), "zip bytes");
    fs.add_file(p("app.jar"), "newer zip bytes");
    let report = monitor.poll_once();

    assert!(report.changes.is_empty());
    assert_eq!(rebuilder.calls(), 0);
}

#[test]
fn excluded_patterns_never_trigger() -> TestResult {
    let options = MonitorOptions {
        exclude: ExcludeSet::new(&["**/*.swp"])?,
        ..MonitorOptions::default()
    };
    let (fs, rebuilder, mut monitor) = setup(options);

    fs.add_file(p("sub/.b.txt.swp"), "editor noise");
    assert!(monitor.poll_once().changes.is_empty());

    fs.add_file(p("sub/b.txt"), "real edit");
    assert_eq!(monitor.poll_once().changes.modified.len(), 1);
    assert_eq!(rebuilder.calls(), 1);
    Ok(())
}

#[test]
fn scan_failure_keeps_the_previous_baseline() {
    let (fs, rebuilder, mut monitor) = setup(MonitorOptions::default());

    fs.remove(ROOT);
    let report = monitor.poll_once();

    assert!(matches!(report.outcome, CycleOutcome::ScanFailed(_)));
    assert_eq!(monitor.core().baseline().len(), 2);
    assert_eq!(rebuilder.calls(), 0);
}

#[test]
fn emptied_directory_reports_every_removal() {
    let (fs, rebuilder, mut monitor) = setup(MonitorOptions::default());

    fs.remove(p("a.txt"));
    fs.remove(p("sub"));
    let report = monitor.poll_once();

    assert_eq!(report.changes.removed.len(), 2);
    assert_eq!(rebuilder.calls(), 1);
    assert!(monitor.core().baseline().is_empty());
}

#[test]
fn real_directory_change_updates_the_archive() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let src = TreeBuilder::new(tmp.path().join("app"))
        .file("a.txt", "hello")
        .file("sub/b.txt", "world")
        .build();
    let out = tmp.path().join("app.jar");

    let fs = Arc::new(RealFileSystem);
    let archiver = Archiver::new(fs.clone(), ArchiveOptions::default());
    let paths = archiver.validate(&src, &out)?;
    archiver.build(&paths.source, &paths.output)?;

    let options = MonitorOptions {
        interval: Duration::from_secs(1),
        exclude: ExcludeSet::default(),
        excluded_output: Some(paths.output.clone()),
    };
    let root = paths.source.clone();
    let mut monitor = Monitor::new(fs, root, options, ArchiveJob::new(archiver, paths))?;

    let edited = src.join("a.txt");
    fs::write(&edited, "hello, edited")?;
    // Push the mtime forward so the change is visible on coarse clocks.
    fs::File::options()
        .write(true)
        .open(&edited)?
        .set_modified(SystemTime::now() + Duration::from_secs(10))?;
    fs::write(src.join("sub/c.txt"), "added")?;

    let report = monitor.poll_once();
    assert_eq!(report.changes.modified.len(), 1);
    assert_eq!(report.changes.added.len(), 1);
    match report.outcome {
        CycleOutcome::Rebuilt(archive) => assert_eq!(archive.entries, 4),
        other => panic!("expected a rebuild, got {other:?}"),
    }

    let entries = read_archive(&out)?;
    assert_eq!(entries["a.txt"], b"hello, edited");
    assert_eq!(entries["sub/c.txt"], b"added");
    Ok(())
}

#[cfg(unix)]
#[test]
fn nested_archive_behind_a_symlink_never_enters_the_baseline() -> TestResult {
    init_tracing();
    let tmp = tempdir()?;
    let src = TreeBuilder::new(tmp.path().join("app")).file("a.txt", "hello").build();
    let link = tmp.path().join("link");
    std::os::unix::fs::symlink(&src, &link)?;

    let fs = Arc::new(RealFileSystem);
    let archiver = Archiver::new(
        fs.clone(),
        ArchiveOptions {
            allow_nested_output: true,
            ..ArchiveOptions::default()
        },
    );
    let paths = archiver.validate(&src, &link.join("app.jar"))?;
    archiver.build(&paths.source, &paths.output)?;

    let options = MonitorOptions {
        excluded_output: Some(paths.output.clone()),
        ..MonitorOptions::default()
    };
    let root = paths.source.clone();
    let mut monitor = Monitor::new(fs, root, options, ArchiveJob::new(archiver, paths))?;
    assert_eq!(monitor.core().baseline().len(), 1);

    fs::write(src.join("a.txt"), "hello, edited")?;
    fs::File::options()
        .write(true)
        .open(src.join("a.txt"))?
        .set_modified(SystemTime::now() + Duration::from_secs(10))?;

    let report = monitor.poll_once();
    assert!(matches!(report.outcome, CycleOutcome::Rebuilt(_)), "got {:?}", report.outcome);

    // The rewritten archive is not a change of its own.
    let report = monitor.poll_once();
    assert!(report.changes.is_empty());
    assert_eq!(read_archive(&src.join("app.jar"))?["a.txt"], b"hello, edited");
    Ok(())
}
