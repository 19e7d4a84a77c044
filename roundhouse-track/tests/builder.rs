// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use roundhouse_track::builder::setup_tracker;
use roundhouse_track::entity::toplevel;
use roundhouse_track::test_helpers::create_tracker;
use roundhouse_track::{ROOT, warn};
use serial_test::serial;

#[test]
fn silent_by_default() {
    let tracker = setup_tracker(false, log::Level::Info, "", None).unwrap();
    let top = toplevel(&tracker, "top");
    assert!(!tracker.is_entity_enabled(top.id, log::Level::Error));
}

#[test]
fn stdout_tracker_respects_level() {
    let tracker = setup_tracker(true, log::Level::Info, "", None).unwrap();
    let top = toplevel(&tracker, "top");
    assert!(tracker.is_entity_enabled(top.id, log::Level::Info));
    assert!(!tracker.is_entity_enabled(top.id, log::Level::Debug));
}

#[test]
fn filtered_tracker_demotes_unmatched_entities() {
    let tracker = setup_tracker(true, log::Level::Debug, ".*scheduler.*", None).unwrap();
    let top = toplevel(&tracker, "top");
    let scheduler = roundhouse_track::entity::Entity::new(&top, "scheduler");
    assert!(tracker.is_entity_enabled(scheduler.id, log::Level::Debug));
    assert!(!tracker.is_entity_enabled(top.id, log::Level::Warn));
    assert!(tracker.is_entity_enabled(top.id, log::Level::Error));
}

#[test]
fn bad_regex_is_an_error() {
    assert!(setup_tracker(true, log::Level::Info, "*nope", None).is_err());
}

#[test]
fn log_file_receives_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");

    let tracker = setup_tracker(false, log::Level::Info, "", Some(path.as_path())).unwrap();
    let top = toplevel(&tracker, "top");
    warn!(top ; "buffer slot {} reused", 2);
    tracker.shutdown();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(contents, "WARN  top: buffer slot 2 reused\n");
}

#[test]
#[serial]
fn test_tracker_level_from_env() {
    unsafe { std::env::set_var("ROUNDHOUSE_TEST_LOG", "trace") };
    let tracker = create_tracker(file!());
    assert!(tracker.is_entity_enabled(ROOT, log::Level::Trace));

    unsafe { std::env::remove_var("ROUNDHOUSE_TEST_LOG") };
    let tracker = create_tracker(file!());
    assert!(!tracker.is_entity_enabled(ROOT, log::Level::Trace));
    assert!(tracker.is_entity_enabled(ROOT, log::Level::Warn));
}
