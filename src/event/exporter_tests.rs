use std::fs;
use std::time::{Duration, SystemTime};

use serde_json::{Value, json};
use tempfile::TempDir;

use super::{EventOptions, FileExporter};
use crate::error::Error;
use crate::time::FixedClock;

fn exporter(dir: &TempDir) -> FileExporter {
    let clock = FixedClock(SystemTime::UNIX_EPOCH + Duration::from_millis(1_410_279_462_937));
    FileExporter::create(dir.path().join("events.json"))
        .unwrap()
        .with_clock(clock)
}

fn lines(dir: &TempDir) -> Vec<Value> {
    fs::read_to_string(dir.path().join("events.json"))
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn writes_one_event_per_line() {
    let dir = TempDir::new().unwrap();
    let mut exporter = exporter(&dir);

    exporter
        .set_user("u1", &EventOptions::new().with_property("age", 28))
        .unwrap();
    exporter
        .set_item("i1", &EventOptions::new().with_property("category", "books"))
        .unwrap();
    exporter
        .record_user_action_on_item("buy", "u1", "i1", &EventOptions::new())
        .unwrap();
    assert_eq!(exporter.events_written(), 3);
    exporter.close().unwrap();

    let events = lines(&dir);
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        json!({
            "event": "$set",
            "entityType": "user",
            "entityId": "u1",
            "properties": {"age": 28},
            "eventTime": "2014-09-09T16:17:42.937Z",
        })
    );
    assert_eq!(events[1]["entityType"], "item");
    assert_eq!(events[2]["targetEntityType"], "item");
    assert_eq!(events[2]["targetEntityId"], "i1");
}

#[test]
fn unset_validation_matches_client() {
    let dir = TempDir::new().unwrap();
    let mut exporter = exporter(&dir);

    let missing = exporter.unset_user("u1", &EventOptions::new());
    let empty = exporter.unset_item("i1", &EventOptions::new().with_properties(serde_json::Map::new()));

    assert!(matches!(missing, Err(Error::InvalidArgument(_))));
    assert!(matches!(empty, Err(Error::InvalidArgument(_))));
    assert_eq!(exporter.events_written(), 0);

    exporter
        .unset_user("u1", &EventOptions::new().with_property("age", Value::Null))
        .unwrap();
    exporter.close().unwrap();

    assert_eq!(lines(&dir)[0]["event"], "$unset");
}

#[test]
fn create_truncates_existing_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("events.json"), "stale\n").unwrap();

    let exporter = exporter(&dir);
    exporter.close().unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("events.json")).unwrap(), "");
}

#[test]
fn create_makes_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("out").join("events.json");

    let mut exporter = FileExporter::create(&path).unwrap();
    exporter
        .create_event("view", "user", "u1", &EventOptions::new())
        .unwrap();
    exporter.close().unwrap();

    assert_eq!(exporter_path_lines(&path), 1);
}

#[test]
fn create_fails_for_directory_path() {
    let dir = TempDir::new().unwrap();

    let result = FileExporter::create(dir.path());

    assert!(matches!(result, Err(Error::Io(_))));
}

fn exporter_path_lines(path: &std::path::Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}
