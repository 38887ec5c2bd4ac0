#![cfg(feature = "sqlite")]

use attendance_tool::persistence::{AttendanceBackend, AttendanceMap};
use attendance_tool::{AttendanceStatus, AttendanceStore, Roster, SqliteAttendanceBackend};
use chrono::NaiveDate;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_map() -> AttendanceMap {
    let mut map = AttendanceMap::new();
    map.entry("Saurabh".to_string())
        .or_default()
        .insert(d(2024, 3, 14), AttendanceStatus::WorkFromHome);
    map.entry("Saurabh".to_string())
        .or_default()
        .insert(d(2024, 3, 15), AttendanceStatus::InOffice);
    map.entry("Raja".to_string())
        .or_default()
        .insert(d(2024, 3, 15), AttendanceStatus::Leave);
    map
}

#[test]
fn sqlite_backend_round_trips_the_map() {
    let file = NamedTempFile::new().unwrap();
    let backend = SqliteAttendanceBackend::new(file.path()).unwrap();

    let map = sample_map();
    backend.save(&map).expect("save map");
    let loaded = backend.load().expect("load map").expect("map exists");
    assert_eq!(loaded, map);
}

#[test]
fn empty_database_loads_as_nothing_stored() {
    let file = NamedTempFile::new().unwrap();
    let backend = SqliteAttendanceBackend::new(file.path()).unwrap();
    assert!(backend.load().unwrap().is_none());
}

#[test]
fn save_replaces_the_previous_snapshot() {
    let file = NamedTempFile::new().unwrap();
    let backend = SqliteAttendanceBackend::new(file.path()).unwrap();

    backend.save(&sample_map()).unwrap();

    let mut second = AttendanceMap::new();
    second
        .entry("Dhruv".to_string())
        .or_default()
        .insert(d(2024, 3, 11), AttendanceStatus::ExternalMeeting);
    backend.save(&second).unwrap();

    let loaded = backend.load().unwrap().unwrap();
    assert_eq!(loaded, second);
    assert!(loaded.get("Saurabh").is_none());
}

#[test]
fn snapshot_survives_reopening_the_database() {
    let file = NamedTempFile::new().unwrap();
    {
        let backend = SqliteAttendanceBackend::new(file.path()).unwrap();
        backend.save(&sample_map()).unwrap();
    }

    let reopened = SqliteAttendanceBackend::new(file.path()).unwrap();
    let loaded = reopened.load().unwrap().unwrap();
    assert_eq!(loaded, sample_map());
}

#[test]
fn store_hydrates_from_sqlite() {
    let file = NamedTempFile::new().unwrap();
    {
        let backend = SqliteAttendanceBackend::new(file.path()).unwrap();
        let mut store = AttendanceStore::new(Roster::default(), backend);
        store
            .set("Divyansh", d(2024, 1, 8), AttendanceStatus::WorkFromHome)
            .unwrap();
        store
            .set("Divyansh", d(2024, 1, 9), AttendanceStatus::InOffice)
            .unwrap();
    }

    let backend = SqliteAttendanceBackend::new(file.path()).unwrap();
    let mut store = AttendanceStore::new(Roster::default(), backend);
    assert_eq!(store.hydrate().unwrap(), 2);
    assert_eq!(
        store.get("Divyansh", d(2024, 1, 8)),
        AttendanceStatus::WorkFromHome
    );
    assert_eq!(
        store.get("Divyansh", d(2024, 1, 9)),
        AttendanceStatus::InOffice
    );
}
