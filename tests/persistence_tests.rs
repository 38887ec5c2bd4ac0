use attendance_tool::persistence::{
    AttendanceBackend, AttendanceMap, JsonFileBackend, MemoryBackend, PushEvent,
    load_map_from_json, save_map_to_json, validate_snapshot,
};
use attendance_tool::{AttendanceStatus, AttendanceStore, Roster};
use chrono::NaiveDate;
use tempfile::{NamedTempFile, tempdir};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_map() -> AttendanceMap {
    let mut map = AttendanceMap::new();
    map.entry("Saurabh".to_string())
        .or_default()
        .insert(d(2024, 3, 15), AttendanceStatus::InOffice);
    map.entry("Saurabh".to_string())
        .or_default()
        .insert(d(2024, 3, 14), AttendanceStatus::WorkFromHome);
    map.entry("Dhruv".to_string())
        .or_default()
        .insert(d(2024, 3, 15), AttendanceStatus::Leave);
    map
}

#[test]
fn json_helpers_round_trip_the_map() {
    let file = NamedTempFile::new().unwrap();
    let map = sample_map();
    save_map_to_json(&map, file.path()).expect("save map");
    let loaded = load_map_from_json(file.path()).expect("load map");
    assert_eq!(loaded, map);
}

#[test]
fn json_document_uses_date_keys_and_kebab_case_statuses() {
    let file = NamedTempFile::new().unwrap();
    save_map_to_json(&sample_map(), file.path()).unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["Saurabh"]["2024-03-15"], "in-office");
    assert_eq!(value["Saurabh"]["2024-03-14"], "work-from-home");
    assert_eq!(value["Dhruv"]["2024-03-15"], "leave");
}

#[test]
fn file_backend_round_trips_through_the_store() {
    let file = NamedTempFile::new().unwrap();
    {
        let mut store = AttendanceStore::new(
            Roster::default(),
            JsonFileBackend::new(file.path().to_path_buf()),
        );
        store
            .set("Suraj", d(2024, 2, 14), AttendanceStatus::ExternalMeeting)
            .unwrap();
    }

    let mut reopened = AttendanceStore::new(
        Roster::default(),
        JsonFileBackend::new(file.path().to_path_buf()),
    );
    assert_eq!(reopened.hydrate().unwrap(), 1);
    assert_eq!(
        reopened.get("Suraj", d(2024, 2, 14)),
        AttendanceStatus::ExternalMeeting
    );
}

#[test]
fn missing_file_loads_as_nothing_stored() {
    let dir = tempdir().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("attendance.json"));
    assert!(backend.load().unwrap().is_none());
}

#[test]
fn file_backend_has_no_push_channel() {
    let dir = tempdir().unwrap();
    let backend = JsonFileBackend::new(dir.path().join("attendance.json"));
    assert!(backend.subscribe().is_none());
}

#[test]
fn memory_backend_delivers_pushed_snapshots() {
    let backend = MemoryBackend::new();
    let mut store = AttendanceStore::new(Roster::default(), backend.clone());
    let receiver = store.subscribe().expect("memory backend is push capable");

    backend.push_replace(sample_map());
    match receiver.recv().unwrap() {
        PushEvent::Replace(map) => store.apply_snapshot(map).unwrap(),
        PushEvent::Failed(message) => panic!("unexpected failure event: {message}"),
    }
    assert_eq!(store.get("Dhruv", d(2024, 3, 15)), AttendanceStatus::Leave);
    assert_eq!(store.record_count(), 3);
}

#[test]
fn memory_backend_reports_sync_failures() {
    let backend = MemoryBackend::new();
    let receiver = backend.subscribe().expect("push channel");
    backend.push_failure("socket closed");
    match receiver.recv().unwrap() {
        PushEvent::Failed(message) => assert_eq!(message, "socket closed"),
        PushEvent::Replace(_) => panic!("expected a failure event"),
    }
}

#[test]
fn validate_snapshot_accepts_roster_members_without_not_marked() {
    let roster = Roster::default();
    assert!(validate_snapshot(&roster, &sample_map()).is_ok());
    assert!(validate_snapshot(&roster, &AttendanceMap::new()).is_ok());
}
