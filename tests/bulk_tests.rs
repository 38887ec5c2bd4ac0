use attendance_tool::bulk::{BulkSelection, apply, eligible_dates};
use attendance_tool::persistence::MemoryBackend;
use attendance_tool::{AttendanceStatus, AttendanceStore, Roster, StoreError, ValidationError};
use chrono::NaiveDate;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn store_with_backend() -> (AttendanceStore, MemoryBackend) {
    let backend = MemoryBackend::new();
    let store = AttendanceStore::new(Roster::default(), backend.clone());
    (store, backend)
}

#[test]
fn eligible_dates_cover_the_window_up_to_today() {
    let dates = eligible_dates(0, d(2024, 3, 15));
    assert_eq!(dates.len(), 55);
    assert_eq!(dates.first().copied().unwrap(), d(2024, 1, 1));
    assert_eq!(dates.last().copied().unwrap(), d(2024, 3, 15));
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn eligible_dates_for_past_windows_span_whole_months() {
    let dates = eligible_dates(-3, d(2024, 3, 15));
    assert_eq!(dates.len(), 65);
    // October 2023 starts on a Sunday
    assert_eq!(dates.first().copied().unwrap(), d(2023, 10, 2));
    assert_eq!(dates.last().copied().unwrap(), d(2023, 12, 29));
}

#[test]
fn selection_collapses_duplicates_and_sorts() {
    let selection = BulkSelection::new(
        "Saurabh",
        [d(2024, 3, 5), d(2024, 3, 4), d(2024, 3, 5)],
    );
    assert_eq!(selection.len(), 2);
    let dates: Vec<NaiveDate> = selection.dates().collect();
    assert_eq!(dates, vec![d(2024, 3, 4), d(2024, 3, 5)]);
}

#[test]
fn apply_marks_every_selected_date_with_one_save() {
    let (mut store, backend) = store_with_backend();
    let selection = BulkSelection::new("Saurabh", [d(2024, 3, 4), d(2024, 3, 5)]);

    let result = apply(
        &mut store,
        &selection,
        AttendanceStatus::WorkFromHome,
        0,
        d(2024, 3, 15),
    )
    .unwrap();

    assert_eq!(result.applied, 2);
    assert_eq!(backend.save_count(), 1);
    assert_eq!(
        store.get("Saurabh", d(2024, 3, 4)),
        AttendanceStatus::WorkFromHome
    );
    assert_eq!(
        store.get("Saurabh", d(2024, 3, 5)),
        AttendanceStatus::WorkFromHome
    );
}

#[test]
fn empty_selection_is_rejected_before_any_save() {
    let (mut store, backend) = store_with_backend();
    let selection = BulkSelection::new("Saurabh", []);

    let err = apply(
        &mut store,
        &selection,
        AttendanceStatus::Leave,
        0,
        d(2024, 3, 15),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::EmptySelection)
    ));
    assert_eq!(backend.save_count(), 0);
}

#[test]
fn future_dates_reject_the_whole_selection() {
    let (mut store, backend) = store_with_backend();
    let selection = BulkSelection::new("Saurabh", [d(2024, 3, 14), d(2024, 3, 18)]);

    let err = apply(
        &mut store,
        &selection,
        AttendanceStatus::InOffice,
        0,
        d(2024, 3, 15),
    )
    .unwrap_err();

    match err {
        StoreError::Validation(ValidationError::NotSelectable(date)) => {
            assert_eq!(date, d(2024, 3, 18));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.is_empty());
    assert_eq!(backend.save_count(), 0);
}

#[test]
fn dates_outside_the_window_are_not_selectable() {
    let (mut store, _) = store_with_backend();
    let selection = BulkSelection::new("Saurabh", [d(2023, 12, 29)]);

    let err = apply(
        &mut store,
        &selection,
        AttendanceStatus::InOffice,
        0,
        d(2024, 3, 15),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NotSelectable(_))
    ));
}

#[test]
fn weekends_are_never_eligible() {
    let (mut store, _) = store_with_backend();
    let selection = BulkSelection::new("Saurabh", [d(2024, 3, 16)]);

    let err = apply(
        &mut store,
        &selection,
        AttendanceStatus::InOffice,
        0,
        d(2024, 3, 15),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NotSelectable(_))
    ));
}

#[test]
fn navigated_windows_allow_their_own_past_dates() {
    let (mut store, _) = store_with_backend();
    let selection = BulkSelection::new("Divyansh", [d(2023, 10, 2)]);

    let result = apply(
        &mut store,
        &selection,
        AttendanceStatus::ExternalMeeting,
        -3,
        d(2024, 3, 15),
    )
    .unwrap();
    assert_eq!(result.applied, 1);
    assert_eq!(
        store.get("Divyansh", d(2023, 10, 2)),
        AttendanceStatus::ExternalMeeting
    );
}

#[test]
fn unknown_member_is_rejected() {
    let (mut store, _) = store_with_backend();
    let selection = BulkSelection::new("Nobody", [d(2024, 3, 14)]);

    let err = apply(
        &mut store,
        &selection,
        AttendanceStatus::InOffice,
        0,
        d(2024, 3, 15),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::UnknownMember(_))
    ));
}
