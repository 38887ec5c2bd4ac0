use crate::calendar;
use crate::status::AttendanceStatus;
use crate::store::{AttendanceStore, StoreError, ValidationError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Weekdays of the three-month window at `offset` that are on or before
/// `today`, ascending. These are the only dates a bulk edit may touch.
pub fn eligible_dates(offset: i32, today: NaiveDate) -> Vec<NaiveDate> {
    calendar::three_month_window(today, offset)
        .iter()
        .flat_map(|window| calendar::weekdays_in_month(window.year, window.month))
        .filter(|&date| date <= today)
        .collect()
}

/// An explicit set of chosen dates for one member. Duplicates collapse and
/// iteration is always ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkSelection {
    member: String,
    dates: BTreeSet<NaiveDate>,
}

impl BulkSelection {
    pub fn new<I>(member: impl Into<String>, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        Self {
            member: member.into(),
            dates: dates.into_iter().collect(),
        }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkEditResult {
    pub applied: usize,
}

/// Validates a selection against the eligible set and applies the status to
/// every chosen date in one store operation. An empty selection or any date
/// outside the window (future days included) rejects the whole edit.
pub fn apply(
    store: &mut AttendanceStore,
    selection: &BulkSelection,
    status: AttendanceStatus,
    offset: i32,
    today: NaiveDate,
) -> Result<BulkEditResult, StoreError> {
    if selection.is_empty() {
        return Err(ValidationError::EmptySelection.into());
    }
    let eligible: BTreeSet<NaiveDate> = eligible_dates(offset, today).into_iter().collect();
    for date in selection.dates() {
        if !eligible.contains(&date) {
            return Err(ValidationError::NotSelectable(date).into());
        }
    }
    let dates: Vec<NaiveDate> = selection.dates().collect();
    let applied = store.bulk_set(selection.member(), &dates, status)?;
    Ok(BulkEditResult { applied })
}
