use crate::calendar::{self, MonthWindow};
use crate::status::AttendanceStatus;
use crate::store::{AttendanceStore, ValidationError};
use chrono::NaiveDate;
use serde::Serialize;

/// What a day cell displays. Future cells are non-interactive and are
/// produced without consulting the store at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "status", rename_all = "kebab-case")]
pub enum CellKind {
    Future,
    Resolved(AttendanceStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub kind: CellKind,
}

/// One month of the projected view: the window, its display label, and the
/// week-aligned grid of cells.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub window: MonthWindow,
    pub label: String,
    pub weeks: Vec<[Option<DayCell>; 5]>,
}

/// Projects a member's three-month calendar view. Pure with respect to its
/// inputs; `today` decides both the window position and the future boundary.
pub fn project_member(
    store: &AttendanceStore,
    member: &str,
    offset: i32,
    today: NaiveDate,
) -> Result<Vec<MonthGrid>, ValidationError> {
    if !store.roster().contains(member) {
        return Err(ValidationError::UnknownMember(member.to_string()));
    }
    let months = calendar::three_month_window(today, offset);
    Ok(months
        .iter()
        .map(|window| month_grid(store, member, *window, today))
        .collect())
}

fn month_grid(
    store: &AttendanceStore,
    member: &str,
    window: MonthWindow,
    today: NaiveDate,
) -> MonthGrid {
    let weeks = calendar::weeks_aligned(window.year, window.month)
        .into_iter()
        .map(|row| row.map(|slot| slot.map(|date| day_cell(store, member, date, today))))
        .collect();
    MonthGrid {
        window,
        label: window.label(),
        weeks,
    }
}

fn day_cell(store: &AttendanceStore, member: &str, date: NaiveDate, today: NaiveDate) -> DayCell {
    let kind = if date > today {
        CellKind::Future
    } else {
        CellKind::Resolved(store.get(member, date))
    };
    DayCell { date, kind }
}
