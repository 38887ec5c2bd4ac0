use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;

/// The five tracked weekdays, in grid column order.
pub const WORKWEEK: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Months shown per calendar view; navigation moves in steps of this size.
pub const WINDOW_MONTHS: i32 = 3;

pub fn is_workday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All Monday-to-Friday dates of a month, ascending. Weekend days are not
/// represented anywhere in the grid model.
pub fn weekdays_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    while current.month() == month {
        if is_workday(current) {
            days.push(current);
        }
        current = current + Duration::days(1);
    }
    days
}

/// The month's weekdays grouped into rows of exactly five slots, Monday
/// first. Leading and trailing slots of partial weeks are `None` so every
/// row stays rectangular; a trailing partial week is kept as long as it
/// holds at least one date.
pub fn weeks_aligned(year: i32, month: u32) -> Vec<[Option<NaiveDate>; 5]> {
    let mut weeks = Vec::new();
    let mut row: [Option<NaiveDate>; 5] = [None; 5];
    let mut row_used = false;
    for date in weekdays_in_month(year, month) {
        let slot = date.weekday().num_days_from_monday() as usize;
        if row_used && slot == 0 {
            weeks.push(row);
            row = [None; 5];
        }
        row[slot] = Some(date);
        row_used = true;
    }
    if row_used {
        weeks.push(row);
    }
    weeks
}

/// One calendar month of a projected window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
}

impl MonthWindow {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    /// Display label, e.g. "March 2024".
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    pub fn shifted(&self, months: i32) -> Self {
        let total = self.year * 12 + self.month as i32 - 1 + months;
        Self {
            year: total.div_euclid(12),
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }
}

/// The three months ending at today's month shifted by `offset_months`,
/// oldest first. An offset of zero ends the window at the current month.
pub fn three_month_window(today: NaiveDate, offset_months: i32) -> [MonthWindow; 3] {
    let last = MonthWindow::containing(today).shifted(offset_months);
    [last.shifted(-2), last.shifted(-1), last]
}

/// Applies a navigation step to an offset. A step that would make the
/// window's final month start after the month containing `today` is
/// rejected and the offset is returned unchanged; browsing backwards is
/// unbounded.
pub fn try_advance(offset: i32, delta: i32, today: NaiveDate) -> i32 {
    let proposed = offset + delta;
    let current = MonthWindow::containing(today);
    if current.shifted(proposed).first_day() > current.first_day() {
        offset
    } else {
        proposed
    }
}

/// Every weekday from January 1 of today's year through today inclusive.
pub fn year_to_date_span(today: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap();
    while current <= today {
        if is_workday(current) {
            days.push(current);
        }
        current = current + Duration::days(1);
    }
    days
}
