use crate::calendar::{self, MonthWindow};
use crate::persistence::{PersistenceError, PersistenceResult};
use crate::status::AttendanceStatus;
use crate::store::{AttendanceStore, StoreError, ValidationError};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Days counted per status. Field order matches the report column order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub work_from_home: u32,
    pub in_office: u32,
    pub external_meeting: u32,
    pub leave: u32,
    pub not_marked: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::WorkFromHome => self.work_from_home += 1,
            AttendanceStatus::InOffice => self.in_office += 1,
            AttendanceStatus::ExternalMeeting => self.external_meeting += 1,
            AttendanceStatus::Leave => self.leave += 1,
            AttendanceStatus::NotMarked => self.not_marked += 1,
        }
    }

    pub fn get(&self, status: AttendanceStatus) -> u32 {
        match status {
            AttendanceStatus::WorkFromHome => self.work_from_home,
            AttendanceStatus::InOffice => self.in_office,
            AttendanceStatus::ExternalMeeting => self.external_meeting,
            AttendanceStatus::Leave => self.leave,
            AttendanceStatus::NotMarked => self.not_marked,
        }
    }

    fn as_row(&self) -> [String; 5] {
        AttendanceStatus::REPORT_COLUMNS.map(|status| self.get(status).to_string())
    }
}

/// Per-status day totals over every weekday from January 1 through `today`.
/// Depends only on the resolved state of each day, not on the order edits
/// were made in.
pub fn year_to_date_stats(
    store: &AttendanceStore,
    member: &str,
    today: NaiveDate,
) -> Result<StatusCounts, ValidationError> {
    if !store.roster().contains(member) {
        return Err(ValidationError::UnknownMember(member.to_string()));
    }
    Ok(counts_for_span(
        store,
        member,
        &calendar::year_to_date_span(today),
    ))
}

/// The team report: one section per month from January through today's
/// month, each with a day-number header and one letter-coded row per
/// member plus per-status totals, followed by a year-to-date table. Future
/// day cells are blank and excluded from every total. Always well formed,
/// even when nothing is recorded.
pub fn team_report_csv(store: &AttendanceStore, today: NaiveDate) -> PersistenceResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    for month in 1..=today.month() {
        let window = MonthWindow {
            year: today.year(),
            month,
        };
        let days = calendar::weekdays_in_month(window.year, window.month);

        writer.write_record(["Month", window.label().as_str()])?;

        let mut header = vec!["Name".to_string()];
        header.extend(days.iter().map(|date| date.day().to_string()));
        header.extend(column_labels());
        writer.write_record(&header)?;

        for member in store.roster().members() {
            let mut row = vec![member.clone()];
            let mut counts = StatusCounts::default();
            for &date in &days {
                if date > today {
                    row.push(String::new());
                } else {
                    let status = store.get(member, date);
                    counts.record(status);
                    row.push(status.letter().to_string());
                }
            }
            row.extend(counts.as_row());
            writer.write_record(&row)?;
        }
        writer.write_record([""])?;
    }

    writer.write_record(["Year To Date", today.year().to_string().as_str()])?;
    let mut header = vec!["Name".to_string()];
    header.extend(column_labels());
    writer.write_record(&header)?;

    let span = calendar::year_to_date_span(today);
    for member in store.roster().members() {
        let counts = counts_for_span(store, member, &span);
        let mut row = vec![member.clone()];
        row.extend(counts.as_row());
        writer.write_record(&row)?;
    }

    into_csv_text(writer)
}

/// A member's own export: `Date,Status` rows for every recorded day,
/// ascending, statuses spelled as display labels.
pub fn member_report_csv(store: &AttendanceStore, member: &str) -> Result<String, StoreError> {
    if !store.roster().contains(member) {
        return Err(ValidationError::UnknownMember(member.to_string()).into());
    }
    build_member_csv(store, member).map_err(StoreError::Persistence)
}

pub fn report_filename(today: NaiveDate) -> String {
    format!("team-attendance-report-{}.csv", today.format("%Y-%m-%d"))
}

pub fn member_report_filename(member: &str) -> String {
    format!("{}_Attendance_Report.csv", member.replace(' ', "_"))
}

fn build_member_csv(store: &AttendanceStore, member: &str) -> PersistenceResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Date", "Status"])?;
    if let Some(days) = store.map().get(member) {
        for (date, status) in days {
            writer.write_record([
                date.format("%Y-%m-%d").to_string().as_str(),
                status.label(),
            ])?;
        }
    }
    into_csv_text(writer)
}

fn counts_for_span(store: &AttendanceStore, member: &str, span: &[NaiveDate]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for &date in span {
        counts.record(store.get(member, date));
    }
    counts
}

fn column_labels() -> impl Iterator<Item = String> {
    AttendanceStatus::REPORT_COLUMNS
        .into_iter()
        .map(|status| status.label().to_string())
}

fn into_csv_text(writer: csv::Writer<Vec<u8>>) -> PersistenceResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|err| PersistenceError::Io(err.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|err| PersistenceError::InvalidData(format!("report is not valid utf-8: {err}")))
}
