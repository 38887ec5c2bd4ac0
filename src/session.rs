use crate::bulk::{self, BulkSelection};
use crate::calendar;
use crate::projection::{self, MonthGrid};
use crate::report::{self, StatusCounts};
use crate::status::AttendanceStatus;
use crate::store::{AttendanceStore, StoreError, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-process view state: each member's navigation offset and the pending
/// day of the two-step mark flow. Never persisted.
#[derive(Debug, Default)]
pub struct Session {
    offsets: HashMap<String, i32>,
    pending: Option<PendingSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub member: String,
    pub date: NaiveDate,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self, member: &str) -> i32 {
        self.offsets.get(member).copied().unwrap_or(0)
    }

    pub fn pending(&self) -> Option<&PendingSelection> {
        self.pending.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigateDirection {
    Back,
    Forward,
}

/// Everything a user can ask for, as data. The surfaces (HTTP, CLI) only
/// build intents and render outcomes; all behavior lives in `dispatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ShowCalendar { member: String },
    SelectDay { member: String, date: NaiveDate },
    ChooseStatus { status: AttendanceStatus },
    ClearDay { member: String, date: NaiveDate },
    Navigate { member: String, direction: NavigateDirection },
    OpenBulk { member: String },
    ApplyBulk { member: String, dates: Vec<NaiveDate>, status: AttendanceStatus },
    ShowHistory { member: String, month: Option<u32> },
    TeamToday,
    ShowStats { member: String },
    DownloadReport,
    DownloadMemberReport { member: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub member: String,
    pub offset: i32,
    pub months: Vec<MonthGrid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewRow {
    pub member: String,
    pub status: AttendanceStatus,
}

/// What an intent produced. Mutating outcomes carry `save_warning` when the
/// edit applied in memory but the eager save failed; the edit itself is not
/// reported as an error in that case.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Calendar(CalendarView),
    AwaitingStatus { member: String, date: NaiveDate },
    BulkPrompt { member: String, eligible: Vec<NaiveDate> },
    Updated { view: CalendarView, applied: usize, save_warning: Option<String> },
    History { member: String, entries: Vec<HistoryEntry> },
    Overview { rows: Vec<OverviewRow> },
    Stats { member: String, counts: StatusCounts },
    Report { filename: String, csv: String },
    NoReportData,
}

/// Runs one user intent against the store and session. `today` is read once
/// by the caller per user action and threaded through every decision here,
/// so the window, the future boundary, and the report span always agree.
pub fn dispatch(
    store: &mut AttendanceStore,
    session: &mut Session,
    intent: Intent,
    today: NaiveDate,
) -> Result<Outcome, StoreError> {
    match intent {
        Intent::ShowCalendar { member } => {
            calendar_view(store, session, &member, today).map(Outcome::Calendar)
        }
        Intent::SelectDay { member, date } => {
            require_member(store, &member)?;
            if date > today || !calendar::is_workday(date) {
                return Err(ValidationError::NotSelectable(date).into());
            }
            session.pending = Some(PendingSelection {
                member: member.clone(),
                date,
            });
            Ok(Outcome::AwaitingStatus { member, date })
        }
        Intent::ChooseStatus { status } => {
            let Some(PendingSelection { member, date }) = session.pending.take() else {
                return Err(ValidationError::NoPendingSelection.into());
            };
            let result = store.set(&member, date, status).map(|_| 1);
            let (applied, save_warning) = absorb_save_failure(result, 1)?;
            let view = calendar_view(store, session, &member, today)?;
            Ok(Outcome::Updated {
                view,
                applied,
                save_warning,
            })
        }
        Intent::ClearDay { member, date } => {
            let result = store.clear(&member, date).map(|_| 1);
            let (applied, save_warning) = absorb_save_failure(result, 1)?;
            let view = calendar_view(store, session, &member, today)?;
            Ok(Outcome::Updated {
                view,
                applied,
                save_warning,
            })
        }
        Intent::Navigate { member, direction } => {
            require_member(store, &member)?;
            let delta = match direction {
                NavigateDirection::Back => -calendar::WINDOW_MONTHS,
                NavigateDirection::Forward => calendar::WINDOW_MONTHS,
            };
            let next = calendar::try_advance(session.offset(&member), delta, today);
            session.offsets.insert(member.clone(), next);
            calendar_view(store, session, &member, today).map(Outcome::Calendar)
        }
        Intent::OpenBulk { member } => {
            require_member(store, &member)?;
            let eligible = bulk::eligible_dates(session.offset(&member), today);
            Ok(Outcome::BulkPrompt { member, eligible })
        }
        Intent::ApplyBulk {
            member,
            dates,
            status,
        } => {
            let selection = BulkSelection::new(member.clone(), dates);
            let fallback = selection.len();
            let offset = session.offset(&member);
            let result =
                bulk::apply(store, &selection, status, offset, today).map(|edit| edit.applied);
            let (applied, save_warning) = absorb_save_failure(result, fallback)?;
            let view = calendar_view(store, session, &member, today)?;
            Ok(Outcome::Updated {
                view,
                applied,
                save_warning,
            })
        }
        Intent::ShowHistory { member, month } => {
            let entries = store
                .member_history(&member, month)?
                .into_iter()
                .map(|(date, status)| HistoryEntry { date, status })
                .collect();
            Ok(Outcome::History { member, entries })
        }
        Intent::TeamToday => {
            let rows = store
                .today_overview(today)
                .into_iter()
                .map(|(member, status)| OverviewRow { member, status })
                .collect();
            Ok(Outcome::Overview { rows })
        }
        Intent::ShowStats { member } => {
            let counts = report::year_to_date_stats(store, &member, today)?;
            Ok(Outcome::Stats { member, counts })
        }
        Intent::DownloadReport => {
            if store.is_empty() {
                return Ok(Outcome::NoReportData);
            }
            let csv = report::team_report_csv(store, today).map_err(StoreError::Persistence)?;
            Ok(Outcome::Report {
                filename: report::report_filename(today),
                csv,
            })
        }
        Intent::DownloadMemberReport { member } => {
            require_member(store, &member)?;
            if store.map().get(&member).map_or(true, |days| days.is_empty()) {
                return Ok(Outcome::NoReportData);
            }
            let csv = report::member_report_csv(store, &member)?;
            Ok(Outcome::Report {
                filename: report::member_report_filename(&member),
                csv,
            })
        }
    }
}

fn require_member(store: &AttendanceStore, member: &str) -> Result<(), ValidationError> {
    if store.roster().contains(member) {
        Ok(())
    } else {
        Err(ValidationError::UnknownMember(member.to_string()))
    }
}

fn calendar_view(
    store: &AttendanceStore,
    session: &Session,
    member: &str,
    today: NaiveDate,
) -> Result<CalendarView, StoreError> {
    let offset = session.offset(member);
    let months = projection::project_member(store, member, offset, today)?;
    Ok(CalendarView {
        member: member.to_string(),
        offset,
        months,
    })
}

// Validation errors still fail the edit. A save failure downgrades to a
// warning: the in-memory update has already been applied by then.
fn absorb_save_failure(
    result: Result<usize, StoreError>,
    applied_on_failure: usize,
) -> Result<(usize, Option<String>), StoreError> {
    match result {
        Ok(applied) => Ok((applied, None)),
        Err(StoreError::Persistence(err)) => Ok((
            applied_on_failure,
            Some(format!("changes kept in memory but saving failed: {err}")),
        )),
        Err(err) => Err(err),
    }
}
