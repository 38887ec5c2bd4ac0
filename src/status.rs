use serde::{Deserialize, Serialize};
use std::fmt;

/// A member's attendance for one workday. `NotMarked` is the resolved value
/// for days without a stored record; it is never written to storage itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    WorkFromHome,
    InOffice,
    ExternalMeeting,
    Leave,
    NotMarked,
}

impl AttendanceStatus {
    /// Column order used by every report surface.
    pub const REPORT_COLUMNS: [AttendanceStatus; 5] = [
        AttendanceStatus::WorkFromHome,
        AttendanceStatus::InOffice,
        AttendanceStatus::ExternalMeeting,
        AttendanceStatus::Leave,
        AttendanceStatus::NotMarked,
    ];

    pub fn from_str(input: &str) -> Option<Self> {
        match input {
            "work-from-home" => Some(AttendanceStatus::WorkFromHome),
            "in-office" => Some(AttendanceStatus::InOffice),
            "external-meeting" => Some(AttendanceStatus::ExternalMeeting),
            "leave" => Some(AttendanceStatus::Leave),
            "not-marked" => Some(AttendanceStatus::NotMarked),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::WorkFromHome => "work-from-home",
            AttendanceStatus::InOffice => "in-office",
            AttendanceStatus::ExternalMeeting => "external-meeting",
            AttendanceStatus::Leave => "leave",
            AttendanceStatus::NotMarked => "not-marked",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::WorkFromHome => "Work From Home",
            AttendanceStatus::InOffice => "In Office",
            AttendanceStatus::ExternalMeeting => "External Meeting",
            AttendanceStatus::Leave => "Leave",
            AttendanceStatus::NotMarked => "Not Marked",
        }
    }

    /// Single-letter code used in calendar day cells of the team report.
    /// `NotMarked` renders as an empty cell.
    pub fn letter(&self) -> &'static str {
        match self {
            AttendanceStatus::WorkFromHome => "W",
            AttendanceStatus::InOffice => "O",
            AttendanceStatus::ExternalMeeting => "M",
            AttendanceStatus::Leave => "L",
            AttendanceStatus::NotMarked => "",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
