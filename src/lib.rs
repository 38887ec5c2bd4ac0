pub mod bulk;
pub mod calendar;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod projection;
pub mod report;
pub mod roster;
pub mod session;
pub mod status;
pub mod store;

pub use bulk::{BulkEditResult, BulkSelection};
pub use calendar::MonthWindow;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteAttendanceBackend;
pub use persistence::{
    AttendanceBackend, AttendanceMap, JsonFileBackend, MemoryBackend, PersistenceError,
    PersistenceResult, PushEvent,
};
pub use projection::{CellKind, DayCell, MonthGrid};
pub use report::StatusCounts;
pub use roster::Roster;
pub use status::AttendanceStatus;
pub use store::{AttendanceStore, StoreError, ValidationError};
