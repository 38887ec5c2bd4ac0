use crate::roster::Roster;
use crate::status::AttendanceStatus;
use chrono::NaiveDate;
use serde_json::Error as SerdeJsonError;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// The whole attendance data set: member name to date to recorded status.
/// `NotMarked` never appears as a value; absence of a key is its encoding.
pub type AttendanceMap = BTreeMap<String, BTreeMap<NaiveDate, AttendanceStatus>>;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Notification from a push-capable backend. The data set is replaced
/// wholesale; the most recent snapshot wins.
#[derive(Debug)]
pub enum PushEvent {
    Replace(AttendanceMap),
    Failed(String),
}

/// Storage port for the attendance data set. Saves and loads move the whole
/// map at once; there are no per-record operations at this seam.
pub trait AttendanceBackend {
    fn save(&self, map: &AttendanceMap) -> PersistenceResult<()>;
    fn load(&self) -> PersistenceResult<Option<AttendanceMap>>;

    /// Push-capable backends hand out a channel of snapshot replacements.
    fn subscribe(&self) -> Option<mpsc::Receiver<PushEvent>> {
        None
    }
}

pub fn validate_snapshot(roster: &Roster, map: &AttendanceMap) -> PersistenceResult<()> {
    for (member, days) in map {
        if !roster.contains(member) {
            return Err(PersistenceError::InvalidData(format!(
                "unknown member '{member}' in stored attendance"
            )));
        }
        for (date, status) in days {
            if *status == AttendanceStatus::NotMarked {
                return Err(PersistenceError::InvalidData(format!(
                    "'not-marked' stored for {member} on {date}; unmarked days must be absent"
                )));
            }
        }
    }
    Ok(())
}

/// In-memory backend. Serves as the no-sync storage variant and, through
/// its push handles, as the event source for snapshot subscriptions.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    snapshot: Option<AttendanceMap>,
    saves: usize,
    push: Option<mpsc::Sender<PushEvent>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    pub fn push_replace(&self, map: AttendanceMap) {
        self.send(PushEvent::Replace(map));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.send(PushEvent::Failed(message.into()));
    }

    fn send(&self, event: PushEvent) {
        if let Some(sender) = &self.lock().push {
            let _ = sender.send(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory backend mutex poisoned")
    }
}

impl AttendanceBackend for MemoryBackend {
    fn save(&self, map: &AttendanceMap) -> PersistenceResult<()> {
        let mut state = self.lock();
        state.snapshot = Some(map.clone());
        state.saves += 1;
        Ok(())
    }

    fn load(&self) -> PersistenceResult<Option<AttendanceMap>> {
        Ok(self.lock().snapshot.clone())
    }

    fn subscribe(&self) -> Option<mpsc::Receiver<PushEvent>> {
        let (sender, receiver) = mpsc::channel();
        self.lock().push = Some(sender);
        Some(receiver)
    }
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{JsonFileBackend, load_map_from_json, save_map_to_json};
