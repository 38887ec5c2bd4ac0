use crate::persistence::{
    self, AttendanceBackend, AttendanceMap, PersistenceError, PersistenceResult, PushEvent,
};
use crate::roster::Roster;
use crate::status::AttendanceStatus;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::mpsc;

/// Rejected caller input. The operation is a no-op: nothing was mutated and
/// nothing was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    UnknownMember(String),
    UnknownStatus(String),
    EmptySelection,
    NotSelectable(NaiveDate),
    NoPendingSelection,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownMember(name) => write!(f, "unknown member '{name}'"),
            ValidationError::UnknownStatus(value) => write!(f, "unknown status '{value}'"),
            ValidationError::EmptySelection => write!(f, "no dates selected"),
            ValidationError::NotSelectable(date) => write!(f, "date {date} is not selectable"),
            ValidationError::NoPendingSelection => write!(f, "no day selected"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum StoreError {
    Validation(ValidationError),
    Persistence(PersistenceError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Validation(err) => write!(f, "{err}"),
            StoreError::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for StoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Owner of the in-memory attendance map. Every mutation validates first,
/// applies to the map, then eagerly saves the whole snapshot through the
/// backend. A failed save keeps the in-memory update; the error propagates
/// so the caller can surface it.
pub struct AttendanceStore {
    roster: Roster,
    map: AttendanceMap,
    backend: Box<dyn AttendanceBackend + Send + Sync>,
}

impl AttendanceStore {
    pub fn new<B>(roster: Roster, backend: B) -> Self
    where
        B: AttendanceBackend + Send + Sync + 'static,
    {
        Self {
            roster,
            map: BTreeMap::new(),
            backend: Box::new(backend),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn map(&self) -> &AttendanceMap {
        &self.map
    }

    pub fn is_empty(&self) -> bool {
        self.map.values().all(BTreeMap::is_empty)
    }

    pub fn record_count(&self) -> usize {
        self.map.values().map(BTreeMap::len).sum()
    }

    /// Loads the stored snapshot into memory, returning how many records
    /// arrived. An absent snapshot leaves the store empty; a failed or
    /// invalid load leaves the store untouched and returns the error.
    pub fn hydrate(&mut self) -> PersistenceResult<usize> {
        let Some(map) = self.backend.load()? else {
            return Ok(0);
        };
        persistence::validate_snapshot(&self.roster, &map)?;
        let count = map.values().map(BTreeMap::len).sum();
        self.map = map;
        Ok(count)
    }

    pub fn subscribe(&self) -> Option<mpsc::Receiver<PushEvent>> {
        self.backend.subscribe()
    }

    /// Replaces the whole map with a pushed snapshot. Last snapshot wins;
    /// there is no merging with local state.
    pub fn apply_snapshot(&mut self, map: AttendanceMap) -> PersistenceResult<()> {
        persistence::validate_snapshot(&self.roster, &map)?;
        self.map = map;
        Ok(())
    }

    /// Resolved status for a member and date; days without a record read as
    /// `NotMarked`.
    pub fn get(&self, member: &str, date: NaiveDate) -> AttendanceStatus {
        self.map
            .get(member)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(AttendanceStatus::NotMarked)
    }

    pub fn set(
        &mut self,
        member: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<(), StoreError> {
        self.require_member(member)?;
        self.apply(member, date, status);
        self.persist()
    }

    pub fn clear(&mut self, member: &str, date: NaiveDate) -> Result<(), StoreError> {
        self.set(member, date, AttendanceStatus::NotMarked)
    }

    /// Applies one status to every date in the selection and saves once.
    /// An empty selection is rejected before any mutation or save happens.
    pub fn bulk_set(
        &mut self,
        member: &str,
        dates: &[NaiveDate],
        status: AttendanceStatus,
    ) -> Result<usize, StoreError> {
        self.require_member(member)?;
        if dates.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        for &date in dates {
            self.apply(member, date, status);
        }
        self.persist()?;
        Ok(dates.len())
    }

    /// A member's recorded days, newest first, optionally narrowed to one
    /// calendar month.
    pub fn member_history(
        &self,
        member: &str,
        month: Option<u32>,
    ) -> Result<Vec<(NaiveDate, AttendanceStatus)>, ValidationError> {
        self.require_member(member)?;
        let mut entries: Vec<(NaiveDate, AttendanceStatus)> = self
            .map
            .get(member)
            .map(|days| {
                days.iter()
                    .filter(|(date, _)| month.map_or(true, |m| date.month() == m))
                    .map(|(&date, &status)| (date, status))
                    .collect()
            })
            .unwrap_or_default();
        entries.reverse();
        Ok(entries)
    }

    /// Today's resolved status for every roster member, in roster order.
    pub fn today_overview(&self, today: NaiveDate) -> Vec<(String, AttendanceStatus)> {
        self.roster
            .members()
            .iter()
            .map(|member| (member.clone(), self.get(member, today)))
            .collect()
    }

    fn require_member(&self, member: &str) -> Result<(), ValidationError> {
        if self.roster.contains(member) {
            Ok(())
        } else {
            Err(ValidationError::UnknownMember(member.to_string()))
        }
    }

    // Setting not-marked deletes the record; empty member entries collapse
    // away so the map never holds hollow keys.
    fn apply(&mut self, member: &str, date: NaiveDate, status: AttendanceStatus) {
        if status == AttendanceStatus::NotMarked {
            if let Some(days) = self.map.get_mut(member) {
                days.remove(&date);
                if days.is_empty() {
                    self.map.remove(member);
                }
            }
        } else {
            self.map
                .entry(member.to_string())
                .or_default()
                .insert(date, status);
        }
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.backend.save(&self.map).map_err(StoreError::Persistence)
    }
}
