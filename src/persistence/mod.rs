use crate::assignment::ClassSlotAssignment;
use crate::availability::AvailabilityWindow;
use crate::grid::WeeklyGrid;
use crate::time::{TimeInterval, TimeOfDay};
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound,
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
            PersistenceError::NotFound => write!(f, "no timetable stored"),
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

/// Storage collaborator for the scheduling core. Backed by relational
/// tables in the surrounding application; the sqlite implementation in
/// this crate mirrors that schema and its last-resort uniqueness guards.
pub trait TimetableStore {
    fn load_grid(&self, section_id: i64) -> PersistenceResult<WeeklyGrid>;
    fn save_assignment(&self, assignment: &ClassSlotAssignment) -> PersistenceResult<()>;
    fn delete_assignment(&self, class_id: i64) -> PersistenceResult<()>;
    fn load_availability(&self, professor_id: i64) -> PersistenceResult<Vec<AvailabilityWindow>>;
    fn save_availability(
        &self,
        professor_id: i64,
        windows: &[AvailabilityWindow],
    ) -> PersistenceResult<()>;
}

/// Windows going to or coming from storage must be non-overlapping per
/// professor and day, otherwise the ledger invariant breaks on load.
pub fn validate_windows(windows: &[AvailabilityWindow]) -> PersistenceResult<()> {
    for (i, a) in windows.iter().enumerate() {
        for b in &windows[i + 1..] {
            if a.professor_id == b.professor_id
                && a.day == b.day
                && a.interval.overlaps(&b.interval)
            {
                return Err(PersistenceError::InvalidData(format!(
                    "professor {} has overlapping windows on {}: {} and {}",
                    a.professor_id, a.day, a.interval, b.interval
                )));
            }
        }
    }
    Ok(())
}

/// No two stored assignments may double-book a professor, classroom, or
/// section slot.
pub fn validate_assignments(assignments: &[ClassSlotAssignment]) -> PersistenceResult<()> {
    for (i, a) in assignments.iter().enumerate() {
        for b in &assignments[i + 1..] {
            if a.day != b.day || !a.interval.overlaps(&b.interval) {
                continue;
            }
            let shared: Option<(&str, i64)> = if a.professor_id == b.professor_id {
                Some(("professor", a.professor_id))
            } else if a.classroom_id == b.classroom_id {
                Some(("classroom", a.classroom_id))
            } else if a.section_id == b.section_id {
                Some(("section", a.section_id))
            } else {
                None
            };
            if let Some((kind, id)) = shared {
                return Err(PersistenceError::InvalidData(format!(
                    "classes {} and {} double-book {kind} {id} on {} ({} vs {})",
                    a.class_id, b.class_id, a.day, a.interval, b.interval
                )));
            }
        }
    }
    Ok(())
}

pub(crate) fn interval_from_minutes(
    start_min: u16,
    end_min: u16,
) -> PersistenceResult<TimeInterval> {
    let start = TimeOfDay::from_minutes(start_min)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    let end = TimeOfDay::from_minutes(end_min)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    TimeInterval::new(start, end).map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_availability_from_csv, load_session_from_json, save_availability_to_csv,
    save_session_to_json,
};
