use super::{validate_assignments, validate_windows, PersistenceError, PersistenceResult};
use crate::assignment::ClassSlotAssignment;
use crate::availability::AvailabilityWindow;
use crate::config::TimetableConfig;
use crate::day::ClassDay;
use crate::session::SchedulingSession;
use crate::time::TimeInterval;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// On-disk form of a session: every assignment plus the professors'
/// remaining free windows. The seeded availability is not stored; it is
/// the union of the two and is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct TimetableSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    config: Option<TimetableConfig>,
    assignments: Vec<ClassSlotAssignment>,
    availability: Vec<AvailabilityWindow>,
}

impl TimetableSnapshot {
    fn from_session(session: &SchedulingSession) -> PersistenceResult<Self> {
        let assignments: Vec<ClassSlotAssignment> =
            session.assignments().into_iter().copied().collect();
        validate_assignments(&assignments)?;
        Ok(Self {
            config: Some(*session.config()),
            assignments,
            availability: session.ledger().all_windows(),
        })
    }

    fn into_session(self) -> PersistenceResult<SchedulingSession> {
        validate_assignments(&self.assignments)?;
        validate_windows(&self.availability)?;

        let mut session = match self.config {
            Some(config) => SchedulingSession::with_config(config),
            None => SchedulingSession::new(),
        };
        session.register_availability_windows(self.availability);
        // Each assignment consumed its window when it was first placed;
        // re-register that window so adoption can consume it again.
        for assignment in &self.assignments {
            session.register_availability(
                assignment.professor_id,
                assignment.day,
                assignment.interval,
            );
        }
        for assignment in self.assignments {
            session
                .adopt_assignment(assignment)
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        }
        Ok(session)
    }
}

pub fn save_session_to_json<P: AsRef<Path>>(
    session: &SchedulingSession,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = TimetableSnapshot::from_session(session)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_session_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<SchedulingSession> {
    let file = File::open(path)?;
    let snapshot: TimetableSnapshot = serde_json::from_reader(file)?;
    snapshot.into_session()
}

/// Professor-submitted availability roster, one window per row.
#[derive(Serialize, Deserialize)]
struct AvailabilityCsvRecord {
    professor_id: i64,
    day: String,
    start: String,
    end: String,
}

impl From<&AvailabilityWindow> for AvailabilityCsvRecord {
    fn from(window: &AvailabilityWindow) -> Self {
        Self {
            professor_id: window.professor_id,
            day: window.day.to_string(),
            start: window.interval.start().to_string(),
            end: window.interval.end().to_string(),
        }
    }
}

impl AvailabilityCsvRecord {
    fn into_window(self) -> PersistenceResult<AvailabilityWindow> {
        let day: ClassDay = self
            .day
            .parse()
            .map_err(|err: crate::time::TimeError| {
                PersistenceError::InvalidData(format!(
                    "professor {}: {err}",
                    self.professor_id
                ))
            })?;
        let start = self.start.parse().map_err(|err: crate::time::TimeError| {
            PersistenceError::InvalidData(format!("professor {}: {err}", self.professor_id))
        })?;
        let end = self.end.parse().map_err(|err: crate::time::TimeError| {
            PersistenceError::InvalidData(format!("professor {}: {err}", self.professor_id))
        })?;
        let interval = TimeInterval::new(start, end)
            .map_err(|err| PersistenceError::InvalidData(format!(
                "professor {}: {err}",
                self.professor_id
            )))?;
        Ok(AvailabilityWindow::new(self.professor_id, day, interval))
    }
}

pub fn save_availability_to_csv<P: AsRef<Path>>(
    windows: &[AvailabilityWindow],
    path: P,
) -> PersistenceResult<()> {
    validate_windows(windows)?;
    let mut writer = csv::Writer::from_path(path)?;
    for window in windows {
        writer.serialize(AvailabilityCsvRecord::from(window))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_availability_from_csv<P: AsRef<Path>>(
    path: P,
) -> PersistenceResult<Vec<AvailabilityWindow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut windows = Vec::new();
    for record in reader.deserialize() {
        let record: AvailabilityCsvRecord = record?;
        windows.push(record.into_window()?);
    }
    validate_windows(&windows)?;
    Ok(windows)
}
