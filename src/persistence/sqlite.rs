use super::{
    interval_from_minutes, validate_windows, PersistenceError, PersistenceResult, TimetableStore,
};
use crate::assignment::ClassSlotAssignment;
use crate::availability::AvailabilityWindow;
use crate::day::ClassDay;
use crate::grid::WeeklyGrid;
use rusqlite::{params, Connection, Row};
use std::sync::Mutex;

/// Sqlite-backed timetable store. The UNIQUE constraints on start times
/// are a last-resort guard under the in-memory no-overlap invariant:
/// they cannot see partial overlaps, but they stop exact double-writes
/// even if a buggy caller skips the conflict check.
pub struct SqliteTimetableStore {
    connection: Mutex<Connection>,
}

impl SqliteTimetableStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS horarios (
                class_id INTEGER PRIMARY KEY,
                professor_id INTEGER NOT NULL,
                classroom_id INTEGER NOT NULL,
                section_id INTEGER NOT NULL,
                curricular_unit_id INTEGER NOT NULL,
                day TEXT NOT NULL,
                start_min INTEGER NOT NULL,
                end_min INTEGER NOT NULL,
                UNIQUE (section_id, day, start_min),
                UNIQUE (classroom_id, day, start_min),
                UNIQUE (professor_id, day, start_min)
            );
            CREATE TABLE IF NOT EXISTS disponibilidad_docente (
                professor_id INTEGER NOT NULL,
                day TEXT NOT NULL,
                start_min INTEGER NOT NULL,
                end_min INTEGER NOT NULL,
                UNIQUE (professor_id, day, start_min)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawAssignmentRow> {
        Ok(RawAssignmentRow {
            class_id: row.get("class_id")?,
            professor_id: row.get("professor_id")?,
            classroom_id: row.get("classroom_id")?,
            section_id: row.get("section_id")?,
            curricular_unit_id: row.get("curricular_unit_id")?,
            day: row.get("day")?,
            start_min: row.get("start_min")?,
            end_min: row.get("end_min")?,
        })
    }
}

/// Row as stored, before day and interval validation.
struct RawAssignmentRow {
    class_id: i64,
    professor_id: i64,
    classroom_id: i64,
    section_id: i64,
    curricular_unit_id: i64,
    day: String,
    start_min: u16,
    end_min: u16,
}

impl RawAssignmentRow {
    fn into_assignment(self) -> PersistenceResult<ClassSlotAssignment> {
        let day: ClassDay = self.day.parse().map_err(|err: crate::time::TimeError| {
            PersistenceError::InvalidData(err.to_string())
        })?;
        Ok(ClassSlotAssignment {
            class_id: self.class_id,
            professor_id: self.professor_id,
            classroom_id: self.classroom_id,
            section_id: self.section_id,
            curricular_unit_id: self.curricular_unit_id,
            day,
            interval: interval_from_minutes(self.start_min, self.end_min)?,
        })
    }
}

impl TimetableStore for SqliteTimetableStore {
    fn load_grid(&self, section_id: i64) -> PersistenceResult<WeeklyGrid> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT class_id, professor_id, classroom_id, section_id, curricular_unit_id,
                    day, start_min, end_min
             FROM horarios WHERE section_id = ?1 ORDER BY class_id ASC",
        )?;
        let rows = stmt.query_map(params![section_id], Self::raw_row)?;

        let mut grid = WeeklyGrid::for_section(section_id);
        for row in rows {
            let assignment = row?.into_assignment()?;
            grid.place(assignment)
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
        }
        Ok(grid)
    }

    fn save_assignment(&self, assignment: &ClassSlotAssignment) -> PersistenceResult<()> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO horarios
             (class_id, professor_id, classroom_id, section_id, curricular_unit_id,
              day, start_min, end_min)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                assignment.class_id,
                assignment.professor_id,
                assignment.classroom_id,
                assignment.section_id,
                assignment.curricular_unit_id,
                assignment.day.as_str(),
                assignment.interval.start().minutes(),
                assignment.interval.end().minutes(),
            ],
        )?;
        Ok(())
    }

    fn delete_assignment(&self, class_id: i64) -> PersistenceResult<()> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let deleted = conn.execute("DELETE FROM horarios WHERE class_id = ?1", params![class_id])?;
        if deleted == 0 {
            return Err(PersistenceError::NotFound);
        }
        Ok(())
    }

    fn load_availability(&self, professor_id: i64) -> PersistenceResult<Vec<AvailabilityWindow>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT day, start_min, end_min FROM disponibilidad_docente
             WHERE professor_id = ?1 ORDER BY day ASC, start_min ASC",
        )?;
        let rows = stmt.query_map(params![professor_id], |row| {
            Ok((
                row.get::<_, String>("day")?,
                row.get::<_, u16>("start_min")?,
                row.get::<_, u16>("end_min")?,
            ))
        })?;

        let mut windows = Vec::new();
        for row in rows {
            let (day, start_min, end_min) = row?;
            let day: ClassDay = day.parse().map_err(|err: crate::time::TimeError| {
                PersistenceError::InvalidData(err.to_string())
            })?;
            windows.push(AvailabilityWindow::new(
                professor_id,
                day,
                interval_from_minutes(start_min, end_min)?,
            ));
        }
        validate_windows(&windows)?;
        Ok(windows)
    }

    fn save_availability(
        &self,
        professor_id: i64,
        windows: &[AvailabilityWindow],
    ) -> PersistenceResult<()> {
        validate_windows(windows)?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM disponibilidad_docente WHERE professor_id = ?1",
            params![professor_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO disponibilidad_docente (professor_id, day, start_min, end_min)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for window in windows {
                stmt.execute(params![
                    professor_id,
                    window.day.as_str(),
                    window.interval.start().minutes(),
                    window.interval.end().minutes(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
