#![cfg(feature = "sqlite")]

use timetable_tool::persistence::{PersistenceError, TimetableStore};
use timetable_tool::{
    AvailabilityWindow, ClassDay, ClassSlotAssignment, SqliteTimetableStore, TimeInterval,
};

const PROF: i64 = 5;
const SECTION: i64 = 11;
const MON: ClassDay = ClassDay::Monday;

fn iv(sh: u16, sm: u16, eh: u16, em: u16) -> TimeInterval {
    TimeInterval::from_hm(sh, sm, eh, em).unwrap()
}

fn class(class_id: i64, day: ClassDay, interval: TimeInterval) -> ClassSlotAssignment {
    ClassSlotAssignment::new(class_id, PROF, 101, SECTION, 201, day, interval)
}

fn open_store(dir: &tempfile::TempDir) -> SqliteTimetableStore {
    SqliteTimetableStore::new(dir.path().join("timetable.db")).unwrap()
}

#[test]
fn saved_assignments_come_back_in_the_section_grid() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let a = class(1, MON, iv(7, 0, 8, 30));
    let b = class(2, ClassDay::Tuesday, iv(9, 0, 10, 30));
    store.save_assignment(&a).unwrap();
    store.save_assignment(&b).unwrap();
    // a different section should not bleed in
    let mut other = class(3, MON, iv(7, 0, 8, 30));
    other.section_id = SECTION + 1;
    other.classroom_id = 102;
    other.professor_id = PROF + 1;
    store.save_assignment(&other).unwrap();

    let grid = store.load_grid(SECTION).unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid.find_assignment(1), Some(&a));
    assert_eq!(grid.find_assignment(2), Some(&b));
    assert_eq!(grid.find_assignment(3), None);
}

#[test]
fn save_assignment_overwrites_by_class_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.save_assignment(&class(1, MON, iv(7, 0, 8, 30))).unwrap();
    let moved = class(1, ClassDay::Wednesday, iv(10, 0, 11, 30));
    store.save_assignment(&moved).unwrap();

    let grid = store.load_grid(SECTION).unwrap();
    assert_eq!(grid.len(), 1);
    assert_eq!(grid.find_assignment(1), Some(&moved));
}

#[test]
fn delete_removes_the_row_and_reports_missing_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.save_assignment(&class(1, MON, iv(7, 0, 8, 30))).unwrap();
    store.delete_assignment(1).unwrap();
    assert!(store.load_grid(SECTION).unwrap().is_empty());

    let err = store.delete_assignment(1).unwrap_err();
    assert!(matches!(err, PersistenceError::NotFound));
}

#[test]
fn overlapping_stored_rows_fail_grid_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.save_assignment(&class(1, MON, iv(7, 0, 8, 30))).unwrap();
    // distinct start_min, so the unique constraints cannot catch this
    let mut clash = class(2, MON, iv(7, 45, 9, 0));
    clash.classroom_id = 102;
    store.save_assignment(&clash).unwrap();

    let err = store.load_grid(SECTION).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)), "{err}");
}

#[test]
fn availability_round_trips_per_professor() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let windows = vec![
        AvailabilityWindow::new(PROF, MON, iv(7, 0, 12, 0)),
        AvailabilityWindow::new(PROF, ClassDay::Tuesday, iv(8, 0, 14, 0)),
    ];
    store.save_availability(PROF, &windows).unwrap();
    store
        .save_availability(
            PROF + 1,
            &[AvailabilityWindow::new(PROF + 1, MON, iv(9, 0, 13, 0))],
        )
        .unwrap();

    assert_eq!(store.load_availability(PROF).unwrap(), windows);
    assert_eq!(store.load_availability(PROF + 1).unwrap().len(), 1);
    assert!(store.load_availability(PROF + 2).unwrap().is_empty());
}

#[test]
fn save_availability_replaces_the_previous_roster() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store
        .save_availability(PROF, &[AvailabilityWindow::new(PROF, MON, iv(7, 0, 12, 0))])
        .unwrap();
    let replacement = vec![AvailabilityWindow::new(
        PROF,
        ClassDay::Friday,
        iv(10, 0, 13, 0),
    )];
    store.save_availability(PROF, &replacement).unwrap();

    assert_eq!(store.load_availability(PROF).unwrap(), replacement);
}

#[test]
fn overlapping_windows_never_reach_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let err = store
        .save_availability(
            PROF,
            &[
                AvailabilityWindow::new(PROF, MON, iv(7, 0, 10, 0)),
                AvailabilityWindow::new(PROF, MON, iv(9, 0, 12, 0)),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
    assert!(store.load_availability(PROF).unwrap().is_empty());
}

#[test]
fn data_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let a = class(1, MON, iv(7, 0, 8, 30));
    {
        let store = open_store(&dir);
        store.save_assignment(&a).unwrap();
        store
            .save_availability(PROF, &[AvailabilityWindow::new(PROF, MON, iv(8, 30, 12, 0))])
            .unwrap();
    }

    let reopened = open_store(&dir);
    assert_eq!(reopened.load_grid(SECTION).unwrap().find_assignment(1), Some(&a));
    assert_eq!(reopened.load_availability(PROF).unwrap().len(), 1);
}
