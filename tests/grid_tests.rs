use timetable_tool::{
    ClassDay, ClassSlotAssignment, GridError, GridOwner, ProfessorAssignmentIndex, TimeInterval,
    WeeklyGrid,
};

const SECTION: i64 = 11;

fn iv(sh: u16, sm: u16, eh: u16, em: u16) -> TimeInterval {
    TimeInterval::from_hm(sh, sm, eh, em).unwrap()
}

fn class(
    class_id: i64,
    professor_id: i64,
    classroom_id: i64,
    day: ClassDay,
    interval: TimeInterval,
) -> ClassSlotAssignment {
    ClassSlotAssignment::new(class_id, professor_id, classroom_id, SECTION, 201, day, interval)
}

#[test]
fn place_and_find_by_class_id() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    let a = class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30));
    grid.place(a).unwrap();

    assert_eq!(grid.len(), 1);
    assert_eq!(grid.find_assignment(1), Some(&a));
    assert_eq!(a.slot(), (ClassDay::Monday, iv(7, 0, 8, 30)));
    assert_eq!(grid.find_assignment(2), None);
}

#[test]
fn overlapping_placement_is_rejected() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();

    let err = grid
        .place(class(2, 6, 102, ClassDay::Monday, iv(8, 0, 9, 0)))
        .unwrap_err();
    assert_eq!(
        err,
        GridError::SlotOccupied {
            day: ClassDay::Monday,
            interval: iv(8, 0, 9, 0),
            occupied_by: 1,
        }
    );
}

#[test]
fn touching_placements_coexist() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();
    grid.place(class(2, 6, 102, ClassDay::Monday, iv(8, 30, 10, 0)))
        .unwrap();
    assert_eq!(grid.len(), 2);
}

#[test]
fn same_interval_on_other_day_coexists() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();
    grid.place(class(2, 5, 101, ClassDay::Tuesday, iv(7, 0, 8, 30)))
        .unwrap();
    assert_eq!(grid.assignments_on(ClassDay::Monday).len(), 1);
    assert_eq!(grid.assignments_on(ClassDay::Tuesday).len(), 1);
}

#[test]
fn duplicate_class_id_is_rejected() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();
    let err = grid
        .place(class(1, 5, 101, ClassDay::Friday, iv(7, 0, 8, 30)))
        .unwrap_err();
    assert_eq!(err, GridError::DuplicateClassId(1));
}

#[test]
fn foreign_section_is_rejected() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    let mut foreign = class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30));
    foreign.section_id = SECTION + 1;
    let err = grid.place(foreign).unwrap_err();
    assert_eq!(
        err,
        GridError::ForeignAssignment {
            owner: GridOwner::Section(SECTION),
            class_id: 1,
        }
    );
}

#[test]
fn classroom_grid_checks_classroom_ownership() {
    let mut grid = WeeklyGrid::for_classroom(101);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();
    let err = grid
        .place(class(2, 5, 102, ClassDay::Monday, iv(9, 0, 10, 0)))
        .unwrap_err();
    assert!(matches!(err, GridError::ForeignAssignment { .. }));
}

#[test]
fn remove_returns_the_assignment() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    let a = class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30));
    grid.place(a).unwrap();

    assert_eq!(grid.remove(1).unwrap(), a);
    assert!(grid.is_empty());
    assert_eq!(grid.remove(1), Err(GridError::NotFound(1)));
}

#[test]
fn move_relocates_within_grid() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();

    grid.move_assignment(1, ClassDay::Tuesday, iv(9, 0, 10, 30))
        .unwrap();
    let moved = grid.find_assignment(1).unwrap();
    assert_eq!(moved.day, ClassDay::Tuesday);
    assert_eq!(moved.interval, iv(9, 0, 10, 30));
}

#[test]
fn move_may_shift_within_its_own_slot() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();
    // overlaps the class's own current interval, which is fine
    grid.move_assignment(1, ClassDay::Monday, iv(7, 45, 9, 15))
        .unwrap();
    assert_eq!(grid.find_assignment(1).unwrap().interval, iv(7, 45, 9, 15));
}

#[test]
fn failed_move_leaves_grid_untouched() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();
    grid.place(class(2, 6, 102, ClassDay::Tuesday, iv(9, 0, 10, 0)))
        .unwrap();

    let before = grid.clone();
    let err = grid
        .move_assignment(1, ClassDay::Tuesday, iv(9, 30, 11, 0))
        .unwrap_err();
    assert!(matches!(err, GridError::SlotOccupied { occupied_by: 2, .. }));
    assert_eq!(grid, before);

    let err = grid
        .move_assignment(99, ClassDay::Monday, iv(7, 0, 8, 0))
        .unwrap_err();
    assert_eq!(err, GridError::NotFound(99));
    assert_eq!(grid, before);
}

#[test]
fn assignments_on_day_are_sorted_by_start() {
    let mut grid = WeeklyGrid::for_section(SECTION);
    grid.place(class(1, 5, 101, ClassDay::Monday, iv(10, 0, 11, 0)))
        .unwrap();
    grid.place(class(2, 6, 102, ClassDay::Monday, iv(7, 0, 8, 30)))
        .unwrap();

    let starts: Vec<i64> = grid
        .assignments_on(ClassDay::Monday)
        .iter()
        .map(|a| a.class_id)
        .collect();
    assert_eq!(starts, vec![2, 1]);
}

#[test]
fn professor_index_tracks_slots_across_sections() {
    let mut index = ProfessorAssignmentIndex::new();
    let a = class(1, 5, 101, ClassDay::Monday, iv(7, 0, 8, 30));
    let mut b = class(2, 5, 102, ClassDay::Monday, iv(10, 0, 11, 0));
    b.section_id = SECTION + 1;
    index.insert(&a);
    index.insert(&b);

    assert_eq!(
        index.overlapping(5, ClassDay::Monday, &iv(8, 0, 9, 0), None),
        Some((1, iv(7, 0, 8, 30)))
    );
    // half-open: touching slot is free
    assert_eq!(
        index.overlapping(5, ClassDay::Monday, &iv(8, 30, 10, 0), None),
        None
    );
    // excluding the moving class hides its slot
    assert_eq!(
        index.overlapping(5, ClassDay::Monday, &iv(8, 0, 9, 0), Some(1)),
        None
    );

    index.remove(&a);
    assert_eq!(
        index.overlapping(5, ClassDay::Monday, &iv(8, 0, 9, 0), None),
        None
    );
}
