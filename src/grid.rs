use crate::assignment::ClassSlotAssignment;
use crate::day::ClassDay;
use crate::time::TimeInterval;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A grid belongs to exactly one section or one classroom; the owning id
/// must match the corresponding field of every assignment placed in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridOwner {
    Section(i64),
    Classroom(i64),
}

impl fmt::Display for GridOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridOwner::Section(id) => write!(f, "section {id}"),
            GridOwner::Classroom(id) => write!(f, "classroom {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    SlotOccupied {
        day: ClassDay,
        interval: TimeInterval,
        occupied_by: i64,
    },
    NotFound(i64),
    DuplicateClassId(i64),
    ForeignAssignment {
        owner: GridOwner,
        class_id: i64,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::SlotOccupied {
                day,
                interval,
                occupied_by,
            } => write!(f, "slot {day} {interval} overlaps class {occupied_by}"),
            GridError::NotFound(class_id) => {
                write!(f, "class {class_id} is not in this grid")
            }
            GridError::DuplicateClassId(class_id) => {
                write!(f, "class {class_id} is already in this grid")
            }
            GridError::ForeignAssignment { owner, class_id } => {
                write!(f, "class {class_id} does not belong to {owner}")
            }
        }
    }
}

impl std::error::Error for GridError {}

/// One week of occupancy for a single section or classroom, indexed by
/// class id so lookups before a move never scan the day/hour matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyGrid {
    owner: GridOwner,
    assignments: HashMap<i64, ClassSlotAssignment>,
}

impl WeeklyGrid {
    pub fn new(owner: GridOwner) -> Self {
        Self {
            owner,
            assignments: HashMap::new(),
        }
    }

    pub fn for_section(section_id: i64) -> Self {
        Self::new(GridOwner::Section(section_id))
    }

    pub fn for_classroom(classroom_id: i64) -> Self {
        Self::new(GridOwner::Classroom(classroom_id))
    }

    pub fn owner(&self) -> GridOwner {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    fn owns(&self, assignment: &ClassSlotAssignment) -> bool {
        match self.owner {
            GridOwner::Section(id) => assignment.section_id == id,
            GridOwner::Classroom(id) => assignment.classroom_id == id,
        }
    }

    /// First assignment on `day` overlapping `interval`, ignoring
    /// `exclude` (the class currently being moved, if any).
    pub fn first_conflict(
        &self,
        day: ClassDay,
        interval: &TimeInterval,
        exclude: Option<i64>,
    ) -> Option<&ClassSlotAssignment> {
        self.assignments
            .values()
            .filter(|a| Some(a.class_id) != exclude)
            .filter(|a| a.day == day && a.interval.overlaps(interval))
            .min_by_key(|a| (a.interval.start(), a.class_id))
    }

    pub fn place(&mut self, assignment: ClassSlotAssignment) -> Result<(), GridError> {
        if !self.owns(&assignment) {
            return Err(GridError::ForeignAssignment {
                owner: self.owner,
                class_id: assignment.class_id,
            });
        }
        if self.assignments.contains_key(&assignment.class_id) {
            return Err(GridError::DuplicateClassId(assignment.class_id));
        }
        if let Some(existing) = self.first_conflict(assignment.day, &assignment.interval, None) {
            return Err(GridError::SlotOccupied {
                day: assignment.day,
                interval: assignment.interval,
                occupied_by: existing.class_id,
            });
        }
        self.assignments.insert(assignment.class_id, assignment);
        Ok(())
    }

    pub fn remove(&mut self, class_id: i64) -> Result<ClassSlotAssignment, GridError> {
        self.assignments
            .remove(&class_id)
            .ok_or(GridError::NotFound(class_id))
    }

    pub fn find_assignment(&self, class_id: i64) -> Option<&ClassSlotAssignment> {
        self.assignments.get(&class_id)
    }

    /// All-or-nothing relocation within this grid: if the target slot is
    /// taken, the original assignment is left untouched.
    pub fn move_assignment(
        &mut self,
        class_id: i64,
        new_day: ClassDay,
        new_interval: TimeInterval,
    ) -> Result<(), GridError> {
        if !self.assignments.contains_key(&class_id) {
            return Err(GridError::NotFound(class_id));
        }
        if let Some(existing) = self.first_conflict(new_day, &new_interval, Some(class_id)) {
            return Err(GridError::SlotOccupied {
                day: new_day,
                interval: new_interval,
                occupied_by: existing.class_id,
            });
        }
        let assignment = self
            .assignments
            .get_mut(&class_id)
            .ok_or(GridError::NotFound(class_id))?;
        assignment.day = new_day;
        assignment.interval = new_interval;
        Ok(())
    }

    pub fn assignments(&self) -> impl Iterator<Item = &ClassSlotAssignment> {
        self.assignments.values()
    }

    /// Assignments on one day, ordered by start time.
    pub fn assignments_on(&self, day: ClassDay) -> Vec<&ClassSlotAssignment> {
        let mut on_day: Vec<&ClassSlotAssignment> = self
            .assignments
            .values()
            .filter(|a| a.day == day)
            .collect();
        on_day.sort_by_key(|a| a.interval.start());
        on_day
    }
}

/// Cross-section occupancy index for professors. Section grids only know
/// their own assignments, so professor double-booking is answered here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfessorAssignmentIndex {
    slots: HashMap<(i64, ClassDay), Vec<(i64, TimeInterval)>>,
}

impl ProfessorAssignmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, assignment: &ClassSlotAssignment) {
        self.slots
            .entry((assignment.professor_id, assignment.day))
            .or_default()
            .push((assignment.class_id, assignment.interval));
    }

    pub fn remove(&mut self, assignment: &ClassSlotAssignment) {
        let key = (assignment.professor_id, assignment.day);
        if let Some(slots) = self.slots.get_mut(&key) {
            slots.retain(|(class_id, _)| *class_id != assignment.class_id);
            if slots.is_empty() {
                self.slots.remove(&key);
            }
        }
    }

    /// First overlapping slot for the professor on `day`, ignoring
    /// `exclude`. Deterministic: earliest start wins, then lowest id.
    pub fn overlapping(
        &self,
        professor_id: i64,
        day: ClassDay,
        interval: &TimeInterval,
        exclude: Option<i64>,
    ) -> Option<(i64, TimeInterval)> {
        self.slots
            .get(&(professor_id, day))?
            .iter()
            .filter(|(class_id, _)| Some(*class_id) != exclude)
            .filter(|(_, slot)| slot.overlaps(interval))
            .min_by_key(|(class_id, slot)| (slot.start(), *class_id))
            .copied()
    }
}
