use crate::day::ClassDay;
use crate::time::TimeInterval;
use serde::{Deserialize, Serialize};

/// One occupied cell of a weekly grid. All ids are opaque references owned
/// by the surrounding application (sections, professors, classrooms and
/// curricular units live in their own tables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSlotAssignment {
    pub class_id: i64,
    pub professor_id: i64,
    pub classroom_id: i64,
    pub section_id: i64,
    pub curricular_unit_id: i64,
    pub day: ClassDay,
    pub interval: TimeInterval,
}

impl ClassSlotAssignment {
    pub fn new(
        class_id: i64,
        professor_id: i64,
        classroom_id: i64,
        section_id: i64,
        curricular_unit_id: i64,
        day: ClassDay,
        interval: TimeInterval,
    ) -> Self {
        Self {
            class_id,
            professor_id,
            classroom_id,
            section_id,
            curricular_unit_id,
            day,
            interval,
        }
    }

    pub fn slot(&self) -> (ClassDay, TimeInterval) {
        (self.day, self.interval)
    }
}
