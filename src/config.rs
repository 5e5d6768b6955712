use crate::time::{TimeError, TimeInterval, TimeOfDay};
use serde::{Deserialize, Serialize};

/// Bounds of the teaching day. Placements outside these bounds are
/// malformed input, not scheduling conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableConfig {
    pub teaching_start: TimeOfDay,
    pub teaching_end: TimeOfDay,
    pub block_minutes: u16,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        // 07:00-22:00 in 45-minute blocks, the usual academic day.
        Self {
            teaching_start: TimeOfDay::from_hm(7, 0).expect("valid constant"),
            teaching_end: TimeOfDay::from_hm(22, 0).expect("valid constant"),
            block_minutes: 45,
        }
    }
}

impl TimetableConfig {
    pub fn new(
        teaching_start: TimeOfDay,
        teaching_end: TimeOfDay,
        block_minutes: u16,
    ) -> Result<Self, TimeError> {
        if teaching_start >= teaching_end {
            return Err(TimeError::EmptyInterval {
                start: teaching_start,
                end: teaching_end,
            });
        }
        Ok(Self {
            teaching_start,
            teaching_end,
            block_minutes,
        })
    }

    pub fn teaching_day(&self) -> TimeInterval {
        TimeInterval::new(self.teaching_start, self.teaching_end)
            .expect("validated on construction")
    }

    pub fn admits(&self, interval: &TimeInterval) -> bool {
        self.teaching_day().contains(interval)
    }

    /// One standard block starting at `start`.
    pub fn block_starting(&self, start: TimeOfDay) -> Result<TimeInterval, TimeError> {
        TimeInterval::new(start, start.add_minutes(self.block_minutes)?)
    }
}
