use crate::assignment::ClassSlotAssignment;
use crate::availability::AvailabilityLedger;
use crate::config::TimetableConfig;
use crate::day::ClassDay;
use crate::grid::{ProfessorAssignmentIndex, WeeklyGrid};
use crate::time::{TimeError, TimeInterval, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A placement request as it arrives from the UI: times still raw, ids
/// opaque. Validation happens inside `check_placement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementProposal {
    pub professor_id: i64,
    pub classroom_id: i64,
    pub section_id: i64,
    pub curricular_unit_id: i64,
    pub day: ClassDay,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl PlacementProposal {
    pub fn interval(&self) -> Result<TimeInterval, TimeError> {
        TimeInterval::new(self.start, self.end)
    }

    pub fn for_assignment(assignment: &ClassSlotAssignment) -> Self {
        Self {
            professor_id: assignment.professor_id,
            classroom_id: assignment.classroom_id,
            section_id: assignment.section_id,
            curricular_unit_id: assignment.curricular_unit_id,
            day: assignment.day,
            start: assignment.interval.start(),
            end: assignment.interval.end(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictReason {
    InvalidInterval {
        detail: String,
    },
    ProfessorDoubleBooked {
        professor_id: i64,
        class_id: i64,
        day: ClassDay,
        interval: TimeInterval,
    },
    ClassroomDoubleBooked {
        classroom_id: i64,
        class_id: i64,
        day: ClassDay,
        interval: TimeInterval,
    },
    OutsideAvailability {
        professor_id: i64,
        day: ClassDay,
        interval: TimeInterval,
    },
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::InvalidInterval { detail } => {
                write!(f, "invalid interval: {detail}")
            }
            ConflictReason::ProfessorDoubleBooked {
                professor_id,
                class_id,
                day,
                interval,
            } => write!(
                f,
                "professor {professor_id} already teaches class {class_id} on {day} {interval}"
            ),
            ConflictReason::ClassroomDoubleBooked {
                classroom_id,
                class_id,
                day,
                interval,
            } => write!(
                f,
                "classroom {classroom_id} already hosts class {class_id} on {day} {interval}"
            ),
            ConflictReason::OutsideAvailability {
                professor_id,
                day,
                interval,
            } => write!(
                f,
                "professor {professor_id} is not available on {day} {interval}"
            ),
        }
    }
}

/// Outcome of a conflict check. A report with reasons is an expected
/// business answer for the UI, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub reasons: Vec<ConflictReason>,
}

impl ConflictReport {
    pub fn accept() -> Self {
        Self::default()
    }

    pub fn reject(reason: ConflictReason) -> Self {
        Self {
            reasons: vec![reason],
        }
    }

    pub fn accepted(&self) -> bool {
        self.reasons.is_empty()
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.accepted() {
            return f.write_str("accepted");
        }
        let reasons: Vec<String> = self.reasons.iter().map(ToString::to_string).collect();
        f.write_str(&reasons.join("; "))
    }
}

/// Read-only view of everything a placement decision needs.
pub struct PlacementContext<'a> {
    pub professor_index: &'a ProfessorAssignmentIndex,
    pub classroom_grids: &'a HashMap<i64, WeeklyGrid>,
    pub ledger: &'a AvailabilityLedger,
    pub config: &'a TimetableConfig,
    /// Assignment being moved, if this proposal is a relocation. It is
    /// excluded from double-booking checks and its current slot counts as
    /// free time, so a class can land right next to where it was.
    pub moving: Option<&'a ClassSlotAssignment>,
}

/// Decide whether the proposal can be placed. Check order is fixed so
/// reports are reproducible: a malformed interval short-circuits, after
/// that every applicable reason is collected.
pub fn check_placement(
    proposal: &PlacementProposal,
    ctx: &PlacementContext<'_>,
) -> ConflictReport {
    let interval = match proposal.interval() {
        Ok(interval) => interval,
        Err(err) => {
            return ConflictReport::reject(ConflictReason::InvalidInterval {
                detail: err.to_string(),
            });
        }
    };
    if !ctx.config.admits(&interval) {
        return ConflictReport::reject(ConflictReason::InvalidInterval {
            detail: format!(
                "{interval} is outside the teaching day {}",
                ctx.config.teaching_day()
            ),
        });
    }

    let exclude = ctx.moving.map(|a| a.class_id);
    let mut report = ConflictReport::accept();

    if let Some((class_id, slot)) =
        ctx.professor_index
            .overlapping(proposal.professor_id, proposal.day, &interval, exclude)
    {
        report.reasons.push(ConflictReason::ProfessorDoubleBooked {
            professor_id: proposal.professor_id,
            class_id,
            day: proposal.day,
            interval: slot,
        });
    }

    if let Some(grid) = ctx.classroom_grids.get(&proposal.classroom_id) {
        if let Some(existing) = grid.first_conflict(proposal.day, &interval, exclude) {
            report.reasons.push(ConflictReason::ClassroomDoubleBooked {
                classroom_id: proposal.classroom_id,
                class_id: existing.class_id,
                day: proposal.day,
                interval: existing.interval,
            });
        }
    }

    if !available_with_origin(proposal, &interval, ctx) {
        report.reasons.push(ConflictReason::OutsideAvailability {
            professor_id: proposal.professor_id,
            day: proposal.day,
            interval,
        });
    }

    report
}

/// Availability test that treats the moving class's own slot as free:
/// its window is released before the new one is consumed on commit.
fn available_with_origin(
    proposal: &PlacementProposal,
    interval: &TimeInterval,
    ctx: &PlacementContext<'_>,
) -> bool {
    let free = ctx.ledger.windows_for(proposal.professor_id, proposal.day);
    let origin = ctx
        .moving
        .filter(|a| a.professor_id == proposal.professor_id && a.day == proposal.day);
    match origin {
        None => free.iter().any(|w| w.contains(interval)),
        Some(origin) => {
            let mut windows = free.to_vec();
            windows.push(origin.interval);
            TimeInterval::merge(&windows)
                .iter()
                .any(|w| w.contains(interval))
        }
    }
}
