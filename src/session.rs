use crate::assignment::ClassSlotAssignment;
use crate::availability::{AvailabilityLedger, AvailabilityWindow, LedgerError};
use crate::config::TimetableConfig;
use crate::conflict::{check_placement, ConflictReport, PlacementContext, PlacementProposal};
use crate::day::ClassDay;
use crate::grid::{GridError, ProfessorAssignmentIndex, WeeklyGrid};
use crate::time::TimeInterval;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    UnknownClass(i64),
    MoveInProgress(i64),
    NoMoveInProgress,
    NoPendingTarget,
    /// The slot passed its conflict check but was consumed before commit.
    /// Everything has been rolled back; the caller may simply retry.
    PlacementRace {
        class_id: i64,
        reason: LedgerError,
    },
    Grid(GridError),
    Ledger(LedgerError),
    /// Grid, index and ledger disagree. State is whatever rollback could
    /// salvage; this is a bug, not a user mistake.
    Inconsistent(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownClass(class_id) => {
                write!(f, "class {class_id} is not in this session")
            }
            SessionError::MoveInProgress(class_id) => {
                write!(f, "a move of class {class_id} is already in progress")
            }
            SessionError::NoMoveInProgress => write!(f, "no move in progress"),
            SessionError::NoPendingTarget => {
                write!(f, "no target has been proposed for the pending move")
            }
            SessionError::PlacementRace { class_id, reason } => write!(
                f,
                "could not complete placement of class {class_id}, please retry: {reason}"
            ),
            SessionError::Grid(err) => write!(f, "grid error: {err}"),
            SessionError::Ledger(err) => write!(f, "ledger error: {err}"),
            SessionError::Inconsistent(detail) => {
                write!(f, "session state is inconsistent: {detail}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

impl From<GridError> for SessionError {
    fn from(value: GridError) -> Self {
        Self::Grid(value)
    }
}

impl From<LedgerError> for SessionError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

/// Result of `place_new`: a rejection is an expected answer carrying the
/// report for the UI, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    Committed,
    Rejected(ConflictReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementTarget {
    pub day: ClassDay,
    pub interval: TimeInterval,
    pub classroom_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
enum MoveState {
    Idle,
    SelectedForMove {
        origin: ClassSlotAssignment,
    },
    PendingPlacement {
        origin: ClassSlotAssignment,
        target: PlacementTarget,
    },
}

/// One section-editing session: the single writer over its grids, the
/// professor index and the availability ledger. Every mutation goes
/// through the conflict check first, and the check-then-act pair runs
/// without suspension, so the no-double-booking invariant cannot be
/// raced from within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingSession {
    config: TimetableConfig,
    section_grids: HashMap<i64, WeeklyGrid>,
    classroom_grids: HashMap<i64, WeeklyGrid>,
    professor_index: ProfessorAssignmentIndex,
    ledger: AvailabilityLedger,
    class_sections: HashMap<i64, i64>,
    move_state: MoveState,
}

impl Default for SchedulingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulingSession {
    pub fn new() -> Self {
        Self::with_config(TimetableConfig::default())
    }

    pub fn with_config(config: TimetableConfig) -> Self {
        Self {
            config,
            section_grids: HashMap::new(),
            classroom_grids: HashMap::new(),
            professor_index: ProfessorAssignmentIndex::new(),
            ledger: AvailabilityLedger::new(),
            class_sections: HashMap::new(),
            move_state: MoveState::Idle,
        }
    }

    pub fn config(&self) -> &TimetableConfig {
        &self.config
    }

    pub fn ledger(&self) -> &AvailabilityLedger {
        &self.ledger
    }

    pub fn section_grid(&self, section_id: i64) -> Option<&WeeklyGrid> {
        self.section_grids.get(&section_id)
    }

    pub fn classroom_grid(&self, classroom_id: i64) -> Option<&WeeklyGrid> {
        self.classroom_grids.get(&classroom_id)
    }

    pub fn assignment(&self, class_id: i64) -> Option<&ClassSlotAssignment> {
        let section_id = self.class_sections.get(&class_id)?;
        self.section_grids
            .get(section_id)?
            .find_assignment(class_id)
    }

    /// Every assignment across all sections, ordered by class id.
    pub fn assignments(&self) -> Vec<&ClassSlotAssignment> {
        let mut all: Vec<&ClassSlotAssignment> = self
            .section_grids
            .values()
            .flat_map(WeeklyGrid::assignments)
            .collect();
        all.sort_by_key(|a| a.class_id);
        all
    }

    /// Origin of the move in progress, if any.
    pub fn pending_move(&self) -> Option<&ClassSlotAssignment> {
        match &self.move_state {
            MoveState::Idle => None,
            MoveState::SelectedForMove { origin } => Some(origin),
            MoveState::PendingPlacement { origin, .. } => Some(origin),
        }
    }

    pub fn has_pending_target(&self) -> bool {
        matches!(self.move_state, MoveState::PendingPlacement { .. })
    }

    pub fn register_availability(
        &mut self,
        professor_id: i64,
        day: ClassDay,
        interval: TimeInterval,
    ) {
        self.ledger
            .register_availability(professor_id, day, interval);
    }

    pub fn register_availability_windows<I>(&mut self, windows: I)
    where
        I: IntoIterator<Item = AvailabilityWindow>,
    {
        for window in windows {
            self.ledger.register_window(window);
        }
    }

    /// Dry-run conflict check against the current state.
    pub fn check(&self, proposal: &PlacementProposal) -> ConflictReport {
        self.check_with(proposal, None)
    }

    fn check_with(
        &self,
        proposal: &PlacementProposal,
        moving: Option<&ClassSlotAssignment>,
    ) -> ConflictReport {
        let ctx = PlacementContext {
            professor_index: &self.professor_index,
            classroom_grids: &self.classroom_grids,
            ledger: &self.ledger,
            config: &self.config,
            moving,
        };
        check_placement(proposal, &ctx)
    }

    /// First-time placement: conflict check, then grid insert and
    /// availability consume as one unit.
    pub fn place_new(
        &mut self,
        class_id: i64,
        proposal: &PlacementProposal,
    ) -> Result<PlacementOutcome, SessionError> {
        if self.pending_move().is_some_and(|o| o.class_id == class_id) {
            return Err(SessionError::MoveInProgress(class_id));
        }
        if self.class_sections.contains_key(&class_id) {
            return Err(SessionError::Grid(GridError::DuplicateClassId(class_id)));
        }

        let report = self.check_with(proposal, None);
        let interval = match proposal.interval() {
            Ok(interval) if report.accepted() => interval,
            _ => return Ok(PlacementOutcome::Rejected(report)),
        };

        let assignment = ClassSlotAssignment::new(
            class_id,
            proposal.professor_id,
            proposal.classroom_id,
            proposal.section_id,
            proposal.curricular_unit_id,
            proposal.day,
            interval,
        );
        self.commit_place(assignment)?;
        Ok(PlacementOutcome::Committed)
    }

    /// Seed an assignment loaded from storage. Runs the same conflict
    /// gate as `place_new`; a rejection here means the stored timetable
    /// itself is inconsistent.
    pub fn adopt_assignment(
        &mut self,
        assignment: ClassSlotAssignment,
    ) -> Result<(), SessionError> {
        if self.class_sections.contains_key(&assignment.class_id) {
            return Err(SessionError::Grid(GridError::DuplicateClassId(
                assignment.class_id,
            )));
        }
        let proposal = PlacementProposal::for_assignment(&assignment);
        let report = self.check_with(&proposal, None);
        if !report.accepted() {
            return Err(SessionError::Inconsistent(format!(
                "stored class {} does not fit its timetable: {report}",
                assignment.class_id
            )));
        }
        self.commit_place(assignment)
    }

    pub fn request_move(&mut self, class_id: i64) -> Result<(), SessionError> {
        if let Some(origin) = self.pending_move() {
            return Err(SessionError::MoveInProgress(origin.class_id));
        }
        let origin = *self
            .assignment(class_id)
            .ok_or(SessionError::UnknownClass(class_id))?;
        self.move_state = MoveState::SelectedForMove { origin };
        Ok(())
    }

    /// Abandon the move in progress. Nothing was committed, so nothing is
    /// mutated; calling this with no move in progress is a no-op.
    pub fn cancel_move(&mut self) {
        self.move_state = MoveState::Idle;
    }

    /// Propose where the selected class should land. On acceptance the
    /// move becomes committable; on rejection the selection stays and the
    /// report tells the user why.
    pub fn propose_target(
        &mut self,
        day: ClassDay,
        interval: TimeInterval,
        classroom_id: i64,
    ) -> Result<ConflictReport, SessionError> {
        let origin = match &self.move_state {
            MoveState::Idle => return Err(SessionError::NoMoveInProgress),
            MoveState::SelectedForMove { origin } => *origin,
            MoveState::PendingPlacement { origin, .. } => *origin,
        };
        let proposal = PlacementProposal {
            professor_id: origin.professor_id,
            classroom_id,
            section_id: origin.section_id,
            curricular_unit_id: origin.curricular_unit_id,
            day,
            start: interval.start(),
            end: interval.end(),
        };
        let report = self.check_with(&proposal, Some(&origin));
        self.move_state = if report.accepted() {
            MoveState::PendingPlacement {
                origin,
                target: PlacementTarget {
                    day,
                    interval,
                    classroom_id,
                },
            }
        } else {
            MoveState::SelectedForMove { origin }
        };
        Ok(report)
    }

    /// Execute the pending move as one logical unit: release the origin
    /// window, relocate across the grids, consume the target window. If
    /// the final consume loses a race, every step is undone and the
    /// session drops back to the selection state.
    pub fn commit(&mut self) -> Result<(), SessionError> {
        let (origin, target) = match &self.move_state {
            MoveState::Idle => return Err(SessionError::NoMoveInProgress),
            MoveState::SelectedForMove { .. } => return Err(SessionError::NoPendingTarget),
            MoveState::PendingPlacement { origin, target } => (*origin, *target),
        };
        let class_id = origin.class_id;

        self.ledger
            .release(origin.professor_id, origin.day, origin.interval);

        let removed = match self.apply_remove(class_id) {
            Ok(removed) => removed,
            Err(err) => {
                self.reconsume_origin(&origin)?;
                return Err(err);
            }
        };
        let moved = ClassSlotAssignment {
            day: target.day,
            interval: target.interval,
            classroom_id: target.classroom_id,
            ..removed
        };
        if let Err(err) = self.apply_place(moved) {
            self.apply_place(removed)
                .map_err(|undo| SessionError::Inconsistent(undo.to_string()))?;
            self.reconsume_origin(&origin)?;
            return Err(err);
        }
        if let Err(reason) = self
            .ledger
            .consume(moved.professor_id, moved.day, moved.interval)
        {
            self.apply_remove(moved.class_id)
                .map_err(|undo| SessionError::Inconsistent(undo.to_string()))?;
            self.apply_place(removed)
                .map_err(|undo| SessionError::Inconsistent(undo.to_string()))?;
            self.reconsume_origin(&origin)?;
            self.move_state = MoveState::SelectedForMove { origin };
            return Err(SessionError::PlacementRace { class_id, reason });
        }

        self.move_state = MoveState::Idle;
        Ok(())
    }

    /// Remove a class and give its window back to the professor.
    pub fn remove_class(&mut self, class_id: i64) -> Result<ClassSlotAssignment, SessionError> {
        if self.pending_move().is_some_and(|o| o.class_id == class_id) {
            return Err(SessionError::MoveInProgress(class_id));
        }
        let removed = self.apply_remove(class_id)?;
        self.ledger
            .release(removed.professor_id, removed.day, removed.interval);
        Ok(removed)
    }

    fn commit_place(&mut self, assignment: ClassSlotAssignment) -> Result<(), SessionError> {
        self.apply_place(assignment)?;
        if let Err(reason) = self.ledger.consume(
            assignment.professor_id,
            assignment.day,
            assignment.interval,
        ) {
            self.apply_remove(assignment.class_id)
                .map_err(|undo| SessionError::Inconsistent(undo.to_string()))?;
            return Err(SessionError::Ledger(reason));
        }
        Ok(())
    }

    fn apply_place(&mut self, assignment: ClassSlotAssignment) -> Result<(), SessionError> {
        let section_grid = self
            .section_grids
            .entry(assignment.section_id)
            .or_insert_with(|| WeeklyGrid::for_section(assignment.section_id));
        section_grid.place(assignment)?;

        let classroom_grid = self
            .classroom_grids
            .entry(assignment.classroom_id)
            .or_insert_with(|| WeeklyGrid::for_classroom(assignment.classroom_id));
        if let Err(err) = classroom_grid.place(assignment) {
            self.section_grids
                .get_mut(&assignment.section_id)
                .and_then(|grid| grid.remove(assignment.class_id).ok())
                .ok_or_else(|| SessionError::Inconsistent(err.to_string()))?;
            return Err(SessionError::Grid(err));
        }

        self.professor_index.insert(&assignment);
        self.class_sections
            .insert(assignment.class_id, assignment.section_id);
        Ok(())
    }

    fn apply_remove(&mut self, class_id: i64) -> Result<ClassSlotAssignment, SessionError> {
        let section_id = *self
            .class_sections
            .get(&class_id)
            .ok_or(SessionError::UnknownClass(class_id))?;
        let section_grid = self.section_grids.get_mut(&section_id).ok_or_else(|| {
            SessionError::Inconsistent(format!("section {section_id} has no grid"))
        })?;
        let removed = section_grid.remove(class_id)?;

        let classroom_grid = self
            .classroom_grids
            .get_mut(&removed.classroom_id)
            .ok_or_else(|| {
                SessionError::Inconsistent(format!(
                    "classroom {} has no grid",
                    removed.classroom_id
                ))
            })?;
        classroom_grid.remove(class_id)?;

        self.professor_index.remove(&removed);
        self.class_sections.remove(&class_id);
        Ok(removed)
    }

    /// Undo a `release` of the origin window during rollback. The window
    /// was free a moment ago, so a failure here means real corruption.
    fn reconsume_origin(&mut self, origin: &ClassSlotAssignment) -> Result<(), SessionError> {
        self.ledger
            .consume(origin.professor_id, origin.day, origin.interval)
            .map_err(|err| {
                SessionError::Inconsistent(format!(
                    "origin window of class {} vanished during rollback: {err}",
                    origin.class_id
                ))
            })
    }
}
