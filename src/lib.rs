pub mod assignment;
pub mod availability;
pub mod config;
pub mod conflict;
pub mod day;
pub mod grid;
pub mod persistence;
pub mod session;
pub mod time;

pub use assignment::ClassSlotAssignment;
pub use availability::{AvailabilityLedger, AvailabilityWindow, LedgerError};
pub use config::TimetableConfig;
pub use conflict::{
    check_placement, ConflictReason, ConflictReport, PlacementContext, PlacementProposal,
};
pub use day::ClassDay;
pub use grid::{GridError, GridOwner, ProfessorAssignmentIndex, WeeklyGrid};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTimetableStore;
pub use persistence::{
    load_availability_from_csv, load_session_from_json, save_availability_to_csv,
    save_session_to_json, PersistenceError, PersistenceResult, TimetableStore,
};
pub use session::{PlacementOutcome, PlacementTarget, SchedulingSession, SessionError};
pub use time::{TimeError, TimeInterval, TimeOfDay};
