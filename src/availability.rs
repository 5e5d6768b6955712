use crate::day::ClassDay;
use crate::time::TimeInterval;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Persistence-boundary form of one free interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub professor_id: i64,
    pub day: ClassDay,
    pub interval: TimeInterval,
}

impl AvailabilityWindow {
    pub fn new(professor_id: i64, day: ClassDay, interval: TimeInterval) -> Self {
        Self {
            professor_id,
            day,
            interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    NotAvailable {
        professor_id: i64,
        day: ClassDay,
        interval: TimeInterval,
    },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::NotAvailable {
                professor_id,
                day,
                interval,
            } => write!(
                f,
                "professor {professor_id} has no free window covering {day} {interval}"
            ),
        }
    }
}

impl std::error::Error for LedgerError {}

/// Free time per professor and day. The ledger is the source of truth for
/// free time; occupied time is whatever is not here. Windows for one
/// (professor, day) are kept sorted, merged and non-overlapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityLedger {
    windows: HashMap<(i64, ClassDay), Vec<TimeInterval>>,
}

impl AvailabilityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_availability(
        &mut self,
        professor_id: i64,
        day: ClassDay,
        interval: TimeInterval,
    ) {
        let windows = self.windows.entry((professor_id, day)).or_default();
        windows.push(interval);
        *windows = TimeInterval::merge(windows);
    }

    pub fn register_window(&mut self, window: AvailabilityWindow) {
        self.register_availability(window.professor_id, window.day, window.interval);
    }

    /// Take `interval` out of the professor's free time. The interval must
    /// sit entirely inside one free window; partial overlap is rejected so
    /// a half-available slot never looks placeable.
    pub fn consume(
        &mut self,
        professor_id: i64,
        day: ClassDay,
        interval: TimeInterval,
    ) -> Result<(), LedgerError> {
        let key = (professor_id, day);
        let Some(windows) = self.windows.get_mut(&key) else {
            return Err(LedgerError::NotAvailable {
                professor_id,
                day,
                interval,
            });
        };
        let Some(index) = windows.iter().position(|w| w.contains(&interval)) else {
            return Err(LedgerError::NotAvailable {
                professor_id,
                day,
                interval,
            });
        };
        let remainders = windows[index].subtract(&interval);
        windows.splice(index..=index, remainders);
        if windows.is_empty() {
            self.windows.remove(&key);
        }
        Ok(())
    }

    /// Give `interval` back, merging with any adjacent free time. The exact
    /// inverse of a prior `consume` with the same arguments.
    pub fn release(&mut self, professor_id: i64, day: ClassDay, interval: TimeInterval) {
        self.register_availability(professor_id, day, interval);
    }

    pub fn is_available(
        &self,
        professor_id: i64,
        day: ClassDay,
        interval: &TimeInterval,
    ) -> bool {
        self.windows_for(professor_id, day)
            .iter()
            .any(|w| w.contains(interval))
    }

    pub fn windows_for(&self, professor_id: i64, day: ClassDay) -> &[TimeInterval] {
        self.windows
            .get(&(professor_id, day))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All of one professor's free windows, ordered by day then start.
    pub fn snapshot(&self, professor_id: i64) -> Vec<AvailabilityWindow> {
        let mut windows = Vec::new();
        for day in ClassDay::ALL {
            for interval in self.windows_for(professor_id, day) {
                windows.push(AvailabilityWindow::new(professor_id, day, *interval));
            }
        }
        windows
    }

    /// Every registered window, ordered by professor, day, start.
    pub fn all_windows(&self) -> Vec<AvailabilityWindow> {
        let mut professors: Vec<i64> = self.windows.keys().map(|(id, _)| *id).collect();
        professors.sort_unstable();
        professors.dedup();
        professors
            .into_iter()
            .flat_map(|id| self.snapshot(id))
            .collect()
    }
}
