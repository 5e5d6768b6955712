use crate::time::TimeError;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Instructional weekday. Sunday is excluded everywhere: conversion and
/// parsing reject it instead of letting it slip into a grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ClassDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl ClassDay {
    pub const ALL: [ClassDay; 6] = [
        ClassDay::Monday,
        ClassDay::Tuesday,
        ClassDay::Wednesday,
        ClassDay::Thursday,
        ClassDay::Friday,
        ClassDay::Saturday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClassDay::Monday => "monday",
            ClassDay::Tuesday => "tuesday",
            ClassDay::Wednesday => "wednesday",
            ClassDay::Thursday => "thursday",
            ClassDay::Friday => "friday",
            ClassDay::Saturday => "saturday",
        }
    }
}

impl fmt::Display for ClassDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<Weekday> for ClassDay {
    type Error = TimeError;

    fn try_from(value: Weekday) -> Result<Self, Self::Error> {
        match value {
            Weekday::Mon => Ok(ClassDay::Monday),
            Weekday::Tue => Ok(ClassDay::Tuesday),
            Weekday::Wed => Ok(ClassDay::Wednesday),
            Weekday::Thu => Ok(ClassDay::Thursday),
            Weekday::Fri => Ok(ClassDay::Friday),
            Weekday::Sat => Ok(ClassDay::Saturday),
            Weekday::Sun => Err(TimeError::NonInstructionalDay),
        }
    }
}

impl From<ClassDay> for Weekday {
    fn from(value: ClassDay) -> Self {
        match value {
            ClassDay::Monday => Weekday::Mon,
            ClassDay::Tuesday => Weekday::Tue,
            ClassDay::Wednesday => Weekday::Wed,
            ClassDay::Thursday => Weekday::Thu,
            ClassDay::Friday => Weekday::Fri,
            ClassDay::Saturday => Weekday::Sat,
        }
    }
}

impl FromStr for ClassDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(ClassDay::Monday),
            "tuesday" | "tue" => Ok(ClassDay::Tuesday),
            "wednesday" | "wed" => Ok(ClassDay::Wednesday),
            "thursday" | "thu" => Ok(ClassDay::Thursday),
            "friday" | "fri" => Ok(ClassDay::Friday),
            "saturday" | "sat" => Ok(ClassDay::Saturday),
            "sunday" | "sun" => Err(TimeError::NonInstructionalDay),
            _ => Err(TimeError::Parse(s.to_string())),
        }
    }
}
