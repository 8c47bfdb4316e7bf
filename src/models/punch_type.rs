use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PunchType {
    #[serde(rename = "Clock In")]
    ClockIn,
    #[serde(rename = "Clock Out")]
    ClockOut,
    #[serde(rename = "Break Start")]
    BreakStart,
    #[serde(rename = "Break End")]
    BreakEnd,
}

impl PunchType {
    pub const ALL: [PunchType; 4] = [
        PunchType::ClockIn,
        PunchType::ClockOut,
        PunchType::BreakStart,
        PunchType::BreakEnd,
    ];

    /// Convert enum → DB / canonical string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PunchType::ClockIn => "Clock In",
            PunchType::ClockOut => "Clock Out",
            PunchType::BreakStart => "Break Start",
            PunchType::BreakEnd => "Break End",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.to_db_str() == s)
    }

    /// Lenient parser for CLI input: accepts the display names plus
    /// short aliases (`in`, `out`, `break-start`, `break-end`).
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "in" | "clock-in" => Some(PunchType::ClockIn),
            "out" | "clock-out" => Some(PunchType::ClockOut),
            "break-start" | "bs" => Some(PunchType::BreakStart),
            "break-end" | "be" => Some(PunchType::BreakEnd),
            _ => None,
        }
    }
}

impl fmt::Display for PunchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
