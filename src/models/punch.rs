use super::punch_type::PunchType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CaptureMethod {
    Manual,
    Automatic,
    #[default]
    Station,
}

impl CaptureMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMethod::Manual => "Manual",
            CaptureMethod::Automatic => "Automatic",
            CaptureMethod::Station => "Station",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "manual" | "m" => Some(CaptureMethod::Manual),
            "automatic" | "auto" | "a" => Some(CaptureMethod::Automatic),
            "station" | "s" => Some(CaptureMethod::Station),
            _ => None,
        }
    }
}

/// Review state of a single punch. Shared by the record status and the
/// overtime approval, which use the same three values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Approved => "Approved",
            ReviewStatus::Rejected => "Rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "pending" => Some(ReviewStatus::Pending),
            "approved" | "approve" => Some(ReviewStatus::Approved),
            "rejected" | "reject" => Some(ReviewStatus::Rejected),
            _ => None,
        }
    }
}

/// Where and how a punch was captured. None of it feeds the totals, all
/// of it feeds the record digest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptureMetadata {
    pub image: Option<String>,
    pub station: Option<String>,
    pub location: Option<String>,
    pub method: CaptureMethod,
    pub ip: Option<String>,
    pub note: Option<String>,
}

impl CaptureMetadata {
    pub fn manual() -> Self {
        Self {
            method: CaptureMethod::Manual,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Punch {
    /// Per-record sequence number; survives re-sorting.
    pub seq: u32,
    #[serde(rename = "type")]
    pub kind: PunchType,
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub metadata: CaptureMetadata,
    pub status: ReviewStatus,
}

impl Punch {
    pub fn new(kind: PunchType, time: DateTime<Utc>, metadata: CaptureMetadata) -> Self {
        Self {
            seq: 0,
            kind,
            time,
            metadata,
            status: ReviewStatus::Pending,
        }
    }

    pub fn time_str(&self) -> String {
        self.time
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }
}
