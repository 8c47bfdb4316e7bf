use super::punch::{Punch, ReviewStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Minute totals derived from the punch list. Never edited by hand.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub work_minutes: i64,
    pub break_minutes: i64,
    pub gross_minutes: i64,
    pub overtime_minutes: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    /// Carried and hashed, but the calculator does not consult it yet.
    pub paid_break: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TimecardStatus {
    Draft,
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl TimecardStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TimecardStatus::Draft => "Draft",
            TimecardStatus::Pending => "Pending",
            TimecardStatus::Approved => "Approved",
            TimecardStatus::Rejected => "Rejected",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(TimecardStatus::Draft),
            "Pending" => Some(TimecardStatus::Pending),
            "Approved" => Some(TimecardStatus::Approved),
            "Rejected" => Some(TimecardStatus::Rejected),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "draft" => Some(TimecardStatus::Draft),
            "pending" => Some(TimecardStatus::Pending),
            "approved" | "approve" => Some(TimecardStatus::Approved),
            "rejected" | "reject" => Some(TimecardStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OvertimeApproval {
    pub approved_minutes: i64,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub reason: String,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl FieldChange {
    pub fn new(field: &str, old: impl ToString, new: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            old_value: Some(old.to_string()),
            new_value: Some(new.to_string()),
        }
    }
}

/// One administrative action. Informational only: the audit log is not
/// part of the hashed content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub punch_seq: Option<u32>,
    pub action: AuditAction,
    pub changes: Vec<FieldChange>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Timecard {
    pub id: i64, // ⇔ timecards.id (0 until inserted)
    pub employee_id: String,
    pub date: NaiveDate, // ⇔ calendar-day key "YYYY-MM-DD"
    pub punches: Vec<Punch>,
    pub totals: Totals,
    pub policy_version: Option<String>,
    pub rules: Rules,
    pub overtime: OvertimeApproval,
    pub status: TimecardStatus,
    pub audit_log: Vec<AuditEntry>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<String>,
    pub previous_hash: Option<String>,
    pub current_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

impl Timecard {
    /// Unsaved record with no punches and no chain fields yet.
    pub fn blank(employee_id: &str, date: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            employee_id: employee_id.to_string(),
            date,
            punches: Vec::new(),
            totals: Totals::default(),
            policy_version: None,
            rules: Rules::default(),
            overtime: OvertimeApproval::default(),
            status: TimecardStatus::default(),
            audit_log: Vec::new(),
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
            previous_hash: None,
            current_hash: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn punch(&self, seq: u32) -> Option<&Punch> {
        self.punches.iter().find(|p| p.seq == seq)
    }

    pub fn punch_mut(&mut self, seq: u32) -> Option<&mut Punch> {
        self.punches.iter_mut().find(|p| p.seq == seq)
    }

    pub fn next_seq(&self) -> u32 {
        self.punches.iter().map(|p| p.seq).max().map_or(1, |m| m + 1)
    }

    pub fn short_hash(&self) -> String {
        self.current_hash
            .as_deref()
            .map(|h| h.chars().take(12).collect())
            .unwrap_or_else(|| "-".to_string())
    }
}
