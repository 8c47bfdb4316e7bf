// src/export/model.rs

use crate::models::punch_type::PunchType;
use crate::models::timecard::Timecard;
use serde::Serialize;

/// Flat, one-row-per-timecard view used by the CSV export.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TimecardExport {
    pub id: i64,
    pub employee_id: String,
    pub date: String,
    pub status: String,
    pub first_in: String,
    pub last_out: String,
    pub punches: usize,
    pub work_minutes: i64,
    pub break_minutes: i64,
    pub gross_minutes: i64,
    pub overtime_minutes: i64,
    pub approved_overtime_minutes: i64,
    pub policy_version: String,
    pub deleted: bool,
    pub previous_hash: String,
    pub current_hash: String,
}

impl From<&Timecard> for TimecardExport {
    fn from(tc: &Timecard) -> Self {
        let first_in = tc
            .punches
            .iter()
            .find(|p| p.kind == PunchType::ClockIn)
            .map(|p| p.time_str())
            .unwrap_or_default();
        let last_out = tc
            .punches
            .iter()
            .rev()
            .find(|p| p.kind == PunchType::ClockOut)
            .map(|p| p.time_str())
            .unwrap_or_default();

        Self {
            id: tc.id,
            employee_id: tc.employee_id.clone(),
            date: tc.date_str(),
            status: tc.status.to_db_str().to_string(),
            first_in,
            last_out,
            punches: tc.punches.len(),
            work_minutes: tc.totals.work_minutes,
            break_minutes: tc.totals.break_minutes,
            gross_minutes: tc.totals.gross_minutes,
            overtime_minutes: tc.totals.overtime_minutes,
            approved_overtime_minutes: tc.overtime.approved_minutes,
            policy_version: tc.policy_version.clone().unwrap_or_default(),
            deleted: tc.is_deleted,
            previous_hash: tc.previous_hash.clone().unwrap_or_default(),
            current_hash: tc.current_hash.clone().unwrap_or_default(),
        }
    }
}
