//! Read-only integrity checks over stored records. Detection only: the
//! verifier never rewrites anything.

use crate::core::chain::{ChainReader, compute_current_hash};
use crate::errors::AppResult;
use crate::models::timecard::Timecard;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIntegrity {
    pub is_valid: bool,
    pub calculated_hash: String,
    pub stored_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    HashMismatch,
    ChainBroken,
}

impl ViolationKind {
    pub fn label(&self) -> &'static str {
        match self {
            ViolationKind::HashMismatch => "Hash mismatch",
            ViolationKind::ChainBroken => "Chain broken",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub timecard_id: i64,
    pub date: NaiveDate,
    pub issue: ViolationKind,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub employee_id: String,
    pub is_valid: bool,
    pub timecards_checked: usize,
    pub violations: Vec<Violation>,
}

pub fn verify_record(tc: &Timecard) -> AppResult<RecordIntegrity> {
    let calculated = compute_current_hash(tc)?;
    Ok(RecordIntegrity {
        is_valid: tc.current_hash.as_deref() == Some(calculated.as_str()),
        calculated_hash: calculated,
        stored_hash: tc.current_hash.clone(),
    })
}

/// Check `records`, already ordered oldest first, as one chain.
pub fn verify_records(employee_id: &str, records: &[Timecard]) -> AppResult<ChainReport> {
    let mut violations = Vec::new();
    let mut expected_prev: Option<&str> = None;

    for tc in records {
        let integrity = verify_record(tc)?;
        if !integrity.is_valid {
            violations.push(Violation {
                timecard_id: tc.id,
                date: tc.date,
                issue: ViolationKind::HashMismatch,
                details: format!(
                    "stored {} but content hashes to {}",
                    integrity.stored_hash.as_deref().unwrap_or("<none>"),
                    integrity.calculated_hash
                ),
            });
        }

        if tc.previous_hash.as_deref() != expected_prev {
            violations.push(Violation {
                timecard_id: tc.id,
                date: tc.date,
                issue: ViolationKind::ChainBroken,
                details: format!(
                    "expected previousHash {}, found {}",
                    expected_prev.unwrap_or("<none>"),
                    tc.previous_hash.as_deref().unwrap_or("<none>")
                ),
            });
        }

        expected_prev = tc.current_hash.as_deref();
    }

    Ok(ChainReport {
        employee_id: employee_id.to_string(),
        is_valid: violations.is_empty(),
        timecards_checked: records.len(),
        violations,
    })
}

/// Walk the full stored history of `employee_id`. No records means a
/// vacuously valid chain.
pub fn verify_chain(reader: &dyn ChainReader, employee_id: &str) -> AppResult<ChainReport> {
    let records = reader.chain_for_employee(employee_id)?;
    verify_records(employee_id, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chain::seal;
    use chrono::{TimeZone, Utc};

    fn chain_of(n: u32) -> Vec<Timecard> {
        let mut out: Vec<Timecard> = Vec::new();
        for i in 0..n {
            let at = Utc.with_ymd_and_hms(2025, 3, 3 + i, 8, 0, 0).unwrap();
            let mut tc = Timecard::blank("emp", at.date_naive(), at);
            tc.id = i as i64 + 1;
            tc.previous_hash = out.last().and_then(|p| p.current_hash.clone());
            seal(&mut tc).unwrap();
            out.push(tc);
        }
        out
    }

    #[test]
    fn empty_history_is_valid() {
        let report = verify_records("emp", &[]).unwrap();
        assert!(report.is_valid);
        assert_eq!(report.timecards_checked, 0);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn intact_chain_passes() {
        let report = verify_records("emp", &chain_of(4)).unwrap();
        assert!(report.is_valid, "{:?}", report.violations);
        assert_eq!(report.timecards_checked, 4);
    }

    #[test]
    fn tampered_totals_are_a_hash_mismatch() {
        let mut chain = chain_of(3);
        chain[1].totals.work_minutes = 999;

        assert!(!verify_record(&chain[1]).unwrap().is_valid);
        let report = verify_records("emp", &chain).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].timecard_id, 2);
        assert_eq!(report.violations[0].issue, ViolationKind::HashMismatch);
    }

    #[test]
    fn resealed_edit_breaks_the_next_link() {
        let mut chain = chain_of(3);
        chain[0].totals.work_minutes = 1;
        seal(&mut chain[0]).unwrap();

        let report = verify_records("emp", &chain).unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].timecard_id, 2);
        assert_eq!(report.violations[0].issue, ViolationKind::ChainBroken);
    }

    #[test]
    fn first_record_must_not_claim_a_predecessor() {
        let mut chain = chain_of(1);
        chain[0].previous_hash = Some("deadbeef".into());
        seal(&mut chain[0]).unwrap();

        let report = verify_records("emp", &chain).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].issue, ViolationKind::ChainBroken);
    }
}
