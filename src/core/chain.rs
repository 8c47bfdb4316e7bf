//! Hash chain engine.
//!
//! `previous_hash` is assigned once, when a record is created, from the
//! employee's latest existing record. `current_hash` is recomputed on
//! every save from the record's canonical content.

use crate::core::canonical::canonical_bytes;
use crate::core::digest::digest;
use crate::errors::{AppError, AppResult};
use crate::models::timecard::Timecard;

/// Read access to persisted records, handed to the chain engine and the
/// verifier. Ordering is always (date, created_at, id).
pub trait ChainReader {
    /// Latest record for `employee_id`, skipping `excluding` when given.
    fn latest_for_employee(
        &self,
        employee_id: &str,
        excluding: Option<i64>,
    ) -> AppResult<Option<Timecard>>;

    /// Every record for `employee_id`, oldest first, deleted ones included.
    fn chain_for_employee(&self, employee_id: &str) -> AppResult<Vec<Timecard>>;
}

/// Hash of the record that precedes a new one, or `None` for the first
/// record of the employee. A failed lookup aborts: treating it as "no
/// predecessor" would forge a chain start.
pub fn assign_previous_hash(
    reader: &dyn ChainReader,
    employee_id: &str,
    excluding: Option<i64>,
) -> AppResult<Option<String>> {
    let latest = reader
        .latest_for_employee(employee_id, excluding)
        .map_err(|e| AppError::ChainLookup(format!("employee {}: {}", employee_id, e)))?;

    match latest {
        None => Ok(None),
        Some(tc) => match tc.current_hash {
            Some(h) => Ok(Some(h)),
            None => Err(AppError::ChainLookup(format!(
                "timecard {} of employee {} has no current hash",
                tc.id, employee_id
            ))),
        },
    }
}

pub fn compute_current_hash(tc: &Timecard) -> AppResult<String> {
    Ok(digest(&canonical_bytes(tc)?))
}

/// Stamp `current_hash` from the record's present content.
pub fn seal(tc: &mut Timecard) -> AppResult<()> {
    tc.current_hash = Some(compute_current_hash(tc)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::punch::{CaptureMetadata, Punch};
    use crate::models::punch_type::PunchType;
    use chrono::{TimeZone, Utc};

    struct Fixed(Vec<Timecard>);

    impl ChainReader for Fixed {
        fn latest_for_employee(&self, employee_id: &str, excluding: Option<i64>) -> AppResult<Option<Timecard>> {
            Ok(self
                .0
                .iter()
                .filter(|t| t.employee_id == employee_id && Some(t.id) != excluding)
                .max_by_key(|t| (t.date, t.created_at, t.id))
                .cloned())
        }

        fn chain_for_employee(&self, employee_id: &str) -> AppResult<Vec<Timecard>> {
            Ok(self.0.iter().filter(|t| t.employee_id == employee_id).cloned().collect())
        }
    }

    struct Broken;

    impl ChainReader for Broken {
        fn latest_for_employee(&self, _: &str, _: Option<i64>) -> AppResult<Option<Timecard>> {
            Err(AppError::Other("disk I/O error".into()))
        }

        fn chain_for_employee(&self, _: &str) -> AppResult<Vec<Timecard>> {
            Err(AppError::Other("disk I/O error".into()))
        }
    }

    fn record(id: i64, day: u32, hash: &str) -> Timecard {
        let at = Utc.with_ymd_and_hms(2025, 3, day, 8, 0, 0).unwrap();
        let mut tc = Timecard::blank("emp", at.date_naive(), at);
        tc.id = id;
        tc.current_hash = Some(hash.into());
        tc
    }

    #[test]
    fn first_record_has_no_predecessor() {
        assert_eq!(assign_previous_hash(&Fixed(vec![]), "emp", None).unwrap(), None);
    }

    #[test]
    fn latest_by_date_wins_and_exclusion_applies() {
        let reader = Fixed(vec![record(1, 3, "aaa"), record(3, 5, "ccc"), record(2, 4, "bbb")]);
        assert_eq!(
            assign_previous_hash(&reader, "emp", None).unwrap().as_deref(),
            Some("ccc")
        );
        assert_eq!(
            assign_previous_hash(&reader, "emp", Some(3)).unwrap().as_deref(),
            Some("bbb")
        );
        assert_eq!(assign_previous_hash(&reader, "other", None).unwrap(), None);
    }

    #[test]
    fn lookup_failure_is_not_a_chain_start() {
        let err = assign_previous_hash(&Broken, "emp", None).unwrap_err();
        assert!(matches!(err, AppError::ChainLookup(_)));
    }

    #[test]
    fn unsealed_predecessor_is_a_lookup_failure() {
        let mut tc = record(1, 3, "x");
        tc.current_hash = None;
        let err = assign_previous_hash(&Fixed(vec![tc]), "emp", None).unwrap_err();
        assert!(matches!(err, AppError::ChainLookup(_)));
    }

    #[test]
    fn hash_tracks_content_and_link() {
        let mut tc = record(1, 3, "x");
        tc.current_hash = None;
        seal(&mut tc).unwrap();
        let first = tc.current_hash.clone().unwrap();
        assert_eq!(first.len(), 64);

        tc.punches.push(Punch::new(
            PunchType::ClockIn,
            tc.created_at,
            CaptureMetadata::default(),
        ));
        assert_ne!(compute_current_hash(&tc).unwrap(), first);

        let mut linked = record(1, 3, "x");
        linked.previous_hash = Some("abc".into());
        let mut unlinked = record(1, 3, "x");
        unlinked.previous_hash = None;
        assert_ne!(
            compute_current_hash(&linked).unwrap(),
            compute_current_hash(&unlinked).unwrap()
        );
    }
}
