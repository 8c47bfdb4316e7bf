//! Punch list ownership: insertion in time order, backfill construction,
//! and keeping totals in step with the punches.

use crate::core::calculator::compute_totals;
use crate::errors::{AppError, AppResult};
use crate::models::punch::Punch;
use crate::models::punch_type::PunchType;
use crate::models::timecard::{Rules, Timecard};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, SubsecRound, Utc};

/// Policy stamped onto a record when it is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub version: String,
    pub paid_break: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            paid_break: false,
        }
    }
}

/// Keep the list sorted by time. Equal instants keep arrival order.
fn insert_sorted(punches: &mut Vec<Punch>, punch: Punch) {
    let idx = punches.partition_point(|p| p.time <= punch.time);
    punches.insert(idx, punch);
}

pub(crate) fn validate_time(time: &DateTime<Utc>) -> AppResult<()> {
    if time.timestamp() <= 0 {
        return Err(AppError::Validation(format!(
            "punch time {} is not a valid capture timestamp",
            time.to_rfc3339()
        )));
    }
    Ok(())
}

/// Re-sort punches and refresh the derived totals.
pub fn recompute(tc: &mut Timecard) {
    tc.punches.sort_by_key(|p| p.time);
    tc.totals = compute_totals(&tc.punches);
}

/// Insert `punch` into `tc` keeping time order, then recompute totals.
/// Returns the sequence number given to the punch.
pub fn append_punch(tc: &mut Timecard, mut punch: Punch) -> AppResult<u32> {
    if tc.is_deleted {
        return Err(AppError::Validation(format!(
            "timecard {} is deleted and cannot take new punches",
            tc.id
        )));
    }
    validate_time(&punch.time)?;

    punch.seq = tc.next_seq();
    punch.time = punch.time.trunc_subsecs(3);
    let seq = punch.seq;

    insert_sorted(&mut tc.punches, punch);
    tc.totals = compute_totals(&tc.punches);
    Ok(seq)
}

fn new_record(employee_id: &str, date: NaiveDate, policy: &Policy, now: DateTime<Utc>) -> AppResult<Timecard> {
    if employee_id.trim().is_empty() {
        return Err(AppError::Validation("employee id must not be empty".into()));
    }
    let mut tc = Timecard::blank(employee_id.trim(), date, now.trunc_subsecs(3));
    tc.policy_version = Some(policy.version.clone());
    tc.rules = Rules {
        paid_break: policy.paid_break,
    };
    Ok(tc)
}

/// First record of the day, opened by `punch`. Chain fields are left for
/// the hash chain engine.
pub fn create_for_day(
    employee_id: &str,
    date: NaiveDate,
    punch: Punch,
    policy: &Policy,
    now: DateTime<Utc>,
) -> AppResult<Timecard> {
    let mut tc = new_record(employee_id, date, policy, now)?;
    append_punch(&mut tc, punch)?;
    Ok(tc)
}

/// Manual backfill: a record built from a complete punch list.
pub fn supplement(
    employee_id: &str,
    date: NaiveDate,
    punches: Vec<Punch>,
    policy: &Policy,
    now: DateTime<Utc>,
) -> AppResult<Timecard> {
    if punches.is_empty() {
        return Err(AppError::Validation(
            "a supplemented timecard needs at least one punch".into(),
        ));
    }

    let mut tc = new_record(employee_id, date, policy, now)?;
    for p in punches {
        append_punch(&mut tc, p)?;
    }
    Ok(tc)
}

/// Parse a textual punch `kind@time` relative to `date`.
///
/// `time` is either `HH:MM` (local time on `date`) or an RFC 3339 instant.
pub fn parse_punch_spec(spec: &str, date: NaiveDate) -> AppResult<(PunchType, DateTime<Utc>)> {
    let (kind_str, time_str) = spec.split_once('@').ok_or_else(|| {
        AppError::Validation(format!("invalid punch '{}': expected KIND@TIME", spec))
    })?;

    let kind = PunchType::from_code(kind_str).ok_or_else(|| {
        AppError::Validation(format!(
            "invalid punch type '{}': use in, out, break-start or break-end",
            kind_str
        ))
    })?;

    Ok((kind, parse_punch_time(time_str, date)?))
}

/// `HH:MM` as local time on `date`, or an RFC 3339 instant.
pub fn parse_punch_time(time_str: &str, date: NaiveDate) -> AppResult<DateTime<Utc>> {
    let time_str = time_str.trim();
    if let Ok(t) = NaiveTime::parse_from_str(time_str, "%H:%M") {
        return Ok(date
            .and_time(t)
            .and_local_timezone(Local)
            .single()
            .ok_or_else(|| AppError::InvalidTime(format!("{} on {} is ambiguous", time_str, date)))?
            .with_timezone(&Utc));
    }

    Ok(DateTime::parse_from_rfc3339(time_str)
        .map_err(|_| AppError::InvalidTime(time_str.to_string()))?
        .with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::punch::CaptureMetadata;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, h, m, 0).unwrap()
    }

    fn punch(kind: PunchType, h: u32, m: u32) -> Punch {
        Punch::new(kind, at(h, m), CaptureMetadata::default())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn out_of_order_append_is_resorted_and_totals_follow() {
        let mut tc =
            create_for_day("emp", day(), punch(PunchType::ClockIn, 8, 0), &Policy::default(), at(8, 0))
                .unwrap();
        append_punch(&mut tc, punch(PunchType::ClockOut, 16, 0)).unwrap();
        append_punch(&mut tc, punch(PunchType::BreakEnd, 12, 30)).unwrap();
        append_punch(&mut tc, punch(PunchType::BreakStart, 12, 0)).unwrap();

        let kinds: Vec<_> = tc.punches.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PunchType::ClockIn,
                PunchType::BreakStart,
                PunchType::BreakEnd,
                PunchType::ClockOut
            ]
        );
        assert_eq!(tc.totals.work_minutes, 450);
        assert_eq!(tc.totals.break_minutes, 30);
        let seqs: Vec<_> = tc.punches.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![1, 4, 3, 2]);
    }

    #[test]
    fn create_stamps_policy_and_leaves_chain_fields_empty() {
        let policy = Policy {
            version: "2025.1".into(),
            paid_break: true,
        };
        let tc = create_for_day("emp", day(), punch(PunchType::ClockIn, 8, 0), &policy, at(8, 0))
            .unwrap();
        assert_eq!(tc.policy_version.as_deref(), Some("2025.1"));
        assert!(tc.rules.paid_break);
        assert!(tc.previous_hash.is_none());
        assert!(tc.current_hash.is_none());
    }

    #[test]
    fn supplement_requires_punches_and_an_employee() {
        let err = supplement("emp", day(), vec![], &Policy::default(), at(9, 0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = supplement(" ", day(), vec![punch(PunchType::ClockIn, 8, 0)], &Policy::default(), at(9, 0))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn epoch_timestamps_are_rejected() {
        let bogus = Punch::new(
            PunchType::ClockIn,
            DateTime::<Utc>::UNIX_EPOCH,
            CaptureMetadata::default(),
        );
        let err = create_for_day("emp", day(), bogus, &Policy::default(), at(8, 0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn deleted_records_refuse_punches() {
        let mut tc =
            create_for_day("emp", day(), punch(PunchType::ClockIn, 8, 0), &Policy::default(), at(8, 0))
                .unwrap();
        tc.is_deleted = true;
        assert!(append_punch(&mut tc, punch(PunchType::ClockOut, 9, 0)).is_err());
    }

    #[test]
    fn punch_specs_parse_rfc3339_and_reject_garbage() {
        let (kind, time) = parse_punch_spec("out@2025-03-03T16:00:00Z", day()).unwrap();
        assert_eq!(kind, PunchType::ClockOut);
        assert_eq!(time, at(16, 0));

        let (kind, _) = parse_punch_spec("break-start@12:00", day()).unwrap();
        assert_eq!(kind, PunchType::BreakStart);

        assert!(matches!(
            parse_punch_spec("lunch@12:00", day()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_punch_spec("in@25:99", day()),
            Err(AppError::InvalidTime(_))
        ));
        assert!(parse_punch_spec("in", day()).is_err());
    }
}
