use crate::models::punch::Punch;
use crate::models::punch_type::PunchType;
use crate::models::timecard::Totals;
use chrono::{DateTime, Utc};

/// Work minutes above this count as overtime (8h).
pub const REGULAR_THRESHOLD_MINUTES: i64 = 480;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Working(DateTime<Utc>),
    OnBreak(DateTime<Utc>),
}

fn ms_to_minutes(ms: i64) -> i64 {
    (ms as f64 / 60_000.0).round() as i64
}

/// Derive minute totals from a punch list sorted by time.
///
/// Only well-formed open/close pairs contribute. A punch that does not fit
/// the current state (second ClockIn while working, BreakEnd without a
/// break, ...) is skipped, so a forgotten clock-out never fails the
/// computation. `rules.paidBreak` is not consulted: gross always includes
/// break time.
pub fn compute_totals(punches: &[Punch]) -> Totals {
    let mut state = State::Idle;
    let mut work_ms: i64 = 0;
    let mut break_ms: i64 = 0;

    for p in punches {
        state = match (state, p.kind) {
            (State::Idle, PunchType::ClockIn) => State::Working(p.time),

            (State::Working(start), PunchType::ClockOut) => {
                work_ms += (p.time - start).num_milliseconds();
                State::Idle
            }

            (State::Working(start), PunchType::BreakStart) => {
                work_ms += (p.time - start).num_milliseconds();
                State::OnBreak(p.time)
            }

            (State::OnBreak(start), PunchType::BreakEnd) => {
                break_ms += (p.time - start).num_milliseconds();
                State::Working(p.time)
            }

            // out of sequence: accepted, ignored
            (s, _) => s,
        };
    }

    let work_minutes = ms_to_minutes(work_ms);
    let break_minutes = ms_to_minutes(break_ms);

    Totals {
        work_minutes,
        break_minutes,
        gross_minutes: work_minutes + break_minutes,
        overtime_minutes: (work_minutes - REGULAR_THRESHOLD_MINUTES).max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::punch::CaptureMetadata;
    use chrono::TimeZone;

    fn p(kind: PunchType, h: u32, m: u32) -> Punch {
        let t = Utc.with_ymd_and_hms(2025, 3, 3, h, m, 0).unwrap();
        Punch::new(kind, t, CaptureMetadata::default())
    }

    use PunchType::*;

    #[test]
    fn straight_eight_hour_shift() {
        let t = compute_totals(&[p(ClockIn, 8, 0), p(ClockOut, 16, 0)]);
        assert_eq!(t.work_minutes, 480);
        assert_eq!(t.break_minutes, 0);
        assert_eq!(t.gross_minutes, 480);
        assert_eq!(t.overtime_minutes, 0);
    }

    #[test]
    fn shift_with_half_hour_break() {
        let t = compute_totals(&[
            p(ClockIn, 8, 0),
            p(BreakStart, 12, 0),
            p(BreakEnd, 12, 30),
            p(ClockOut, 16, 30),
        ]);
        assert_eq!(t.work_minutes, 480);
        assert_eq!(t.break_minutes, 30);
        assert_eq!(t.gross_minutes, 510);
        assert_eq!(t.overtime_minutes, 0);
    }

    #[test]
    fn nine_hours_gives_one_hour_overtime() {
        let t = compute_totals(&[p(ClockIn, 9, 0), p(ClockOut, 18, 0)]);
        assert_eq!(t.work_minutes, 540);
        assert_eq!(t.overtime_minutes, 60);
    }

    #[test]
    fn empty_and_open_shifts_count_nothing() {
        assert_eq!(compute_totals(&[]), Totals::default());
        assert_eq!(compute_totals(&[p(ClockIn, 8, 0)]), Totals::default());
    }

    #[test]
    fn duplicate_clock_in_keeps_first_start() {
        let t = compute_totals(&[p(ClockIn, 8, 0), p(ClockIn, 9, 0), p(ClockOut, 12, 0)]);
        assert_eq!(t.work_minutes, 240);
    }

    #[test]
    fn stray_punches_are_ignored() {
        let t = compute_totals(&[
            p(BreakEnd, 7, 0),
            p(ClockOut, 7, 30),
            p(ClockIn, 8, 0),
            p(BreakStart, 10, 0),
            p(ClockOut, 10, 15), // on break: ignored
            p(BreakEnd, 10, 20),
            p(ClockOut, 12, 20),
        ]);
        assert_eq!(t.work_minutes, 240);
        assert_eq!(t.break_minutes, 20);
    }

    #[test]
    fn split_shift_accumulates() {
        let t = compute_totals(&[
            p(ClockIn, 6, 0),
            p(ClockOut, 10, 0),
            p(ClockIn, 14, 0),
            p(ClockOut, 19, 0),
        ]);
        assert_eq!(t.work_minutes, 540);
        assert_eq!(t.overtime_minutes, 60);
    }

    #[test]
    fn seconds_are_rounded_on_the_total() {
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap();
        let punches = vec![
            Punch::new(ClockIn, start, CaptureMetadata::default()),
            Punch::new(
                ClockOut,
                start + chrono::Duration::seconds(90),
                CaptureMetadata::default(),
            ),
        ];
        assert_eq!(compute_totals(&punches).work_minutes, 2);
    }

    #[test]
    fn repeated_calls_agree() {
        let punches = [p(ClockIn, 8, 0), p(BreakStart, 12, 0), p(BreakEnd, 12, 45)];
        assert_eq!(compute_totals(&punches), compute_totals(&punches));
    }
}
