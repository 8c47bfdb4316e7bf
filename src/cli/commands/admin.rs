use crate::cli::commands::render::summary_line;
use crate::cli::parser::{AdminArgs, Commands};
use crate::config::Config;
use crate::core::ledger::{Actor, Ledger, PunchEdit};
use crate::core::punch_log::parse_punch_time;
use crate::errors::{AppError, AppResult};
use crate::models::punch::{CaptureMetadata, ReviewStatus};
use crate::models::punch_type::PunchType;
use crate::models::query::TimecardQuery;
use crate::models::timecard::TimecardStatus;
use crate::ui::messages::success;
use chrono::NaiveDate;

fn actor(admin: &AdminArgs) -> Actor<'_> {
    Actor {
        id: &admin.by,
        reason: &admin.reason,
    }
}

fn punch_type(code: &str) -> AppResult<PunchType> {
    PunchType::from_code(code).ok_or_else(|| {
        AppError::Validation(format!(
            "invalid punch type '{}': use in, out, break-start or break-end",
            code
        ))
    })
}

/// `HH:MM` times are anchored on the day of the timecard being edited.
fn record_date(ledger: &Ledger, id: i64) -> AppResult<NaiveDate> {
    ledger
        .get(&TimecardQuery::by_id(id))?
        .map(|tc| tc.date)
        .ok_or_else(|| AppError::NotFound(format!("timecard {}", id)))
}

/// Handle `edit`, `add-punch`, `review`, `approve`, `reject` and `overtime`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let mut ledger = Ledger::open(cfg)?;

    let (label, tc) = match cmd {
        Commands::Edit {
            id,
            seq,
            kind,
            time,
            note,
            admin,
        } => {
            let time = match time {
                Some(t) => Some(parse_punch_time(t, record_date(&ledger, *id)?)?),
                None => None,
            };
            let edit = PunchEdit {
                kind: kind.as_deref().map(punch_type).transpose()?,
                time,
                note: note.clone(),
            };
            (
                format!("Punch {} edited", seq),
                ledger.edit_punch(*id, *seq, &edit, actor(admin))?,
            )
        }
        Commands::AddPunch {
            id,
            kind,
            time,
            admin,
        } => {
            let kind = punch_type(kind)?;
            let time = parse_punch_time(time, record_date(&ledger, *id)?)?;
            (
                format!("{} punch added", kind),
                ledger.add_punch(*id, kind, time, CaptureMetadata::manual(), actor(admin))?,
            )
        }
        Commands::Review {
            id,
            seq,
            status,
            admin,
        } => {
            let status = ReviewStatus::from_code(status).ok_or_else(|| {
                AppError::Validation(format!(
                    "invalid review status '{}': use approved, rejected or pending",
                    status
                ))
            })?;
            (
                format!("Punch {} marked {}", seq, status.as_str()),
                ledger.review_punch(*id, *seq, status, actor(admin))?,
            )
        }
        Commands::Approve { id, admin } => (
            "Timecard approved".to_string(),
            ledger.set_status(*id, TimecardStatus::Approved, actor(admin))?,
        ),
        Commands::Reject { id, admin } => (
            "Timecard rejected".to_string(),
            ledger.set_status(*id, TimecardStatus::Rejected, actor(admin))?,
        ),
        Commands::Overtime { id, minutes, admin } => (
            format!("{} overtime minute(s) approved", minutes),
            ledger.approve_overtime(*id, *minutes, actor(admin))?,
        ),
        _ => return Ok(()),
    };

    success(format!("{} on timecard #{}", label, tc.id));
    println!("{}", summary_line(&tc));
    Ok(())
}
