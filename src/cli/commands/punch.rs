use crate::cli::commands::render::summary_line;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::core::punch_log::parse_punch_spec;
use crate::errors::{AppError, AppResult};
use crate::models::punch::CaptureMethod;
use crate::ui::messages::success;
use crate::utils::date;

/// Handle `in`, `break-start`, `break-end`, `out` and `supplement`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let mut ledger = Ledger::open(cfg)?;

    let (label, tc) = match cmd {
        Commands::In { employee, capture } => {
            let metadata = capture.to_metadata(CaptureMethod::Station)?;
            ("Clock In", ledger.clock_in(employee, metadata)?)
        }
        Commands::BreakStart { id, capture } => {
            let metadata = capture.to_metadata(CaptureMethod::Station)?;
            ("Break Start", ledger.break_start(*id, metadata)?)
        }
        Commands::BreakEnd { id, capture } => {
            let metadata = capture.to_metadata(CaptureMethod::Station)?;
            ("Break End", ledger.break_end(*id, metadata)?)
        }
        Commands::Out { id, capture } => {
            let metadata = capture.to_metadata(CaptureMethod::Station)?;
            ("Clock Out", ledger.clock_out(*id, metadata)?)
        }
        Commands::Supplement {
            employee,
            date: date_str,
            punches,
            capture,
        } => {
            let day = date::parse_date(date_str)
                .ok_or_else(|| AppError::InvalidDate(date_str.clone()))?;
            let parsed = punches
                .iter()
                .map(|spec| parse_punch_spec(spec, day))
                .collect::<AppResult<Vec<_>>>()?;
            let metadata = capture.to_metadata(CaptureMethod::Manual)?;
            ("Supplement", ledger.supplement(employee, day, &parsed, metadata)?)
        }
        _ => return Ok(()),
    };

    success(format!("{} recorded on timecard #{}", label, tc.id));
    println!("{}", summary_line(&tc));
    Ok(())
}
