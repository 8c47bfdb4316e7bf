use crate::cli::commands::render::timecard_table;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::errors::{AppError, AppResult};
use crate::models::query::TimecardQuery;
use crate::models::timecard::TimecardStatus;
use crate::ui::messages::info;
use crate::utils::date::parse_optional_date;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        employee,
        date,
        from,
        to,
        status,
        deleted,
        json,
    } = cmd
    {
        let status = match status {
            Some(s) => Some(TimecardStatus::from_code(s).ok_or_else(|| {
                AppError::Validation(format!(
                    "invalid status '{}': use draft, pending, approved or rejected",
                    s
                ))
            })?),
            None => None,
        };

        let query = TimecardQuery {
            employee_id: employee.clone(),
            date: parse_optional_date(date.as_ref())?,
            status,
            include_deleted: *deleted,
            ..TimecardQuery::default()
        }
        .between(parse_optional_date(from.as_ref())?, parse_optional_date(to.as_ref())?);

        let ledger = Ledger::open(cfg)?;
        let timecards = ledger.list(&query)?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&timecards)?);
            return Ok(());
        }

        if timecards.is_empty() {
            info("No timecards found.");
            return Ok(());
        }

        print!("{}", timecard_table(&timecards).render());
    }

    Ok(())
}
