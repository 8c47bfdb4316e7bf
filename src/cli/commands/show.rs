use crate::cli::commands::render::print_timecard;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::core::verify::verify_record;
use crate::errors::{AppError, AppResult};
use crate::models::query::TimecardQuery;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Show { id, json } = cmd {
        let ledger = Ledger::open(cfg)?;
        let tc = ledger
            .get(&TimecardQuery::by_id(*id))?
            .ok_or_else(|| AppError::NotFound(format!("timecard {}", id)))?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&tc)?);
        } else {
            print_timecard(&tc, &verify_record(&tc)?);
        }
    }

    Ok(())
}
