use crate::cli::commands::render::{integrity_line, print_chain_report};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::db::queries::employees;
use crate::errors::{AppError, AppResult};
use crate::models::query::TimecardQuery;
use crate::ui::messages::info;

/// Exits non-zero (via `ChainIntegrity`) whenever something does not verify.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Verify {
        employee,
        record,
        json,
    } = cmd
    {
        let ledger = Ledger::open(cfg)?;

        if let Some(id) = record {
            let check = ledger.verify_record(*id)?;
            let owner = ledger
                .get(&TimecardQuery::by_id(*id))?
                .map(|tc| tc.employee_id)
                .unwrap_or_default();

            if *json {
                println!("{}", serde_json::to_string_pretty(&check)?);
            } else {
                println!("Timecard #{} ({}): {}", id, owner, integrity_line(&check));
            }

            if !check.is_valid {
                return Err(AppError::ChainIntegrity {
                    employee_id: owner,
                    violations: 1,
                });
            }
            return Ok(());
        }

        let targets = match employee {
            Some(e) => vec![e.clone()],
            None => employees(ledger.conn())?,
        };

        if targets.is_empty() {
            info("No timecards to verify.");
            return Ok(());
        }

        let reports = targets
            .iter()
            .map(|e| ledger.verify_chain_integrity(e))
            .collect::<AppResult<Vec<_>>>()?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        } else {
            reports.iter().for_each(print_chain_report);
        }

        let broken: Vec<_> = reports.iter().filter(|r| !r.is_valid).collect();
        if !broken.is_empty() {
            return Err(AppError::ChainIntegrity {
                employee_id: broken
                    .iter()
                    .map(|r| r.employee_id.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                violations: broken.iter().map(|r| r.violations.len()).sum(),
            });
        }
    }

    Ok(())
}
