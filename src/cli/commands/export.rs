use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::Ledger;
use crate::errors::AppResult;
use crate::export::{ExportLogic, ExportOptions};
use crate::utils::date::parse_optional_date;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        employee,
        from,
        to,
        deleted,
        force,
    } = cmd
    {
        let opts = ExportOptions {
            format: *format,
            file: file.clone(),
            employee_id: employee.clone(),
            from: parse_optional_date(from.as_ref())?,
            to: parse_optional_date(to.as_ref())?,
            include_deleted: *deleted,
            force: *force,
        };

        let ledger = Ledger::open(cfg)?;
        ExportLogic::export(ledger.conn(), &opts)?;
    }
    Ok(())
}
