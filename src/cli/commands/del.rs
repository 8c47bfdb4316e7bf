use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::ledger::{Actor, Ledger};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

use std::io::{self, Write};

/// Ask a yes/no confirmation from the user
fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { id, yes, admin } = cmd {
        let prompt = format!(
            "Delete timecard #{}? It stays in the hash chain but disappears from listings.",
            id
        );

        if !*yes && !ask_confirmation(&prompt) {
            info("Operation cancelled.");
            return Ok(());
        }

        let mut ledger = Ledger::open(cfg)?;
        let tc = ledger.soft_delete(
            *id,
            Actor {
                id: &admin.by,
                reason: &admin.reason,
            },
        )?;

        success(format!(
            "Timecard #{} ({} {}) has been deleted.",
            tc.id,
            tc.employee_id,
            tc.date_str()
        ));
    }

    Ok(())
}
