//! rTimecard library root.
//! Exposes the CLI parser, the high-level run() function and the ledger
//! modules (punch log, totals, hash chain, verification).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use crate::cli::commands;

    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::In { .. }
        | Commands::BreakStart { .. }
        | Commands::BreakEnd { .. }
        | Commands::Out { .. }
        | Commands::Supplement { .. } => commands::punch::handle(&cli.command, cfg),
        Commands::Show { .. } => commands::show::handle(&cli.command, cfg),
        Commands::List { .. } => commands::list::handle(&cli.command, cfg),
        Commands::Verify { .. } => commands::verify::handle(&cli.command, cfg),
        Commands::Edit { .. }
        | Commands::AddPunch { .. }
        | Commands::Review { .. }
        | Commands::Approve { .. }
        | Commands::Reject { .. }
        | Commands::Overtime { .. } => commands::admin::handle(&cli.command, cfg),
        Commands::Del { .. } => commands::del::handle(&cli.command, cfg),
        Commands::Export { .. } => commands::export::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // Config is loaded once; --db overrides the configured database
    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }

    dispatch(&cli, &cfg)
}
