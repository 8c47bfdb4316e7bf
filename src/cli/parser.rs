use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::models::punch::{CaptureMetadata, CaptureMethod};
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for rTimecard
/// Tamper-evident employee timecards with a per-employee SHA-256 hash chain
#[derive(Parser)]
#[command(
    name = "rtimecard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Tamper-evident employee timecards: punches, totals and a per-employee hash chain in SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where and how a punch is captured.
#[derive(Args, Debug, Clone, Default)]
pub struct CaptureArgs {
    #[arg(long, help = "Capture station identifier")]
    pub station: Option<String>,

    #[arg(long, help = "Capture location (free text or lat,lon)")]
    pub location: Option<String>,

    #[arg(long, help = "Capture method: station, manual or automatic")]
    pub method: Option<String>,

    #[arg(long, help = "Originating IP address")]
    pub ip: Option<String>,

    #[arg(long, help = "Reference to the captured photo")]
    pub image: Option<String>,

    #[arg(long, help = "Free-text note attached to the punch")]
    pub note: Option<String>,
}

impl CaptureArgs {
    /// `default_method` applies when `--method` is absent.
    pub fn to_metadata(&self, default_method: CaptureMethod) -> AppResult<CaptureMetadata> {
        let method = match &self.method {
            Some(m) => CaptureMethod::from_code(m).ok_or_else(|| {
                AppError::Validation(format!(
                    "invalid capture method '{}': use station, manual or automatic",
                    m
                ))
            })?,
            None => default_method,
        };

        Ok(CaptureMetadata {
            image: self.image.clone(),
            station: self.station.clone(),
            location: self.location.clone(),
            method,
            ip: self.ip.clone(),
            note: self.note.clone(),
        })
    }
}

/// Who performs an administrative action.
#[derive(Args, Debug, Clone)]
pub struct AdminArgs {
    #[arg(long = "by", help = "Identifier of the supervisor performing the action")]
    pub by: String,

    #[arg(long, default_value = "", help = "Reason recorded in the audit trail")]
    pub reason: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check SQLite file integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Clock in an employee (creates today's timecard when needed)
    In {
        /// Employee identifier
        employee: String,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Start a break on an existing timecard
    BreakStart {
        /// Timecard id
        id: i64,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// End a break on an existing timecard
    BreakEnd {
        /// Timecard id
        id: i64,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Clock out on an existing timecard
    Out {
        /// Timecard id
        id: i64,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Create a timecard for a past day from a full list of punches
    Supplement {
        /// Employee identifier
        employee: String,

        /// Day of the timecard (YYYY-MM-DD)
        date: String,

        #[arg(
            long = "punch",
            required = true,
            help = "Punch as KIND@TIME, e.g. in@08:00 or out@2025-03-03T16:00:00Z (repeatable)"
        )]
        punches: Vec<String>,

        #[command(flatten)]
        capture: CaptureArgs,
    },

    /// Show one timecard with its punches and audit trail
    Show {
        /// Timecard id
        id: i64,

        #[arg(long, help = "Print the record as JSON")]
        json: bool,
    },

    /// List timecards
    List {
        #[arg(long, short = 'e')]
        employee: Option<String>,

        #[arg(long, help = "Only this day (YYYY-MM-DD)")]
        date: Option<String>,

        #[arg(long, help = "From day, inclusive (YYYY-MM-DD)")]
        from: Option<String>,

        #[arg(long, help = "To day, inclusive (YYYY-MM-DD)")]
        to: Option<String>,

        #[arg(long, help = "Filter by status: draft, pending, approved, rejected")]
        status: Option<String>,

        #[arg(long = "deleted", help = "Include soft-deleted timecards")]
        deleted: bool,

        #[arg(long, help = "Print the records as JSON")]
        json: bool,
    },

    /// Verify the hash chain of an employee (or of every employee)
    Verify {
        /// Employee identifier; every employee when omitted
        employee: Option<String>,

        #[arg(long = "record", help = "Verify a single timecard by id")]
        record: Option<i64>,

        #[arg(long, help = "Print the report as JSON")]
        json: bool,
    },

    /// Edit one punch of a timecard
    Edit {
        /// Timecard id
        id: i64,

        #[arg(long, help = "Sequence number of the punch to edit")]
        seq: u32,

        #[arg(long = "type", help = "New punch type: in, out, break-start, break-end")]
        kind: Option<String>,

        #[arg(long, help = "New time: HH:MM on the timecard's day, or RFC 3339")]
        time: Option<String>,

        #[arg(long, help = "New note")]
        note: Option<String>,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Insert a missing punch into a timecard
    AddPunch {
        /// Timecard id
        id: i64,

        #[arg(long = "type", help = "Punch type: in, out, break-start, break-end")]
        kind: String,

        #[arg(long, help = "HH:MM on the timecard's day, or RFC 3339")]
        time: String,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Review one punch (approved, rejected, pending)
    Review {
        /// Timecard id
        id: i64,

        #[arg(long, help = "Sequence number of the punch")]
        seq: u32,

        #[arg(long, help = "approved, rejected or pending")]
        status: String,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Approve a timecard
    Approve {
        /// Timecard id
        id: i64,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Reject a timecard
    Reject {
        /// Timecard id
        id: i64,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Soft-delete a timecard (it stays in the hash chain)
    Del {
        /// Timecard id
        id: i64,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Record approved overtime minutes on a timecard
    Overtime {
        /// Timecard id
        id: i64,

        #[arg(long, allow_negative_numbers = true, help = "Approved overtime in minutes")]
        minutes: i64,

        #[command(flatten)]
        admin: AdminArgs,
    },

    /// Export timecards to CSV or JSON
    Export {
        #[arg(long, value_enum, help = "Output format")]
        format: ExportFormat,

        #[arg(long, help = "Absolute path of the output file")]
        file: String,

        #[arg(long, short = 'e')]
        employee: Option<String>,

        #[arg(long, help = "From day, inclusive (YYYY-MM-DD)")]
        from: Option<String>,

        #[arg(long, help = "To day, inclusive (YYYY-MM-DD)")]
        to: Option<String>,

        #[arg(long = "deleted", help = "Include soft-deleted timecards")]
        deleted: bool,

        #[arg(long, help = "Overwrite an existing file without asking")]
        force: bool,
    },
}
