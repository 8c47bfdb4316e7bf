// src/export/logic.rs

use crate::db::queries::list_timecards;
use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::models::query::TimecardQuery;
use crate::ui::messages::warning;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub file: String,
    pub employee_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub include_deleted: bool,
    pub force: bool,
}

pub struct ExportLogic;

impl ExportLogic {
    /// Write the selected timecards to `opts.file`. Returns how many were
    /// exported; nothing is written when the selection is empty.
    pub fn export(conn: &Connection, opts: &ExportOptions) -> AppResult<usize> {
        let path = Path::new(&opts.file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output file path must be absolute: {}",
                opts.file
            )));
        }
        if let (Some(from), Some(to)) = (opts.from, opts.to)
            && from > to
        {
            return Err(AppError::InvalidDate(format!("{} is after {}", from, to)));
        }

        ensure_writable(path, opts.force)?;

        let query = TimecardQuery {
            employee_id: opts.employee_id.clone(),
            include_deleted: opts.include_deleted,
            ..TimecardQuery::default()
        }
        .between(opts.from, opts.to);

        let timecards = list_timecards(conn, &query)?;

        if timecards.is_empty() {
            warning("No timecards found for the selected filters.");
            return Ok(0);
        }

        match opts.format {
            ExportFormat::Csv => export_csv(&timecards, path)?,
            ExportFormat::Json => export_json(&timecards, path)?,
        }

        Ok(timecards.len())
    }
}
