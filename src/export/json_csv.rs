// src/export/json_csv.rs

use crate::errors::AppResult;
use crate::export::{TimecardExport, notify_export_success};
use crate::models::timecard::Timecard;
use crate::ui::messages::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Full records, punches and audit trail included.
pub(crate) fn export_json(timecards: &[Timecard], path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json_data = serde_json::to_string_pretty(timecards)?;
    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", path, timecards.len());
    Ok(())
}

/// One row per timecard, header derived from `TimecardExport`.
pub(crate) fn export_csv(timecards: &[Timecard], path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::Writer::from_path(path)?;
    for tc in timecards {
        wtr.serialize(TimecardExport::from(tc))?;
    }
    wtr.flush()?;

    notify_export_success("CSV", path, timecards.len());
    Ok(())
}
