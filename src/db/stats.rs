use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) RECORD COUNTS
    //
    let (total, deleted, employees): (i64, i64, i64) = pool.conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(is_deleted), 0), COUNT(DISTINCT employee_id) FROM timecards",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )?;
    println!("{}• Timecards:{} {}{}{}", CYAN, RESET, GREEN, total, RESET);
    println!("{}• Deleted (soft):{} {}", CYAN, RESET, deleted);
    println!("{}• Employees:{} {}", CYAN, RESET, employees);

    //
    // 3) DATE RANGE
    //
    let range: Option<(Option<String>, Option<String>)> = pool
        .conn
        .query_row("SELECT MIN(date), MAX(date) FROM timecards", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()?;

    let (first, last) = range.unwrap_or((None, None));
    let dash = || format!("{GREY}--{RESET}");

    println!("{}• Date range:{}", CYAN, RESET);
    println!("    from: {}", first.unwrap_or_else(dash));
    println!("    to:   {}", last.unwrap_or_else(dash));

    println!();
    Ok(())
}
