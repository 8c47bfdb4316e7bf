use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::table::strip_ansi;
use ansi_term::Colour;

const OP_WIDTH_LIMIT: usize = 60;

/// ANSI colour for an internal log operation
fn color_for_operation(op: &str) -> Colour {
    match op {
        "clock_in" | "supplement" => Colour::Green,
        "break_start" | "break_end" => Colour::Cyan,
        "clock_out" => Colour::Blue,
        "delete" | "reject" => Colour::Red,
        "edit" | "review" | "overtime" => Colour::Yellow,
        "approve" => Colour::Green,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

/// One row of the `log` table, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    fn op_target(&self) -> String {
        if self.target.is_empty() {
            self.operation.clone()
        } else {
            format!("{} ({})", self.operation, self.target)
        }
    }
}

/// Truncate to `limit` visible characters, keeping only the operation word coloured.
fn paint_op_target(entry: &LogEntry, limit: usize) -> String {
    let color = color_for_operation(&entry.operation);
    let visible = entry.op_target();

    let truncated = if visible.chars().count() > limit {
        let mut s: String = visible.chars().take(limit.saturating_sub(3)).collect();
        s.push_str("...");
        s
    } else {
        visible
    };

    match truncated.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(truncated.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn load(pool: &DbPool) -> AppResult<Vec<LogEntry>> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let raw_date: String = row.get(1)?;
            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            Ok(LogEntry {
                id: row.get(0)?,
                date,
                operation: row.get(2)?,
                target: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                message: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let entries = Self::load(pool)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let op_w = entries
            .iter()
            .map(|e| e.op_target().chars().count())
            .max()
            .unwrap_or(10)
            .min(OP_WIDTH_LIMIT);
        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(0);

        println!("📜 Internal log:\n");

        for entry in &entries {
            let painted = paint_op_target(entry, OP_WIDTH_LIMIT);
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(&painted).chars().count()));

            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                entry.id,
                entry.date,
                painted,
                padding,
                entry.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(op: &str, target: &str) -> LogEntry {
        LogEntry {
            id: 1,
            date: String::new(),
            operation: op.into(),
            target: target.into(),
            message: String::new(),
        }
    }

    #[test]
    fn long_targets_are_truncated_without_counting_ansi() {
        let e = entry("edit", &"x".repeat(80));
        let painted = paint_op_target(&e, 20);
        let visible = strip_ansi(&painted);
        assert_eq!(visible.chars().count(), 20);
        assert!(visible.starts_with("edit ("));
        assert!(visible.ends_with("..."));
    }

    #[test]
    fn empty_target_shows_operation_only() {
        assert_eq!(strip_ansi(&paint_op_target(&entry("init", ""), 60)), "init");
    }
}
