/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

use crate::models::timecard::TimecardStatus;

pub fn color_for_status(status: TimecardStatus) -> &'static str {
    match status {
        TimecardStatus::Approved => GREEN,
        TimecardStatus::Rejected => RED,
        TimecardStatus::Pending => YELLOW,
        TimecardStatus::Draft => GREY,
    }
}

/// Overtime color: anything above zero is highlighted.
pub fn color_for_overtime(value: i64) -> &'static str {
    if value > 0 { YELLOW } else { RESET }
}

/// Grey for placeholders ("--", "--:--", empty), unchanged otherwise.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--:--" || value.trim() == "--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}
