//! Terminal rendering shared by the timecard commands.

use crate::core::verify::{ChainReport, RecordIntegrity};
use crate::models::timecard::Timecard;
use crate::utils::colors::{
    CYAN, GREEN, GREY, RED, RESET, color_for_overtime, color_for_status, colorize_optional,
};
use crate::utils::formatting::{mins2readable, or_dash};
use crate::utils::table::Table;

/// One-line summary printed after a punch or an edit.
pub fn summary_line(tc: &Timecard) -> String {
    format!(
        "#{} {} {} | work {} | break {} | overtime {}{}{} | hash {}",
        tc.id,
        tc.employee_id,
        tc.date_str(),
        mins2readable(tc.totals.work_minutes, false, true),
        mins2readable(tc.totals.break_minutes, false, true),
        color_for_overtime(tc.totals.overtime_minutes),
        mins2readable(tc.totals.overtime_minutes, false, true),
        RESET,
        tc.short_hash()
    )
}

pub fn timecard_table(timecards: &[Timecard]) -> Table {
    let mut table = Table::new(&[
        "ID", "Employee", "Date", "Status", "Punches", "Work", "Break", "Gross", "OT", "Hash",
    ]);

    for tc in timecards {
        let status = if tc.is_deleted {
            format!("{GREY}Deleted{RESET}")
        } else {
            format!(
                "{}{}{}",
                color_for_status(tc.status),
                tc.status.to_db_str(),
                RESET
            )
        };

        table.add_row(vec![
            tc.id.to_string(),
            tc.employee_id.clone(),
            tc.date_str(),
            status,
            tc.punches.len().to_string(),
            mins2readable(tc.totals.work_minutes, false, true),
            mins2readable(tc.totals.break_minutes, false, true),
            mins2readable(tc.totals.gross_minutes, false, true),
            format!(
                "{}{}{}",
                color_for_overtime(tc.totals.overtime_minutes),
                mins2readable(tc.totals.overtime_minutes, false, true),
                RESET
            ),
            tc.short_hash(),
        ]);
    }

    table
}

pub fn integrity_line(check: &RecordIntegrity) -> String {
    if check.is_valid {
        format!("{GREEN}✔ content matches stored hash{RESET}")
    } else {
        format!(
            "{RED}✘ content does not match stored hash{RESET} (stored {}, calculated {})",
            or_dash(check.stored_hash.as_deref()),
            check.calculated_hash
        )
    }
}

/// Full detail view: header, punches, overtime, audit trail.
pub fn print_timecard(tc: &Timecard, check: &RecordIntegrity) {
    println!("{CYAN}Timecard #{}{RESET}", tc.id);
    println!("  Employee : {}", tc.employee_id);
    println!("  Date     : {}", tc.date_str());
    println!(
        "  Status   : {}{}{}{}",
        color_for_status(tc.status),
        tc.status.to_db_str(),
        RESET,
        if tc.is_deleted {
            format!(
                " {GREY}(deleted by {} at {}){RESET}",
                or_dash(tc.deleted_by.as_deref()),
                tc.deleted_at.map(|d| d.to_rfc3339()).unwrap_or_default()
            )
        } else {
            String::new()
        }
    );
    println!(
        "  Policy   : {} (paid break: {})",
        or_dash(tc.policy_version.as_deref()),
        tc.rules.paid_break
    );
    println!(
        "  Totals   : work {} | break {} | gross {} | overtime {}",
        mins2readable(tc.totals.work_minutes, false, false),
        mins2readable(tc.totals.break_minutes, false, false),
        mins2readable(tc.totals.gross_minutes, false, false),
        mins2readable(tc.totals.overtime_minutes, false, false),
    );
    if tc.overtime.approved_minutes > 0 || tc.overtime.approved_by.is_some() {
        println!(
            "  Overtime : {} approved by {} ({})",
            mins2readable(tc.overtime.approved_minutes, false, false),
            or_dash(tc.overtime.approved_by.as_deref()),
            tc.overtime.status.as_str()
        );
    }
    println!(
        "  Previous : {}",
        colorize_optional(&or_dash(tc.previous_hash.as_deref()))
    );
    println!("  Current  : {}", or_dash(tc.current_hash.as_deref()));
    println!("  Version  : {}", tc.version);
    println!("  Integrity: {}", integrity_line(check));
    println!();

    let mut punches = Table::new(&["Seq", "Type", "Time", "Method", "Station", "Status", "Note"]);
    for p in &tc.punches {
        punches.add_row(vec![
            p.seq.to_string(),
            p.kind.to_string(),
            p.time_str(),
            p.metadata.method.as_str().to_string(),
            colorize_optional(&or_dash(p.metadata.station.as_deref())),
            p.status.as_str().to_string(),
            colorize_optional(&or_dash(p.metadata.note.as_deref())),
        ]);
    }
    print!("{}", punches.render());

    if !tc.audit_log.is_empty() {
        println!();
        let mut audit = Table::new(&["When", "By", "Action", "Punch", "Changes", "Reason"]);
        for entry in &tc.audit_log {
            let changes = entry
                .changes
                .iter()
                .map(|c| {
                    format!(
                        "{}: {} → {}",
                        c.field,
                        or_dash(c.old_value.as_deref()),
                        or_dash(c.new_value.as_deref())
                    )
                })
                .collect::<Vec<_>>()
                .join("; ");
            audit.add_row(vec![
                entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
                or_dash(entry.created_by.as_deref()),
                format!("{:?}", entry.action).to_lowercase(),
                entry.punch_seq.map(|s| s.to_string()).unwrap_or_else(|| "--".into()),
                changes,
                or_dash(Some(entry.reason.as_str())),
            ]);
        }
        print!("{}", audit.render());
    }
}

pub fn print_chain_report(report: &ChainReport) {
    if report.is_valid {
        println!(
            "{GREEN}✔{RESET} {}: {} timecard(s) checked, chain intact",
            report.employee_id, report.timecards_checked
        );
        return;
    }

    println!(
        "{RED}✘{RESET} {}: {} timecard(s) checked, {} violation(s)",
        report.employee_id,
        report.timecards_checked,
        report.violations.len()
    );
    for v in &report.violations {
        println!(
            "    #{} {} {}{}{}: {}",
            v.timecard_id,
            v.date,
            RED,
            v.issue.label(),
            RESET,
            v.details
        );
    }
}
