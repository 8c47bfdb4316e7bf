use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension};

/// Ordered list of schema migrations. Each one is applied once and
/// recorded in the `log` table as `migration_applied`.
const MIGRATIONS: &[(&str, &str, &str)] = &[
    (
        "20251019_0001_create_timecards",
        "Created timecards table",
        r#"
        CREATE TABLE IF NOT EXISTS timecards (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id       TEXT NOT NULL,
            date              TEXT NOT NULL,
            punches           TEXT NOT NULL DEFAULT '[]',
            work_minutes      INTEGER NOT NULL DEFAULT 0,
            break_minutes     INTEGER NOT NULL DEFAULT 0,
            gross_minutes     INTEGER NOT NULL DEFAULT 0,
            overtime_minutes  INTEGER NOT NULL DEFAULT 0,
            policy_version    TEXT,
            paid_break        INTEGER NOT NULL DEFAULT 0,
            overtime          TEXT NOT NULL DEFAULT '{}',
            status            TEXT NOT NULL DEFAULT 'Pending'
                              CHECK(status IN ('Draft','Pending','Approved','Rejected')),
            audit_log         TEXT NOT NULL DEFAULT '[]',
            is_deleted        INTEGER NOT NULL DEFAULT 0,
            deleted_at        TEXT,
            deleted_by        TEXT,
            previous_hash     TEXT,
            current_hash      TEXT NOT NULL,
            created_at        TEXT NOT NULL,
            updated_at        TEXT NOT NULL,
            version           INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_timecards_employee_date
            ON timecards(employee_id, date);
        CREATE INDEX IF NOT EXISTS idx_timecards_chain_order
            ON timecards(employee_id, date, created_at);
        "#,
    ),
];

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, version: &str, message: &str, sql: &str) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", version, e)))?;

    crate::db::log::ttlog(&tx, "migration_applied", version, message)?;
    tx.commit()?;

    success(format!("Migration applied: {} → {}", version, message));
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db() and `db --migrate`.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    for (version, message, sql) in MIGRATIONS {
        if !is_applied(conn, version)? {
            apply(conn, version, message, sql)?;
        }
    }

    Ok(())
}

/// Number of migrations recorded as applied.
pub fn applied_count(conn: &Connection) -> AppResult<usize> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
        [],
        |row| row.get(0),
    )?;
    Ok(n as usize)
}
