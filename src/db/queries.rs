use crate::core::canonical::canonical_instant;
use crate::core::chain::ChainReader;
use crate::errors::{AppError, AppResult};
use crate::models::query::TimecardQuery;
use crate::models::timecard::{Rules, Timecard, TimecardStatus, Totals};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result, Row, params};

const SELECT_TIMECARD: &str = "SELECT * FROM timecards";
const CHAIN_ORDER_ASC: &str = "ORDER BY date ASC, created_at ASC, id ASC";
const CHAIN_ORDER_DESC: &str = "ORDER BY date DESC, created_at DESC, id DESC";

fn conversion_error(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| conversion_error(0, AppError::InvalidTime(s.to_string())))
}

fn parse_json<T: serde::de::DeserializeOwned>(column: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        conversion_error(
            0,
            AppError::Other(format!("corrupt {} column: {}", column, e)),
        )
    })
}

pub fn map_row(row: &Row) -> Result<Timecard> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(0, AppError::InvalidDate(date_str.clone())))?;

    let status_str: String = row.get("status")?;
    let status = TimecardStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(
            0,
            AppError::Other(format!("Invalid timecard status: {}", status_str)),
        )
    })?;

    let punches: String = row.get("punches")?;
    let audit_log: String = row.get("audit_log")?;
    let overtime: String = row.get("overtime")?;

    let deleted_at = row
        .get::<_, Option<String>>("deleted_at")?
        .map(|s| parse_instant(&s))
        .transpose()?;

    Ok(Timecard {
        id: row.get("id")?,
        employee_id: row.get("employee_id")?,
        date,
        punches: parse_json("punches", &punches)?,
        totals: Totals {
            work_minutes: row.get("work_minutes")?,
            break_minutes: row.get("break_minutes")?,
            gross_minutes: row.get("gross_minutes")?,
            overtime_minutes: row.get("overtime_minutes")?,
        },
        policy_version: row.get("policy_version")?,
        rules: Rules {
            paid_break: row.get::<_, i32>("paid_break")? == 1,
        },
        overtime: parse_json("overtime", &overtime)?,
        status,
        audit_log: parse_json("audit_log", &audit_log)?,
        is_deleted: row.get::<_, i32>("is_deleted")? == 1,
        deleted_at,
        deleted_by: row.get("deleted_by")?,
        previous_hash: row.get("previous_hash")?,
        current_hash: row.get("current_hash")?,
        created_at: parse_instant(&row.get::<_, String>("created_at")?)?,
        updated_at: parse_instant(&row.get::<_, String>("updated_at")?)?,
        version: row.get("version")?,
    })
}

/// Translate lock contention and constraint hits into retryable conflicts.
pub fn classify(err: rusqlite::Error) -> AppError {
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
            AppError::ConcurrencyConflict(format!("database is busy: {}", err))
        }
        Some(ErrorCode::ConstraintViolation) => {
            AppError::ConcurrencyConflict(format!("constraint violated: {}", err))
        }
        _ => AppError::Db(err),
    }
}

fn sealed_hash(tc: &Timecard) -> AppResult<&str> {
    tc.current_hash.as_deref().ok_or_else(|| {
        AppError::Other(format!(
            "refusing to store timecard of {} on {} without a current hash",
            tc.employee_id,
            tc.date_str()
        ))
    })
}

/// Insert a sealed record and return its new id.
pub fn insert_timecard(conn: &Connection, tc: &Timecard) -> AppResult<i64> {
    let hash = sealed_hash(tc)?;

    conn.execute(
        "INSERT INTO timecards (
            employee_id, date, punches,
            work_minutes, break_minutes, gross_minutes, overtime_minutes,
            policy_version, paid_break, overtime, status, audit_log,
            is_deleted, deleted_at, deleted_by,
            previous_hash, current_hash, created_at, updated_at, version
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
        params![
            tc.employee_id,
            tc.date_str(),
            serde_json::to_string(&tc.punches)?,
            tc.totals.work_minutes,
            tc.totals.break_minutes,
            tc.totals.gross_minutes,
            tc.totals.overtime_minutes,
            tc.policy_version,
            if tc.rules.paid_break { 1 } else { 0 },
            serde_json::to_string(&tc.overtime)?,
            tc.status.to_db_str(),
            serde_json::to_string(&tc.audit_log)?,
            if tc.is_deleted { 1 } else { 0 },
            tc.deleted_at.as_ref().map(canonical_instant),
            tc.deleted_by,
            tc.previous_hash,
            hash,
            canonical_instant(&tc.created_at),
            canonical_instant(&tc.updated_at),
            tc.version,
        ],
    )
    .map_err(classify)?;

    Ok(conn.last_insert_rowid())
}

/// Write back a mutated record. `tc.version` must be the version that was
/// loaded; the stored version is bumped by one. `previous_hash` and
/// `created_at` are never rewritten.
pub fn update_timecard(conn: &Connection, tc: &Timecard) -> AppResult<()> {
    let hash = sealed_hash(tc)?;

    let changed = conn
        .execute(
            "UPDATE timecards
             SET punches = ?1,
                 work_minutes = ?2, break_minutes = ?3,
                 gross_minutes = ?4, overtime_minutes = ?5,
                 overtime = ?6, status = ?7, audit_log = ?8,
                 is_deleted = ?9, deleted_at = ?10, deleted_by = ?11,
                 current_hash = ?12, updated_at = ?13,
                 version = version + 1
             WHERE id = ?14 AND version = ?15",
            params![
                serde_json::to_string(&tc.punches)?,
                tc.totals.work_minutes,
                tc.totals.break_minutes,
                tc.totals.gross_minutes,
                tc.totals.overtime_minutes,
                serde_json::to_string(&tc.overtime)?,
                tc.status.to_db_str(),
                serde_json::to_string(&tc.audit_log)?,
                if tc.is_deleted { 1 } else { 0 },
                tc.deleted_at.as_ref().map(canonical_instant),
                tc.deleted_by,
                hash,
                canonical_instant(&tc.updated_at),
                tc.id,
                tc.version,
            ],
        )
        .map_err(classify)?;

    if changed == 0 {
        return Err(AppError::ConcurrencyConflict(format!(
            "timecard {} changed since version {} was read",
            tc.id, tc.version
        )));
    }
    Ok(())
}

pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Option<Timecard>> {
    let sql = format!("{} WHERE id = ?1", SELECT_TIMECARD);
    Ok(conn.query_row(&sql, [id], map_row).optional()?)
}

/// Most recently created live record of `employee_id` for `date`.
pub fn find_for_day(conn: &Connection, employee_id: &str, date: &NaiveDate) -> AppResult<Option<Timecard>> {
    let sql = format!(
        "{} WHERE employee_id = ?1 AND date = ?2 AND is_deleted = 0
         ORDER BY created_at DESC, id DESC LIMIT 1",
        SELECT_TIMECARD
    );
    Ok(conn
        .query_row(&sql, params![employee_id, date.format("%Y-%m-%d").to_string()], map_row)
        .optional()?)
}

pub fn list_timecards(conn: &Connection, query: &TimecardQuery) -> AppResult<Vec<Timecard>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(id) = query.id {
        clauses.push("id = ?");
        values.push(Box::new(id));
    }
    if let Some(emp) = &query.employee_id {
        clauses.push("employee_id = ?");
        values.push(Box::new(emp.clone()));
    }
    if let Some(d) = query.date {
        clauses.push("date = ?");
        values.push(Box::new(d.format("%Y-%m-%d").to_string()));
    }
    if let Some(d) = query.from {
        clauses.push("date >= ?");
        values.push(Box::new(d.format("%Y-%m-%d").to_string()));
    }
    if let Some(d) = query.to {
        clauses.push("date <= ?");
        values.push(Box::new(d.format("%Y-%m-%d").to_string()));
    }
    if let Some(s) = query.status {
        clauses.push("status = ?");
        values.push(Box::new(s.to_db_str()));
    }
    if !query.include_deleted {
        clauses.push("is_deleted = 0");
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let sql = format!(
        "{}{} ORDER BY employee_id ASC, date ASC, created_at ASC, id ASC",
        SELECT_TIMECARD, where_sql
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

impl ChainReader for Connection {
    fn latest_for_employee(&self, employee_id: &str, excluding: Option<i64>) -> AppResult<Option<Timecard>> {
        let sql = format!(
            "{} WHERE employee_id = ?1 AND id != ?2 {} LIMIT 1",
            SELECT_TIMECARD, CHAIN_ORDER_DESC
        );
        Ok(self
            .query_row(&sql, params![employee_id, excluding.unwrap_or(0)], map_row)
            .optional()?)
    }

    fn chain_for_employee(&self, employee_id: &str) -> AppResult<Vec<Timecard>> {
        let sql = format!("{} WHERE employee_id = ?1 {}", SELECT_TIMECARD, CHAIN_ORDER_ASC);
        let mut stmt = self.prepare(&sql)?;
        let rows = stmt.query_map([employee_id], map_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

/// Distinct employees that own at least one record.
pub fn employees(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT employee_id FROM timecards ORDER BY employee_id ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
