//! Timecard ledger: the one write path for punches and administrative
//! edits.
//!
//! Every write is a single pass inside one SQLite transaction:
//! change punches → recompute totals → recompute `current_hash` →
//! persist → internal log row → commit, followed by a change
//! notification. Creation additionally resolves `previous_hash` inside
//! the same `BEGIN IMMEDIATE` transaction, so the predecessor lookup and
//! the insert cannot interleave with another writer. A lost race surfaces
//! as `ConcurrencyConflict` and the whole pipeline is re-run from
//! scratch.

use crate::config::Config;
use crate::core::chain::{assign_previous_hash, seal};
use crate::core::clock::{Clock, SystemClock};
use crate::core::notify::{ChangeKind, ChangeNotifier, NullNotifier, RecordChange, StdoutNotifier};
use crate::core::punch_log::{self, Policy};
use crate::core::verify::{ChainReport, RecordIntegrity, verify_chain, verify_record};
use crate::db::initialize::init_db;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{classify, find_by_id, find_for_day, insert_timecard, list_timecards, update_timecard};
use crate::errors::{AppError, AppResult};
use crate::models::punch::{CaptureMetadata, Punch, ReviewStatus};
use crate::models::punch_type::PunchType;
use crate::models::query::TimecardQuery;
use crate::models::timecard::{AuditAction, AuditEntry, FieldChange, Timecard, TimecardStatus};
use crate::ui::messages::warning;
use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use rusqlite::{Connection, TransactionBehavior};

/// Partial update of one punch. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct PunchEdit {
    pub kind: Option<PunchType>,
    pub time: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

/// Who performs an administrative action, and why.
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub id: &'a str,
    pub reason: &'a str,
}

/// What a mutation did, for the log row and the notification.
struct Outcome {
    kind: ChangeKind,
    message: String,
}

impl Outcome {
    fn updated(message: String) -> Self {
        Self {
            kind: ChangeKind::Updated,
            message,
        }
    }
}

fn missing_for_punch(id: i64) -> AppError {
    AppError::Validation(format!("timecard {} does not exist", id))
}

fn missing_for_admin(id: i64) -> AppError {
    AppError::NotFound(format!("timecard {}", id))
}

fn audit(
    action: AuditAction,
    punch_seq: Option<u32>,
    changes: Vec<FieldChange>,
    actor: Actor<'_>,
    now: DateTime<Utc>,
) -> AuditEntry {
    AuditEntry {
        punch_seq,
        action,
        changes,
        reason: actor.reason.to_string(),
        created_at: now,
        created_by: Some(actor.id.to_string()),
    }
}

fn require_live(tc: &Timecard) -> AppResult<()> {
    if tc.is_deleted {
        return Err(AppError::Validation(format!(
            "timecard {} is deleted",
            tc.id
        )));
    }
    Ok(())
}

/// Link, seal and insert a new record.
fn insert_new(conn: &Connection, tc: &mut Timecard) -> AppResult<()> {
    tc.previous_hash = assign_previous_hash(conn, &tc.employee_id, None)?;
    seal(tc)?;
    tc.id = insert_timecard(conn, tc)?;
    Ok(())
}

/// Recompute derived fields of an existing record and write it back.
fn save_existing(conn: &Connection, tc: &mut Timecard, now: DateTime<Utc>) -> AppResult<()> {
    punch_log::recompute(tc);
    tc.updated_at = now;
    seal(tc)?;
    update_timecard(conn, tc)?;
    tc.version += 1;
    Ok(())
}

pub struct Ledger {
    pool: DbPool,
    policy: Policy,
    max_attempts: u32,
    clock: Box<dyn Clock>,
    notifier: Box<dyn ChangeNotifier>,
}

impl Ledger {
    pub fn new(pool: DbPool, policy: Policy) -> Self {
        Self {
            pool,
            policy,
            max_attempts: 3,
            clock: Box::new(SystemClock),
            notifier: Box::new(NullNotifier),
        }
    }

    /// Open the configured database, apply pending migrations and wire
    /// the notifier selected by `emit_changes`.
    pub fn open(cfg: &Config) -> AppResult<Self> {
        let pool = DbPool::new(&cfg.database)?;
        init_db(&pool.conn)?;

        let ledger = Self::new(pool, cfg.policy()).with_max_attempts(cfg.max_create_attempts);
        Ok(if cfg.emit_changes {
            ledger.with_notifier(StdoutNotifier)
        } else {
            ledger
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_notifier(mut self, notifier: impl ChangeNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    fn with_retry<T>(&mut self, op: &str, mut f: impl FnMut(&mut Self) -> AppResult<T>) -> AppResult<T> {
        let mut attempt = 1;
        loop {
            match f(self) {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warning(format!(
                        "{}: attempt {}/{} lost a race ({}), retrying",
                        op, attempt, self.max_attempts, e
                    ));
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    fn emit(&self, kind: ChangeKind, tc: &Timecard) {
        self.notifier.notify(&RecordChange {
            kind,
            timecard: tc.clone(),
        });
    }

    // ------------------------------------------------
    // Punches
    // ------------------------------------------------

    /// Clock in `employee_id` now. Appends to today's record when one
    /// exists, otherwise opens a new record linked to the chain tip.
    pub fn clock_in(&mut self, employee_id: &str, metadata: CaptureMetadata) -> AppResult<Timecard> {
        let now = self.clock.now();
        let today = self.clock.today();
        let punch = Punch::new(PunchType::ClockIn, now, metadata);

        self.with_retry("clock_in", |ledger| {
            ledger.try_clock_in(employee_id, today, &punch, now)
        })
    }

    fn try_clock_in(
        &mut self,
        employee_id: &str,
        today: NaiveDate,
        punch: &Punch,
        now: DateTime<Utc>,
    ) -> AppResult<Timecard> {
        let tx = self
            .pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(classify)?;

        let (tc, kind) = match find_for_day(&tx, employee_id, &today)? {
            Some(mut tc) => {
                punch_log::append_punch(&mut tc, punch.clone())?;
                save_existing(&tx, &mut tc, now)?;
                (tc, ChangeKind::Updated)
            }
            None => {
                let mut tc =
                    punch_log::create_for_day(employee_id, today, punch.clone(), &self.policy, now)?;
                insert_new(&tx, &mut tc)?;
                (tc, ChangeKind::Created)
            }
        };

        ttlog(
            &tx,
            "clock_in",
            &format!("employee {}", employee_id),
            &format!("Clock In on timecard {} ({})", tc.id, tc.date_str()),
        )?;
        tx.commit().map_err(classify)?;

        self.emit(kind, &tc);
        Ok(tc)
    }

    pub fn break_start(&mut self, record_id: i64, metadata: CaptureMetadata) -> AppResult<Timecard> {
        self.punch_existing(record_id, PunchType::BreakStart, metadata, "break_start")
    }

    pub fn break_end(&mut self, record_id: i64, metadata: CaptureMetadata) -> AppResult<Timecard> {
        self.punch_existing(record_id, PunchType::BreakEnd, metadata, "break_end")
    }

    pub fn clock_out(&mut self, record_id: i64, metadata: CaptureMetadata) -> AppResult<Timecard> {
        self.punch_existing(record_id, PunchType::ClockOut, metadata, "clock_out")
    }

    fn punch_existing(
        &mut self,
        record_id: i64,
        kind: PunchType,
        metadata: CaptureMetadata,
        op: &str,
    ) -> AppResult<Timecard> {
        let punch = Punch::new(kind, self.clock.now(), metadata);

        self.mutate(record_id, op, missing_for_punch, |tc, _now| {
            punch_log::append_punch(tc, punch.clone())?;
            Ok(Outcome::updated(format!("{} on timecard {}", kind, tc.id)))
        })
    }

    /// Manual backfill from a complete punch list.
    pub fn supplement(
        &mut self,
        employee_id: &str,
        date: NaiveDate,
        punches: &[(PunchType, DateTime<Utc>)],
        metadata: CaptureMetadata,
    ) -> AppResult<Timecard> {
        let now = self.clock.now();
        let punches: Vec<Punch> = punches
            .iter()
            .map(|(kind, time)| Punch::new(*kind, *time, metadata.clone()))
            .collect();

        self.with_retry("supplement", |ledger| {
            let mut tc =
                punch_log::supplement(employee_id, date, punches.clone(), &ledger.policy, now)?;
            tc.audit_log.push(AuditEntry {
                punch_seq: None,
                action: AuditAction::Create,
                changes: vec![FieldChange::new("punches", 0, tc.punches.len())],
                reason: "manual backfill".to_string(),
                created_at: now,
                created_by: None,
            });

            let tx = ledger
                .pool
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(classify)?;
            insert_new(&tx, &mut tc)?;
            ttlog(
                &tx,
                "supplement",
                &format!("employee {}", employee_id),
                &format!(
                    "Backfilled timecard {} for {} with {} punch(es)",
                    tc.id,
                    tc.date_str(),
                    tc.punches.len()
                ),
            )?;
            tx.commit().map_err(classify)?;

            ledger.emit(ChangeKind::Created, &tc);
            Ok(tc)
        })
    }

    // ------------------------------------------------
    // Administrative edits
    // ------------------------------------------------

    pub fn edit_punch(
        &mut self,
        record_id: i64,
        seq: u32,
        edit: &PunchEdit,
        actor: Actor<'_>,
    ) -> AppResult<Timecard> {
        if edit.kind.is_none() && edit.time.is_none() && edit.note.is_none() {
            return Err(AppError::Validation("nothing to edit".into()));
        }
        if let Some(time) = &edit.time {
            punch_log::validate_time(time)?;
        }

        self.mutate(record_id, "edit", missing_for_admin, |tc, now| {
            require_live(tc)?;
            let id = tc.id;
            let punch = tc
                .punch_mut(seq)
                .ok_or_else(|| AppError::NotFound(format!("punch {} on timecard {}", seq, id)))?;

            let mut changes = Vec::new();
            if let Some(kind) = edit.kind
                && kind != punch.kind
            {
                changes.push(FieldChange::new("type", punch.kind, kind));
                punch.kind = kind;
            }
            if let Some(time) = edit.time {
                let time = time.trunc_subsecs(3);
                if time != punch.time {
                    changes.push(FieldChange::new("time", punch.time.to_rfc3339(), time.to_rfc3339()));
                    punch.time = time;
                }
            }
            if let Some(note) = &edit.note
                && punch.metadata.note.as_deref() != Some(note.as_str())
            {
                changes.push(FieldChange {
                    field: "note".into(),
                    old_value: punch.metadata.note.clone(),
                    new_value: Some(note.clone()),
                });
                punch.metadata.note = Some(note.clone());
            }

            if changes.is_empty() {
                return Err(AppError::Validation(format!(
                    "punch {} already has the requested values",
                    seq
                )));
            }

            let fields: Vec<String> = changes.iter().map(|c| c.field.clone()).collect();
            tc.audit_log
                .push(audit(AuditAction::Update, Some(seq), changes, actor, now));
            Ok(Outcome::updated(format!(
                "Edited punch {} ({}) by {}",
                seq,
                fields.join(", "),
                actor.id
            )))
        })
    }

    /// Administrative insertion of a missing punch.
    pub fn add_punch(
        &mut self,
        record_id: i64,
        kind: PunchType,
        time: DateTime<Utc>,
        metadata: CaptureMetadata,
        actor: Actor<'_>,
    ) -> AppResult<Timecard> {
        let punch = Punch::new(kind, time, metadata);

        self.mutate(record_id, "edit", missing_for_admin, |tc, now| {
            let seq = punch_log::append_punch(tc, punch.clone())?;
            let added = tc.punch(seq).map(|p| p.time.to_rfc3339()).unwrap_or_default();
            tc.audit_log.push(audit(
                AuditAction::Create,
                Some(seq),
                vec![FieldChange {
                    field: "punch".into(),
                    old_value: None,
                    new_value: Some(format!("{} {}", kind, added)),
                }],
                actor,
                now,
            ));
            Ok(Outcome::updated(format!("Added {} punch {} by {}", kind, seq, actor.id)))
        })
    }

    pub fn review_punch(
        &mut self,
        record_id: i64,
        seq: u32,
        status: ReviewStatus,
        actor: Actor<'_>,
    ) -> AppResult<Timecard> {
        let op = match status {
            ReviewStatus::Approved => "approve",
            ReviewStatus::Rejected => "reject",
            ReviewStatus::Pending => "review",
        };

        self.mutate(record_id, op, missing_for_admin, |tc, now| {
            require_live(tc)?;
            let id = tc.id;
            let punch = tc
                .punch_mut(seq)
                .ok_or_else(|| AppError::NotFound(format!("punch {} on timecard {}", seq, id)))?;
            let old = punch.status;
            punch.status = status;

            let action = match status {
                ReviewStatus::Approved => AuditAction::Approve,
                ReviewStatus::Rejected => AuditAction::Reject,
                ReviewStatus::Pending => AuditAction::Update,
            };
            tc.audit_log.push(audit(
                action,
                Some(seq),
                vec![FieldChange::new("status", old.as_str(), status.as_str())],
                actor,
                now,
            ));
            Ok(Outcome::updated(format!(
                "Punch {} marked {} by {}",
                seq,
                status.as_str(),
                actor.id
            )))
        })
    }

    pub fn set_status(
        &mut self,
        record_id: i64,
        status: TimecardStatus,
        actor: Actor<'_>,
    ) -> AppResult<Timecard> {
        let (op, action) = match status {
            TimecardStatus::Approved => ("approve", AuditAction::Approve),
            TimecardStatus::Rejected => ("reject", AuditAction::Reject),
            TimecardStatus::Pending | TimecardStatus::Draft => ("edit", AuditAction::Update),
        };

        self.mutate(record_id, op, missing_for_admin, |tc, now| {
            require_live(tc)?;
            let old = tc.status;
            tc.status = status;
            tc.audit_log.push(audit(
                action,
                None,
                vec![FieldChange::new("status", old.to_db_str(), status.to_db_str())],
                actor,
                now,
            ));
            Ok(Outcome::updated(format!(
                "Timecard marked {} by {}",
                status.to_db_str(),
                actor.id
            )))
        })
    }

    /// Soft delete. The record keeps its place in the chain.
    pub fn soft_delete(&mut self, record_id: i64, actor: Actor<'_>) -> AppResult<Timecard> {
        self.mutate(record_id, "delete", missing_for_admin, |tc, now| {
            require_live(tc)?;
            tc.is_deleted = true;
            tc.deleted_at = Some(now);
            tc.deleted_by = Some(actor.id.to_string());
            tc.audit_log.push(audit(
                AuditAction::Delete,
                None,
                vec![FieldChange::new("isDeleted", false, true)],
                actor,
                now,
            ));
            Ok(Outcome {
                kind: ChangeKind::Deleted,
                message: format!("Deleted by {}", actor.id),
            })
        })
    }

    pub fn approve_overtime(
        &mut self,
        record_id: i64,
        minutes: i64,
        actor: Actor<'_>,
    ) -> AppResult<Timecard> {
        if minutes < 0 {
            return Err(AppError::Validation(format!(
                "approved overtime cannot be negative ({})",
                minutes
            )));
        }

        self.mutate(record_id, "overtime", missing_for_admin, |tc, now| {
            require_live(tc)?;
            let old = tc.overtime.approved_minutes;
            tc.overtime.approved_minutes = minutes;
            tc.overtime.approved_by = Some(actor.id.to_string());
            tc.overtime.approved_at = Some(now);
            tc.overtime.reason = actor.reason.to_string();
            tc.overtime.status = ReviewStatus::Approved;
            tc.audit_log.push(audit(
                AuditAction::Approve,
                None,
                vec![FieldChange::new("overtime.approvedMinutes", old, minutes)],
                actor,
                now,
            ));
            Ok(Outcome::updated(format!(
                "Approved {} overtime minute(s) by {}",
                minutes, actor.id
            )))
        })
    }

    fn mutate<F>(
        &mut self,
        record_id: i64,
        op: &str,
        missing: fn(i64) -> AppError,
        change: F,
    ) -> AppResult<Timecard>
    where
        F: Fn(&mut Timecard, DateTime<Utc>) -> AppResult<Outcome>,
    {
        let now = self.clock.now();

        self.with_retry(op, |ledger| {
            let tx = ledger
                .pool
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(classify)?;

            let mut tc = find_by_id(&tx, record_id)?.ok_or_else(|| missing(record_id))?;
            let outcome = change(&mut tc, now)?;
            save_existing(&tx, &mut tc, now)?;

            ttlog(&tx, op, &format!("timecard {}", tc.id), &outcome.message)?;
            tx.commit().map_err(classify)?;

            ledger.emit(outcome.kind, &tc);
            Ok(tc)
        })
    }

    // ------------------------------------------------
    // Queries and verification
    // ------------------------------------------------

    /// Most recent record matching `query`.
    pub fn get(&self, query: &TimecardQuery) -> AppResult<Option<Timecard>> {
        Ok(list_timecards(&self.pool.conn, query)?
            .into_iter()
            .max_by_key(|t| (t.date, t.created_at, t.id)))
    }

    pub fn list(&self, query: &TimecardQuery) -> AppResult<Vec<Timecard>> {
        list_timecards(&self.pool.conn, query)
    }

    pub fn verify_record(&self, record_id: i64) -> AppResult<RecordIntegrity> {
        let tc = find_by_id(&self.pool.conn, record_id)?.ok_or_else(|| missing_for_admin(record_id))?;
        verify_record(&tc)
    }

    pub fn verify_chain_integrity(&self, employee_id: &str) -> AppResult<ChainReport> {
        verify_chain(&self.pool.conn, employee_id)
    }
}
