//! Canonical serialization of the hashable subset of a timecard.
//!
//! The digest must not depend on how a record happens to be laid out in
//! memory or in the database, so the hashed fields are copied into
//! fixed-order structs below and serialized as compact JSON. serde emits
//! struct fields in declaration order, which pins the byte layout.
//! Optional values are written as `""` rather than skipped.

use crate::errors::AppResult;
use crate::models::punch::Punch;
use crate::models::timecard::Timecard;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalPunch<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    time: String,
    image: &'a str,
    station: &'a str,
    location: &'a str,
    method: &'static str,
    ip: &'a str,
    note: &'a str,
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalTotals {
    work_minutes: i64,
    break_minutes: i64,
    gross_minutes: i64,
    overtime_minutes: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalRules {
    paid_break: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalTimecard<'a> {
    employee_id: &'a str,
    date: String,
    punches: Vec<CanonicalPunch<'a>>,
    totals: CanonicalTotals,
    previous_hash: &'a str,
    created_at: String,
    policy_version: &'a str,
    rules: CanonicalRules,
}

/// RFC 3339, UTC, millisecond precision.
pub fn canonical_instant(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn canonical_punch(p: &Punch) -> CanonicalPunch<'_> {
    let m = &p.metadata;
    CanonicalPunch {
        kind: p.kind.to_db_str(),
        time: canonical_instant(&p.time),
        image: m.image.as_deref().unwrap_or(""),
        station: m.station.as_deref().unwrap_or(""),
        location: m.location.as_deref().unwrap_or(""),
        method: m.method.as_str(),
        ip: m.ip.as_deref().unwrap_or(""),
        note: m.note.as_deref().unwrap_or(""),
        status: p.status.as_str(),
    }
}

/// Bytes fed to the digest engine for `tc`.
pub fn canonical_bytes(tc: &Timecard) -> AppResult<Vec<u8>> {
    let view = CanonicalTimecard {
        employee_id: &tc.employee_id,
        date: tc.date_str(),
        punches: tc.punches.iter().map(canonical_punch).collect(),
        totals: CanonicalTotals {
            work_minutes: tc.totals.work_minutes,
            break_minutes: tc.totals.break_minutes,
            gross_minutes: tc.totals.gross_minutes,
            overtime_minutes: tc.totals.overtime_minutes,
        },
        previous_hash: tc.previous_hash.as_deref().unwrap_or(""),
        created_at: canonical_instant(&tc.created_at),
        policy_version: tc.policy_version.as_deref().unwrap_or(""),
        rules: CanonicalRules {
            paid_break: tc.rules.paid_break,
        },
    };

    Ok(serde_json::to_vec(&view)?)
}
