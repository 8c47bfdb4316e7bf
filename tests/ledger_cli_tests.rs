use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::{init_db, list_json, rtc, setup_test_db, show_json, supplement, temp_out, work_day};

fn totals(tc: &serde_json::Value) -> (i64, i64, i64, i64) {
    let t = &tc["totals"];
    (
        t["workMinutes"].as_i64().unwrap(),
        t["breakMinutes"].as_i64().unwrap(),
        t["grossMinutes"].as_i64().unwrap(),
        t["overtimeMinutes"].as_i64().unwrap(),
    )
}

fn id_of(tc: &serde_json::Value) -> i64 {
    tc["id"].as_i64().unwrap()
}

#[test]
fn test_supplement_derives_totals() {
    let db_path = setup_test_db("cli_supplement_totals");
    init_db(&db_path);

    // plain eight hours
    supplement(
        &db_path,
        "emp-a",
        "2025-03-03",
        &["in@2025-03-03T09:00:00Z", "out@2025-03-03T17:00:00Z"],
    );
    // eight hours of work around a 30 minute break
    supplement(
        &db_path,
        "emp-b",
        "2025-03-03",
        &[
            "in@2025-03-03T08:00:00Z",
            "bs@2025-03-03T12:00:00Z",
            "be@2025-03-03T12:30:00Z",
            "out@2025-03-03T16:30:00Z",
        ],
    );
    // nine hours, one of them overtime
    supplement(
        &db_path,
        "emp-c",
        "2025-03-03",
        &["out@2025-03-03T18:00:00Z", "in@2025-03-03T09:00:00Z"],
    );

    let a = list_json(&db_path, &["--employee", "emp-a"]);
    let b = list_json(&db_path, &["--employee", "emp-b"]);
    let c = list_json(&db_path, &["--employee", "emp-c"]);

    assert_eq!(totals(&a[0]), (480, 0, 480, 0));
    assert_eq!(totals(&b[0]), (480, 30, 510, 0));
    assert_eq!(totals(&c[0]), (540, 0, 540, 60));
    assert_eq!(c[0]["punches"][0]["type"], "Clock In");
    assert!(a[0]["previousHash"].is_null());
}

#[test]
fn test_supplement_rejects_malformed_punch() {
    let db_path = setup_test_db("cli_supplement_bad_punch");
    init_db(&db_path);

    rtc()
        .args([
            "--db",
            &db_path,
            "supplement",
            "emp-1",
            "2025-03-03",
            "--punch",
            "lunch@12:00",
        ])
        .assert()
        .failure()
        .stderr(contains("invalid punch type"));

    assert!(list_json(&db_path, &[]).is_empty());
}

#[test]
fn test_verify_intact_chain() {
    let db_path = setup_test_db("cli_verify_intact");
    init_db(&db_path);

    for date in ["2025-03-03", "2025-03-04", "2025-03-05"] {
        work_day(&db_path, "emp-1", date);
    }

    let records = list_json(&db_path, &["--employee", "emp-1"]);
    assert_eq!(records.len(), 3);
    assert_eq!(records[1]["previousHash"], records[0]["currentHash"]);
    assert_eq!(records[2]["previousHash"], records[1]["currentHash"]);

    rtc()
        .args(["--db", &db_path, "verify", "emp-1"])
        .assert()
        .success()
        .stdout(contains("3 timecard(s) checked, chain intact"));
}

#[test]
fn test_verify_employee_without_records() {
    let db_path = setup_test_db("cli_verify_empty");
    init_db(&db_path);

    rtc()
        .args(["--db", &db_path, "verify", "nobody"])
        .assert()
        .success()
        .stdout(contains("0 timecard(s) checked, chain intact"));
}

#[test]
fn test_verify_detects_storage_tampering() {
    let db_path = setup_test_db("cli_verify_tampered");
    init_db(&db_path);
    work_day(&db_path, "emp-1", "2025-03-03");
    work_day(&db_path, "emp-1", "2025-03-04");

    let first = id_of(&list_json(&db_path, &["--employee", "emp-1"])[0]);

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "UPDATE timecards SET work_minutes = 600 WHERE id = ?1",
        [first],
    )
    .unwrap();
    drop(conn);

    rtc()
        .args(["--db", &db_path, "verify", "emp-1"])
        .assert()
        .failure()
        .stdout(contains("Hash mismatch"))
        .stderr(contains("integrity violation"));

    rtc()
        .args(["--db", &db_path, "verify", "--record", &first.to_string()])
        .assert()
        .failure()
        .stdout(contains("does not match stored hash"));
}

#[test]
fn test_retroactive_edit_breaks_next_link() {
    let db_path = setup_test_db("cli_retroactive_edit");
    init_db(&db_path);
    work_day(&db_path, "emp-1", "2025-03-03");
    work_day(&db_path, "emp-1", "2025-03-04");

    let records = list_json(&db_path, &["--employee", "emp-1"]);
    let first = id_of(&records[0]);
    let out_seq = records[0]["punches"][1]["seq"].as_i64().unwrap().to_string();

    rtc()
        .args([
            "--db",
            &db_path,
            "edit",
            &first.to_string(),
            "--seq",
            &out_seq,
            "--time",
            "2025-03-03T17:00:00Z",
            "--by",
            "supervisor-7",
            "--reason",
            "forgot to clock out",
        ])
        .assert()
        .success()
        .stdout(contains("edited"));

    let edited = show_json(&db_path, first);
    assert_eq!(totals(&edited), (540, 0, 540, 60));
    // [0] is the backfill entry written by supplement
    assert_eq!(edited["auditLog"][0]["action"], "create");
    assert_eq!(edited["auditLog"][1]["action"], "update");
    assert_eq!(edited["auditLog"][1]["createdBy"], "supervisor-7");

    rtc()
        .args(["--db", &db_path, "verify", "--record", &first.to_string()])
        .assert()
        .success();

    rtc()
        .args(["--db", &db_path, "verify", "emp-1"])
        .assert()
        .failure()
        .stdout(contains("Chain broken"));
}

#[test]
fn test_clock_in_break_and_out() {
    let db_path = setup_test_db("cli_live_punches");
    init_db(&db_path);

    rtc()
        .args(["--db", &db_path, "in", "emp-9", "--station", "lobby-2"])
        .assert()
        .success()
        .stdout(contains("Clock In recorded on timecard #1"));

    for cmd in ["break-start", "break-end", "out"] {
        rtc()
            .args(["--db", &db_path, cmd, "1"])
            .assert()
            .success();
    }

    let tc = show_json(&db_path, 1);
    let kinds: Vec<&str> = tc["punches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["Clock In", "Break Start", "Break End", "Clock Out"]);
    assert_eq!(tc["punches"][0]["station"], "lobby-2");
    assert_eq!(tc["version"], 3);

    rtc()
        .args(["--db", &db_path, "show", "1"])
        .assert()
        .success()
        .stdout(contains("content matches stored hash"))
        .stdout(contains("lobby-2"));
}

#[test]
fn test_punch_on_missing_timecard_fails() {
    let db_path = setup_test_db("cli_punch_missing");
    init_db(&db_path);

    rtc()
        .args(["--db", &db_path, "break-start", "42"])
        .assert()
        .failure()
        .stderr(contains("Validation error"));

    rtc()
        .args(["--db", &db_path, "approve", "42", "--by", "sup"])
        .assert()
        .failure()
        .stderr(contains("Not found"));
}

#[test]
fn test_delete_keeps_chain_and_hides_record() {
    let db_path = setup_test_db("cli_soft_delete");
    init_db(&db_path);
    work_day(&db_path, "emp-1", "2025-03-03");
    work_day(&db_path, "emp-1", "2025-03-04");

    let first = id_of(&list_json(&db_path, &["--employee", "emp-1"])[0]);

    rtc()
        .args([
            "--db",
            &db_path,
            "del",
            &first.to_string(),
            "--yes",
            "--by",
            "supervisor-7",
            "--reason",
            "duplicate",
        ])
        .assert()
        .success()
        .stdout(contains("has been deleted"));

    assert_eq!(list_json(&db_path, &["--employee", "emp-1"]).len(), 1);
    assert_eq!(list_json(&db_path, &["--employee", "emp-1", "--deleted"]).len(), 2);

    rtc()
        .args(["--db", &db_path, "verify", "emp-1"])
        .assert()
        .success();

    rtc()
        .args(["--db", &db_path, "out", &first.to_string()])
        .assert()
        .failure()
        .stderr(contains("deleted"));
}

#[test]
fn test_delete_requires_confirmation() {
    let db_path = setup_test_db("cli_delete_cancelled");
    init_db(&db_path);
    work_day(&db_path, "emp-1", "2025-03-03");

    rtc()
        .args(["--db", &db_path, "del", "1", "--by", "sup"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Operation cancelled"));

    assert_eq!(list_json(&db_path, &[]).len(), 1);
}

#[test]
fn test_approval_and_overtime() {
    let db_path = setup_test_db("cli_approval");
    init_db(&db_path);
    supplement(
        &db_path,
        "emp-1",
        "2025-03-03",
        &["in@2025-03-03T08:00:00Z", "out@2025-03-03T18:00:00Z"],
    );

    rtc()
        .args(["--db", &db_path, "overtime", "1", "--minutes", "90", "--by", "sup"])
        .assert()
        .success();
    rtc()
        .args(["--db", &db_path, "review", "1", "--seq", "1", "--status", "approved", "--by", "sup"])
        .assert()
        .success();
    rtc()
        .args(["--db", &db_path, "approve", "1", "--by", "sup", "--reason", "ok"])
        .assert()
        .success();

    let tc = show_json(&db_path, 1);
    assert_eq!(tc["status"], "Approved");
    assert_eq!(tc["overtime"]["approvedMinutes"], 90);
    assert_eq!(tc["punches"][0]["status"], "Approved");
    assert_eq!(tc["auditLog"].as_array().unwrap().len(), 4);

    assert_eq!(list_json(&db_path, &["--status", "approved"]).len(), 1);
    assert!(list_json(&db_path, &["--status", "pending"]).is_empty());

    rtc()
        .args(["--db", &db_path, "overtime", "1", "--minutes", "-5", "--by", "sup"])
        .assert()
        .failure();
}

#[test]
fn test_list_filters_by_range() {
    let db_path = setup_test_db("cli_list_range");
    init_db(&db_path);
    for date in ["2025-02-27", "2025-03-03", "2025-03-10"] {
        work_day(&db_path, "emp-1", date);
    }

    let march = list_json(&db_path, &["--from", "2025-03-01", "--to", "2025-03-31"]);
    assert_eq!(march.len(), 2);

    rtc()
        .args(["--db", &db_path, "list", "--date", "2025-03-10"])
        .assert()
        .success()
        .stdout(contains("2025-03-10").and(contains("2025-03-03").not()));

    rtc()
        .args(["--db", &db_path, "list", "--from", "03/01/2025"])
        .assert()
        .failure()
        .stderr(contains("Invalid date"));
}

#[test]
fn test_export_csv_and_json() {
    let db_path = setup_test_db("cli_export");
    init_db(&db_path);
    work_day(&db_path, "emp-1", "2025-03-03");
    work_day(&db_path, "emp-2", "2025-03-03");

    let csv_path = temp_out("cli_export_csv", "csv");
    rtc()
        .args([
            "--db", &db_path, "export", "--format", "csv", "--file", &csv_path, "--employee",
            "emp-1",
        ])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id,employee_id,date,status"));
    assert!(lines[1].contains("emp-1"));
    assert!(lines[1].contains(",480,"));

    let json_path = temp_out("cli_export_json", "json");
    rtc()
        .args(["--db", &db_path, "export", "--format", "json", "--file", &json_path])
        .assert()
        .success();

    let exported: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(exported.len(), 2);
    assert!(exported[0]["currentHash"].is_string());

    // existing file, no --force, answer no
    rtc()
        .args(["--db", &db_path, "export", "--format", "json", "--file", &json_path])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(contains("not overwritten"));
}

#[test]
fn test_export_requires_absolute_path() {
    let db_path = setup_test_db("cli_export_relative");
    init_db(&db_path);

    rtc()
        .args(["--db", &db_path, "export", "--format", "csv", "--file", "out.csv"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_log_records_ledger_writes() {
    let db_path = setup_test_db("cli_log_print");
    init_db(&db_path);
    work_day(&db_path, "emp-1", "2025-03-03");

    rtc()
        .args(["--db", &db_path, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("migration_applied"))
        .stdout(contains("init"))
        .stdout(contains("supplement"));
}

#[test]
fn test_db_info_and_check() {
    let db_path = setup_test_db("cli_db_info");
    init_db(&db_path);
    work_day(&db_path, "emp-1", "2025-03-03");

    rtc()
        .args(["--db", &db_path, "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("Timecards:"))
        .stdout(contains("Integrity check passed"));
}

#[test]
fn test_config_print() {
    let db_path = setup_test_db("cli_config_print");

    rtc()
        .args(["--db", &db_path, "--test", "config", "--print"])
        .assert()
        .success()
        .stdout(contains("policy_version"))
        .stdout(contains("max_create_attempts"));
}
