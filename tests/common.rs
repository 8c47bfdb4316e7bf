#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rtc() -> Command {
    cargo_bin_cmd!("rtimecard")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimecard.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimecard_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Fresh database with the schema in place
pub fn init_db(db_path: &str) {
    rtc()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Backfill one day for `employee` from `KIND@TIME` punches
pub fn supplement(db_path: &str, employee: &str, date: &str, punches: &[&str]) {
    let mut args = vec!["--db", db_path, "supplement", employee, date];
    for p in punches {
        args.push("--punch");
        args.push(*p);
    }
    rtc().args(&args).assert().success();
}

/// A regular 08:00-16:00 UTC day with no break
pub fn work_day(db_path: &str, employee: &str, date: &str) {
    let clock_in = format!("in@{}T08:00:00Z", date);
    let clock_out = format!("out@{}T16:00:00Z", date);
    supplement(db_path, employee, date, &[clock_in.as_str(), clock_out.as_str()]);
}

/// `list --json` parsed, with any extra filter arguments
pub fn list_json(db_path: &str, extra: &[&str]) -> Vec<serde_json::Value> {
    let mut args = vec!["--db", db_path, "list", "--json"];
    args.extend_from_slice(extra);
    let out = rtc().args(&args).assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("list --json output")
}

pub fn show_json(db_path: &str, id: i64) -> serde_json::Value {
    let id = id.to_string();
    let out = rtc()
        .args(["--db", db_path, "show", &id, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&out).expect("show --json output")
}
