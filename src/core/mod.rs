pub mod calculator;
pub mod canonical;
pub mod chain;
pub mod clock;
pub mod digest;
pub mod ledger;
pub mod log;
pub mod notify;
pub mod punch_log;
pub mod verify;
