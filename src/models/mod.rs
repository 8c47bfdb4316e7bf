pub mod punch;
pub mod punch_type;
pub mod query;
pub mod timecard;
