use super::timecard::TimecardStatus;
use chrono::NaiveDate;

/// Filter for `get` / `list`. Empty query matches every live record.
#[derive(Debug, Clone, Default)]
pub struct TimecardQuery {
    pub id: Option<i64>,
    pub employee_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<TimecardStatus>,
    pub include_deleted: bool,
}

impl TimecardQuery {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            include_deleted: true,
            ..Self::default()
        }
    }

    pub fn for_employee(employee_id: &str) -> Self {
        Self {
            employee_id: Some(employee_id.to_string()),
            ..Self::default()
        }
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}
