use chrono::{DateTime, Local, NaiveDate, SubsecRound, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of server-assigned capture times.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar-day key for a punch captured now.
    fn today(&self) -> NaiveDate;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Manually driven clock. Clones share the same instant, so a test can
/// keep one handle and move time under a ledger that owns another.
#[derive(Clone)]
pub struct FixedClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(now.trunc_subsecs(3))),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now.trunc_subsecs(3));
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    /// UTC calendar day, so tests do not depend on the host timezone.
    fn today(&self) -> NaiveDate {
        self.now.get().date_naive()
    }
}
