//! Outbound "record changed" notifications.
//!
//! The ledger calls a `ChangeNotifier` after every committed create,
//! update or delete. Who listens (dashboards, audit trails) is up to the
//! embedding application.

use crate::models::timecard::Timecard;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    /// Event topic, e.g. `timecard:update`.
    pub fn topic(&self) -> &'static str {
        match self {
            ChangeKind::Created => "timecard:create",
            ChangeKind::Updated => "timecard:update",
            ChangeKind::Deleted => "timecard:delete",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordChange {
    pub kind: ChangeKind,
    pub timecard: Timecard,
}

pub trait ChangeNotifier {
    fn notify(&self, change: &RecordChange);
}

pub struct NullNotifier;

impl ChangeNotifier for NullNotifier {
    fn notify(&self, _change: &RecordChange) {}
}

/// Writes `<topic> <json>` lines to stdout.
pub struct StdoutNotifier;

impl ChangeNotifier for StdoutNotifier {
    fn notify(&self, change: &RecordChange) {
        match serde_json::to_string(&change.timecard) {
            Ok(json) => println!("{} {}", change.kind.topic(), json),
            Err(e) => crate::ui::messages::warning(format!(
                "Could not serialize change notification: {}",
                e
            )),
        }
    }
}

/// Keeps every change in a shared buffer.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    changes: Rc<RefCell<Vec<RecordChange>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kinds(&self) -> Vec<ChangeKind> {
        self.changes.borrow().iter().map(|c| c.kind).collect()
    }
}

impl ChangeNotifier for MemoryNotifier {
    fn notify(&self, change: &RecordChange) {
        self.changes.borrow_mut().push(change.clone());
    }
}
