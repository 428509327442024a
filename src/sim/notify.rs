use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    DeliveryShortfall,
    ConstructionCompleted,
    MessageReceived,
    StratagemSuspended,
    StratagemCompleted,
    CrimePrevented,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub citizen: u64,
    pub kind: NotificationKind,
    pub content: String,
}

/// Fire-and-forget delivery of notifications to affected actors. A sink
/// must never fail the caller.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _notification: Notification) {}
}

/// Collects notifications for inspection in tests. The handle is shared
/// so the caller can read what was sent while the engine owns the sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Rc<RefCell<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Rc<RefCell<Vec<Notification>>> {
        self.sent.clone()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&mut self, notification: Notification) {
        self.sent.borrow_mut().push(notification);
    }
}
