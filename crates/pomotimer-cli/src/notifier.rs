//! Terminal-side notification delivery.
//!
//! The engine only asks for "notify at T"; this scheduler remembers the one
//! pending request and the `watch` loop rings the terminal bell when it falls
//! due. One-shot commands exit long before that, so for them scheduling is
//! just logged.

use std::cell::RefCell;
use std::io::IsTerminal;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use pomotimer_core::{NotificationAuthorizer, NotificationScheduler, NotifyError};

#[derive(Debug, Clone, PartialEq)]
pub struct PendingNotification {
    pub at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default)]
pub struct TerminalNotifier {
    pending: Rc<RefCell<Option<PendingNotification>>>,
    permitted: bool,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the pending notification if it is due at `now`.
    pub fn take_due(&self, now: DateTime<Utc>) -> Option<PendingNotification> {
        let mut pending = self.pending.borrow_mut();
        if pending.as_ref().is_some_and(|n| n.at <= now) {
            pending.take()
        } else {
            None
        }
    }

    pub fn pending(&self) -> Option<PendingNotification> {
        self.pending.borrow().clone()
    }
}

impl NotificationAuthorizer for TerminalNotifier {
    fn request_permission(&mut self) -> Result<(), NotifyError> {
        if !std::io::stderr().is_terminal() {
            return Err(NotifyError::PermissionDenied);
        }
        self.permitted = true;
        Ok(())
    }
}

impl NotificationScheduler for TerminalNotifier {
    fn schedule_at(
        &mut self,
        at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        if !self.permitted {
            return Err(NotifyError::PermissionDenied);
        }
        tracing::info!(%at, title, body, "notification scheduled");
        *self.pending.borrow_mut() = Some(PendingNotification {
            at,
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<(), NotifyError> {
        if self.pending.borrow_mut().take().is_some() {
            tracing::debug!("pending notification cancelled");
        }
        Ok(())
    }
}
