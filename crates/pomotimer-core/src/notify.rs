//! Notification collaborator interfaces.
//!
//! The engine asks a [`NotificationScheduler`] to announce the end of an
//! interval and to cancel pending announcements. Delivery is someone else's
//! problem: every error is logged here and otherwise ignored, so a missing
//! permission or a broken backend never changes timer state.

use chrono::{DateTime, Utc};

use crate::error::NotifyError;

/// Schedules local "interval finished" notifications.
pub trait NotificationScheduler {
    /// Request a notification at `at`.
    fn schedule_at(
        &mut self,
        at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError>;

    /// Drop every pending notification.
    fn cancel_all(&mut self) -> Result<(), NotifyError>;
}

/// Asks the platform for permission to post notifications.
pub trait NotificationAuthorizer {
    fn request_permission(&mut self) -> Result<(), NotifyError>;
}

/// Scheduler that does nothing. Used when notifications are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler;

impl NotificationScheduler for NoopScheduler {
    fn schedule_at(
        &mut self,
        _at: DateTime<Utc>,
        _title: &str,
        _body: &str,
    ) -> Result<(), NotifyError> {
        Ok(())
    }

    fn cancel_all(&mut self) -> Result<(), NotifyError> {
        Ok(())
    }
}

impl NotificationAuthorizer for NoopScheduler {
    fn request_permission(&mut self) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Request permission once at startup. Returns whether it was granted.
pub fn authorize(authorizer: &mut dyn NotificationAuthorizer) -> bool {
    match authorizer.request_permission() {
        Ok(()) => true,
        Err(e) => {
            tracing::info!(error = %e, "notifications unavailable; timer continues without them");
            false
        }
    }
}

/// Fire-and-forget wrapper the engine talks through.
pub(crate) struct Notifier {
    scheduler: Box<dyn NotificationScheduler>,
    title: String,
}

impl Notifier {
    pub(crate) fn new(scheduler: Box<dyn NotificationScheduler>, title: impl Into<String>) -> Self {
        Self {
            scheduler,
            title: title.into(),
        }
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replace any pending notification with one at `at`. Skipped when `at`
    /// is not in the future.
    pub(crate) fn schedule(&mut self, at: DateTime<Utc>, body: &str, now: DateTime<Utc>) {
        if at <= now {
            return;
        }
        self.cancel();
        if let Err(e) = self.scheduler.schedule_at(at, &self.title, body) {
            tracing::warn!(error = %e, %at, "notification scheduling failed");
        }
    }

    pub(crate) fn cancel(&mut self) {
        if let Err(e) = self.scheduler.cancel_all() {
            tracing::warn!(error = %e, "notification cancellation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Failing {
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl NotificationScheduler for Failing {
        fn schedule_at(
            &mut self,
            _at: DateTime<Utc>,
            _title: &str,
            _body: &str,
        ) -> Result<(), NotifyError> {
            self.calls.borrow_mut().push("schedule");
            Err(NotifyError::PermissionDenied)
        }

        fn cancel_all(&mut self) -> Result<(), NotifyError> {
            self.calls.borrow_mut().push("cancel");
            Err(NotifyError::CancelFailed("offline".into()))
        }
    }

    impl NotificationAuthorizer for Failing {
        fn request_permission(&mut self) -> Result<(), NotifyError> {
            Err(NotifyError::PermissionDenied)
        }
    }

    #[test]
    fn schedule_cancels_first_and_swallows_errors() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = Notifier::new(Box::new(Failing { calls: calls.clone() }), "Pomodoro");
        let now = Utc::now();

        notifier.schedule(now + chrono::Duration::seconds(10), "done", now);
        assert_eq!(*calls.borrow(), vec!["cancel", "schedule"]);
    }

    #[test]
    fn past_instants_are_not_scheduled() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = Notifier::new(Box::new(Failing { calls: calls.clone() }), "Pomodoro");
        let now = Utc::now();

        notifier.schedule(now, "done", now);
        notifier.schedule(now - chrono::Duration::seconds(1), "done", now);
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn authorize_reports_outcome() {
        assert!(authorize(&mut NoopScheduler));
        assert!(!authorize(&mut Failing::default()));
    }
}
