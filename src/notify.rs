//! Transient user notifications
//!
//! Notifications raised while an edit runs are queued and only shown once the
//! caller has committed (or abandoned) the edit, mirroring a popup that is
//! dispatched after the current write action finishes.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{info, warn};

use crate::template::LifecycleMethod;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// A message shown near the caret that fades out after `fadeout`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub fadeout: Duration,
}

impl Notification {
    /// Announce a freshly created lifecycle method
    pub fn method_created(method: LifecycleMethod, fadeout: Duration) -> Self {
        Self {
            level: Level::Info,
            message: format!(
                "No {method} method was found, so one has been created. \
                 Run FindViewById again to generate the view bindings."
            ),
            fadeout,
        }
    }

    /// Surface a failed edit
    pub fn error(message: impl Into<String>, fadeout: Duration) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
            fadeout,
        }
    }
}

/// Displays notifications to the user
pub trait Notifier {
    fn show(&mut self, notification: &Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&mut self, notification: &Notification) {
        let fadeout_secs = notification.fadeout.as_secs();
        match notification.level {
            Level::Info => info!(fadeout_secs, "{}", notification.message),
            Level::Error => warn!(fadeout_secs, "{}", notification.message),
        }
    }
}

/// Notifications waiting for the current edit to finish
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: VecDeque<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.pending.push_back(notification);
    }

    pub fn pending(&self) -> impl Iterator<Item = &Notification> {
        self.pending.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Show every queued notification in order and empty the queue
    pub fn flush<N: Notifier + ?Sized>(&mut self, notifier: &mut N) -> usize {
        let mut shown = 0;
        while let Some(notification) = self.pending.pop_front() {
            notifier.show(&notification);
            shown += 1;
        }
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl Notifier for Recorder {
        fn show(&mut self, notification: &Notification) {
            self.0.push(notification.message.clone());
        }
    }

    #[test]
    fn test_flush_in_order() {
        let mut queue = NotificationQueue::new();
        queue.push(Notification::error("first", Duration::from_secs(1)));
        queue.push(Notification::method_created(
            LifecycleMethod::OnCreateView,
            Duration::from_secs(10),
        ));

        let mut recorder = Recorder::default();
        assert_eq!(queue.flush(&mut recorder), 2);
        assert!(queue.is_empty());
        assert_eq!(recorder.0[0], "first");
        assert!(recorder.0[1].contains("onCreateView"));
    }
}
