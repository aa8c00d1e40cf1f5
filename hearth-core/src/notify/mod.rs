//! Notification seam.
//!
//! Channel implementations (email, push) live with collaborators; the core
//! only defines the trait and a tracing-backed default used when nothing
//! richer is wired up.

use tracing::info;

/// Delivers a short message to a user.
pub trait Notifier: Send + Sync {
    fn notify(&self, user: &str, message: &str);
}

/// Writes notifications to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user: &str, message: &str) {
        info!(user, message, "notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, user: &str, message: &str) {
            self.sent
                .lock()
                .unwrap()
                .push((user.to_string(), message.to_string()));
        }
    }

    #[test]
    fn test_notifier_trait_object() {
        let recorder = RecordingNotifier {
            sent: Mutex::new(Vec::new()),
        };
        let notifier: &dyn Notifier = &recorder;
        notifier.notify("alice", "You've been assigned a new task: wash");
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }
}
