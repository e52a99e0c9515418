use std::sync::Mutex;

use crate::guard::{Navigator, Notifier};
use crate::guard::Severity;

/// Navigator double that remembers every `replace` target.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn replace(&self, path: &str) {
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.to_string());
        }
    }
}

/// Notifier double that keeps `(severity, message)` pairs.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(Severity, String)> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn warn(&self, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((Severity::Warn, message.to_string()));
        }
    }

    fn error(&self, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((Severity::Error, message.to_string()));
        }
    }
}
