use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{decide, Outcome, RedirectConfig, Severity};
use crate::config::RouteConfig;
use crate::session::{read_session, Role, SessionStore};

/// Moves the user elsewhere without leaving a history entry behind.
pub trait Navigator: Send + Sync {
    fn replace(&self, path: &str);
}

/// Transient, fire-and-forget user messages.
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Sends notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "portal::notice", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "portal::notice", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardDecision {
    pub is_checking: bool,
    pub is_authorized: bool,
}

impl GuardDecision {
    pub const CHECKING: GuardDecision = GuardDecision {
        is_checking: true,
        is_authorized: false,
    };

    pub const AUTHORIZED: GuardDecision = GuardDecision {
        is_checking: false,
        is_authorized: true,
    };

    pub const DENIED: GuardDecision = GuardDecision {
        is_checking: false,
        is_authorized: false,
    };
}

/// Page-level guard. Starts out checking; protected content must not render
/// until `is_checking` clears.
pub struct RoleGuard {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    routes: RouteConfig,
    last_inputs: Option<(BTreeSet<Role>, RedirectConfig)>,
    decision: GuardDecision,
}

impl RoleGuard {
    pub fn new(
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        routes: RouteConfig,
    ) -> Self {
        Self {
            store,
            navigator,
            notifier,
            routes,
            last_inputs: None,
            decision: GuardDecision::CHECKING,
        }
    }

    pub fn decision(&self) -> GuardDecision {
        self.decision
    }

    /// Swapping the navigator forces the next `sync` to re-check.
    pub fn set_navigator(&mut self, navigator: Arc<dyn Navigator>) {
        if !Arc::ptr_eq(&self.navigator, &navigator) {
            self.navigator = navigator;
            self.last_inputs = None;
        }
    }

    /// Re-runs the check only when the allow-list or redirect configuration
    /// differs from the previous run.
    pub fn sync(&mut self, allowed: &BTreeSet<Role>, redirects: &RedirectConfig) -> GuardDecision {
        let unchanged = matches!(
            &self.last_inputs,
            Some((last_allowed, last_redirects)) if last_allowed == allowed && last_redirects == redirects
        );
        if unchanged {
            return self.decision;
        }
        self.evaluate(allowed, redirects)
    }

    pub fn evaluate(&mut self, allowed: &BTreeSet<Role>, redirects: &RedirectConfig) -> GuardDecision {
        let read = read_session(self.store.as_ref());
        let outcome = decide(&read, allowed, redirects, &self.routes);

        self.decision = match outcome {
            Outcome::Checking => {
                tracing::debug!("no session store in this context, access check skipped");
                GuardDecision::CHECKING
            }
            Outcome::Allow => GuardDecision::AUTHORIZED,
            Outcome::Deny { target, notice } => {
                match notice.severity {
                    Severity::Warn => self.notifier.warn(&notice.message),
                    Severity::Error => self.notifier.error(&notice.message),
                }
                tracing::info!(redirect = %target, "access denied, redirecting");
                self.navigator.replace(&target);
                GuardDecision::DENIED
            }
        };
        self.last_inputs = Some((allowed.clone(), redirects.clone()));
        self.decision
    }
}
