//! Role-based access decisions for guarded pages.
//!
//! [`decide`] is the pure rule set; [`RoleGuard`] wraps it with the
//! navigation and notification side effects a page needs.

pub mod role_guard;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::RouteConfig;
use crate::session::{Role, SessionRead};

pub use role_guard::{GuardDecision, Navigator, Notifier, RoleGuard, TracingNotifier};

/// Per-call-site redirect targets. Anything left unset falls back to the
/// route configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectConfig {
    pub unauthenticated: Option<String>,
    pub fallback: Option<String>,
    pub by_role: HashMap<Role, String>,
}

impl RedirectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unauthenticated(mut self, path: impl Into<String>) -> Self {
        self.unauthenticated = Some(path.into());
        self
    }

    pub fn fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = Some(path.into());
        self
    }

    pub fn role(mut self, role: Role, path: impl Into<String>) -> Self {
        self.by_role.insert(role, path.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    fn warn(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No persistent store to consult; leave the caller waiting.
    Checking,
    Allow,
    Deny { target: String, notice: Notice },
}

impl Outcome {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Outcome::Allow)
    }
}

pub fn decide(
    read: &SessionRead,
    allowed: &BTreeSet<Role>,
    redirects: &RedirectConfig,
    routes: &RouteConfig,
) -> Outcome {
    match read {
        SessionRead::Unavailable => Outcome::Checking,
        SessionRead::Missing => Outcome::Deny {
            target: redirects
                .unauthenticated
                .clone()
                .unwrap_or_else(|| routes.signin.clone()),
            notice: Notice::warn("Please sign in to continue."),
        },
        SessionRead::Malformed(reason) => {
            tracing::error!("stored session could not be parsed: {}", reason);
            Outcome::Deny {
                target: redirects
                    .fallback
                    .clone()
                    .unwrap_or_else(|| routes.signin.clone()),
                notice: Notice::error("Your session is invalid. Please sign in again."),
            }
        }
        SessionRead::Present(session) => match session.effective_role() {
            // read_session never yields this, but a hand-built read can.
            None => decide(&SessionRead::Missing, allowed, redirects, routes),
            Some(role) if allowed.contains(role) => Outcome::Allow,
            Some(role) => Outcome::Deny {
                target: role_redirect(role, redirects, routes),
                notice: Notice::warn(format!(
                    "The {} role does not have access to this page.",
                    role
                )),
            },
        },
    }
}

fn role_redirect(role: &Role, redirects: &RedirectConfig, routes: &RouteConfig) -> String {
    if let Some(path) = redirects.by_role.get(role) {
        return path.clone();
    }
    match role {
        Role::Admin => routes.dashboard.clone(),
        Role::Learner => routes.home.clone(),
        Role::Coach | Role::Unknown(_) => redirects
            .fallback
            .clone()
            .unwrap_or_else(|| routes.signin.clone()),
    }
}

/// Builds an allow-list from role names, e.g. `roles(["ADMIN", "COACH"])`.
pub fn roles<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<Role> {
    names.into_iter().map(Role::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn present(role: Role) -> SessionRead {
        SessionRead::Present(Session::new(role))
    }

    fn deny_target(outcome: Outcome) -> String {
        match outcome {
            Outcome::Deny { target, .. } => target,
            other => panic!("expected a denial, got {other:?}"),
        }
    }

    #[test]
    fn test_allowed_role_is_authorized() {
        let routes = RouteConfig::default();
        let allowed = roles(["ADMIN", "COACH"]);
        for role in [Role::Admin, Role::Coach] {
            let outcome = decide(&present(role), &allowed, &RedirectConfig::new(), &routes);
            assert_eq!(outcome, Outcome::Allow);
        }
    }

    #[test]
    fn test_authorized_iff_role_in_allow_list() {
        let routes = RouteConfig::default();
        let everyone = [
            Role::Admin,
            Role::Coach,
            Role::Learner,
            Role::Unknown("GUEST".to_string()),
        ];
        let allow_lists = [
            roles(Vec::<&str>::new()),
            roles(["ADMIN"]),
            roles(["COACH", "LEARNER"]),
            roles(["ADMIN", "COACH", "LEARNER", "GUEST"]),
        ];
        for allowed in &allow_lists {
            for role in &everyone {
                let outcome = decide(&present(role.clone()), allowed, &RedirectConfig::new(), &routes);
                assert_eq!(outcome.is_authorized(), allowed.contains(role), "{role} in {allowed:?}");
            }
        }
    }

    #[test]
    fn test_missing_session_goes_to_signin_with_warning() {
        let outcome = decide(
            &SessionRead::Missing,
            &roles(["COACH"]),
            &RedirectConfig::new(),
            &RouteConfig::default(),
        );
        match outcome {
            Outcome::Deny { target, notice } => {
                assert_eq!(target, "/signin");
                assert_eq!(notice.severity, Severity::Warn);
            }
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_session_honours_unauthenticated_override() {
        let redirects = RedirectConfig::new()
            .unauthenticated("/login")
            .fallback("/oops");
        let outcome = decide(&SessionRead::Missing, &roles(["COACH"]), &redirects, &RouteConfig::default());
        assert_eq!(deny_target(outcome), "/login");
    }

    #[test]
    fn test_malformed_session_goes_to_fallback_with_error() {
        let redirects = RedirectConfig::new().fallback("/oops");
        let outcome = decide(
            &SessionRead::Malformed("bad".to_string()),
            &roles(["ADMIN"]),
            &redirects,
            &RouteConfig::default(),
        );
        match outcome {
            Outcome::Deny { target, notice } => {
                assert_eq!(target, "/oops");
                assert_eq!(notice.severity, Severity::Error);
            }
            other => panic!("expected denial, got {other:?}"),
        }

        let outcome = decide(
            &SessionRead::Malformed("bad".to_string()),
            &roles(["ADMIN"]),
            &RedirectConfig::new(),
            &RouteConfig::default(),
        );
        assert_eq!(deny_target(outcome), "/signin");
    }

    #[test]
    fn test_roleless_present_session_matches_missing() {
        let redirects = RedirectConfig::new().unauthenticated("/welcome");
        let routes = RouteConfig::default();
        let roleless = SessionRead::Present(Session {
            role: None,
            extra: Default::default(),
        });
        assert_eq!(
            decide(&roleless, &roles(["ADMIN"]), &redirects, &routes),
            decide(&SessionRead::Missing, &roles(["ADMIN"]), &redirects, &routes),
        );
    }

    #[test]
    fn test_blank_role_matches_missing() {
        let redirects = RedirectConfig::new().unauthenticated("/welcome");
        let routes = RouteConfig::default();
        let blank = SessionRead::Present(Session::new(Role::from("")));
        assert_eq!(
            decide(&blank, &roles(["ADMIN"]), &redirects, &routes),
            decide(&SessionRead::Missing, &roles(["ADMIN"]), &redirects, &routes),
        );
    }

    #[test]
    fn test_unknown_role_names_match_regardless_of_case() {
        let routes = RouteConfig::default();
        let guest = SessionRead::Present(Session::new(Role::from("GUEST")));
        assert_eq!(decide(&guest, &roles(["guest"]), &RedirectConfig::new(), &routes), Outcome::Allow);

        let padded = SessionRead::Present(Session::new(Role::from(" guest ")));
        assert_eq!(decide(&padded, &roles(["GUEST"]), &RedirectConfig::new(), &routes), Outcome::Allow);
    }

    #[test]
    fn test_admin_without_override_lands_on_dashboard() {
        let outcome = decide(
            &present(Role::Admin),
            &roles(["LEARNER"]),
            &RedirectConfig::new(),
            &RouteConfig::default(),
        );
        assert_eq!(deny_target(outcome), "/dashboard");
    }

    #[test]
    fn test_role_redirect_fallback_policy() {
        let routes = RouteConfig::default();
        let allowed = roles(["ADMIN"]);
        let plain = RedirectConfig::new();
        let with_fallback = RedirectConfig::new().fallback("/help");

        assert_eq!(deny_target(decide(&present(Role::Learner), &allowed, &plain, &routes)), "/");
        assert_eq!(deny_target(decide(&present(Role::Coach), &allowed, &plain, &routes)), "/signin");
        assert_eq!(
            deny_target(decide(&present(Role::Coach), &allowed, &with_fallback, &routes)),
            "/help"
        );
        assert_eq!(
            deny_target(decide(
                &present(Role::Unknown("REFEREE".to_string())),
                &allowed,
                &with_fallback,
                &routes
            )),
            "/help"
        );
    }

    #[test]
    fn test_role_specific_override_wins() {
        let redirects = RedirectConfig::new()
            .role(Role::Admin, "/admin/home")
            .role(Role::Coach, "/coach/schedule");
        let routes = RouteConfig::default();
        let allowed = roles(["LEARNER"]);
        assert_eq!(deny_target(decide(&present(Role::Admin), &allowed, &redirects, &routes)), "/admin/home");
        assert_eq!(deny_target(decide(&present(Role::Coach), &allowed, &redirects, &routes)), "/coach/schedule");
    }

    #[test]
    fn test_unavailable_store_keeps_checking() {
        let outcome = decide(
            &SessionRead::Unavailable,
            &roles(["ADMIN"]),
            &RedirectConfig::new(),
            &RouteConfig::default(),
        );
        assert_eq!(outcome, Outcome::Checking);
        assert!(!outcome.is_authorized());
    }
}
