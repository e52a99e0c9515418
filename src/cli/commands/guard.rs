use clap::Subcommand;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config::{PortalConfig, RouteConfig};
use crate::guard::{
    roles, GuardDecision, Navigator, Notifier, RedirectConfig, RoleGuard, TracingNotifier,
};
use crate::session::{FileSessionStore, Role, SessionStore};

#[derive(Subcommand)]
pub enum GuardCommands {
    #[command(about = "Check whether the stored session may open a page")]
    Check {
        #[arg(long = "allow", value_delimiter = ',', required = true, help = "Allowed roles (ADMIN, COACH, LEARNER)")]
        allow: Vec<String>,
        #[arg(long, help = "Redirect target when nobody is signed in")]
        unauthenticated: Option<String>,
        #[arg(long, help = "Redirect target for malformed sessions and unmapped roles")]
        fallback: Option<String>,
        #[arg(long = "redirect", help = "Role-specific redirect, ROLE=PATH (repeatable)")]
        redirect: Vec<String>,
    },
}

/// Remembers where the guard sent the user instead of navigating.
#[derive(Debug, Default)]
struct CapturedRedirect(Mutex<Option<String>>);

impl CapturedRedirect {
    fn target(&self) -> Option<String> {
        self.0.lock().ok().and_then(|t| t.clone())
    }
}

impl Navigator for CapturedRedirect {
    fn replace(&self, path: &str) {
        if let Ok(mut target) = self.0.lock() {
            *target = Some(path.to_string());
        }
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn warn(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

/// Result of one access check as printed by `guard check`.
#[derive(Debug)]
struct CheckReport {
    decision: GuardDecision,
    redirect: Option<String>,
}

impl CheckReport {
    fn to_json(&self) -> Value {
        json!({
            "isChecking": self.decision.is_checking,
            "isAuthorized": self.decision.is_authorized,
            "redirect": self.redirect,
        })
    }
}

fn check_access(
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    routes: &RouteConfig,
    allowed: &BTreeSet<Role>,
    redirects: &RedirectConfig,
) -> CheckReport {
    let navigator = Arc::new(CapturedRedirect::default());
    let mut guard = RoleGuard::new(store, navigator.clone(), notifier, routes.clone());
    let decision = guard.evaluate(allowed, redirects);
    CheckReport {
        decision,
        redirect: navigator.target(),
    }
}

fn redirects_from_args(
    unauthenticated: Option<String>,
    fallback: Option<String>,
    redirect: &[String],
) -> anyhow::Result<RedirectConfig> {
    let mut redirects = RedirectConfig::new();
    redirects.unauthenticated = unauthenticated;
    redirects.fallback = fallback;
    for raw in redirect {
        let (role, path) = parse_key_value(raw)?;
        redirects = redirects.role(Role::from(role.as_str()), path);
    }
    Ok(redirects)
}

pub async fn handle(
    cmd: GuardCommands,
    config: &PortalConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        GuardCommands::Check {
            allow,
            unauthenticated,
            fallback,
            redirect,
        } => {
            let allowed = roles(allow.iter().map(String::as_str));
            let redirects = redirects_from_args(unauthenticated, fallback, &redirect)?;

            // JSON output keeps stdout machine-readable; notices go to the log.
            let notifier: Arc<dyn Notifier> = match output_format {
                OutputFormat::Json => Arc::new(TracingNotifier),
                OutputFormat::Text => Arc::new(ConsoleNotifier),
            };
            let report = check_access(
                Arc::new(FileSessionStore::from_env()),
                notifier,
                &config.routes,
                &allowed,
                &redirects,
            );

            if report.decision.is_authorized {
                return output_success(&output_format, "Access granted", Some(report.to_json()));
            }
            if report.decision.is_checking {
                output_error(&output_format, "No session store available; access not evaluated", Some("STORE_UNAVAILABLE"))?;
                anyhow::bail!("access check did not complete");
            }

            match output_format {
                OutputFormat::Json => output_value(&output_format, &report.to_json())?,
                OutputFormat::Text => println!(
                    "✗ Access denied, redirect to {}",
                    report.redirect.as_deref().unwrap_or_default()
                ),
            }
            anyhow::bail!("access denied")
        }
    }
}
