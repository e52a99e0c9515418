use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::auth::{self, Claims};
use crate::config::RouteConfig;
use crate::guard::{decide, Outcome, RedirectConfig};
use crate::session::{Role, SessionRead};

pub const NOTICE_HEADER: HeaderName = HeaderName::from_static("x-portal-notice");
pub const TOKEN_COOKIE: &str = "token";

/// Access rule for one group of pages.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub allowed: BTreeSet<Role>,
    pub redirects: RedirectConfig,
    pub routes: RouteConfig,
    pub jwt_secret: String,
}

impl RouteRule {
    pub fn new(allowed: BTreeSet<Role>, routes: RouteConfig, jwt_secret: impl Into<String>) -> Self {
        Self {
            allowed,
            redirects: RedirectConfig::default(),
            routes,
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn with_redirects(mut self, redirects: RedirectConfig) -> Self {
        self.redirects = redirects;
        self
    }
}

/// Server-side counterpart of the page guard: verifies the signed token and
/// redirects before the page handler runs. Verified claims are placed in the
/// request extensions.
///
/// Tokens must be HS256-signed with `PORTAL_JWT_SECRET` and carry a `role`
/// claim next to `sub`/`exp`. A backend token stored by `sign_in` only opens
/// guarded pages if the backend signs with the same secret and claim shape;
/// otherwise mint one with `portal auth token`.
pub async fn role_guard_middleware(
    State(rule): State<Arc<RouteRule>>,
    mut request: Request,
    next: Next,
) -> Response {
    let (read, claims) = session_from_headers(request.headers(), &rule.jwt_secret);

    match decide(&read, &rule.allowed, &rule.redirects, &rule.routes) {
        Outcome::Allow => {
            if let Some(claims) = claims {
                request.extensions_mut().insert(claims);
            }
            next.run(request).await
        }
        Outcome::Deny { target, notice } => {
            tracing::info!(
                path = %request.uri().path(),
                redirect = %target,
                "access denied by route guard"
            );
            let mut response = Redirect::temporary(&target).into_response();
            if let Ok(value) = HeaderValue::from_str(&notice.message) {
                response.headers_mut().insert(NOTICE_HEADER, value);
            }
            response
        }
        // Only reachable without a session source, which a request always has.
        Outcome::Checking => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

fn session_from_headers(headers: &HeaderMap, secret: &str) -> (SessionRead, Option<Claims>) {
    let Some(token) = extract_token(headers) else {
        return (SessionRead::Missing, None);
    };

    match auth::verify_token(&token, secret) {
        Ok(claims) if claims.role.as_ref().map_or(true, Role::is_blank) => {
            (SessionRead::Missing, None)
        }
        Ok(claims) => (SessionRead::Present(claims.to_session()), Some(claims)),
        Err(e) => {
            tracing::warn!("rejecting session token: {}", e);
            (SessionRead::Malformed(e.to_string()), None)
        }
    }
}

/// Bearer token from `Authorization`, else the `token` cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
