//! Gateway routes. Page groups sit behind the role-guard middleware; `/`,
//! `/signin` and `/health` are public.

pub mod pages;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::PortalConfig;
use crate::guard::{roles, RedirectConfig};
use crate::middleware::{role_guard_middleware, RouteRule};
use crate::session::Role;

pub fn app(config: &PortalConfig) -> Router {
    let rule = |names: &[&str]| {
        RouteRule::new(
            roles(names.iter().copied()),
            config.routes.clone(),
            config.security.jwt_secret.clone(),
        )
    };

    let admin = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/admin/users", get(pages::users))
        .route("/admin/coaches", get(pages::coaches))
        .route("/admin/credentials", get(pages::credentials))
        .route("/admin/payments", get(pages::payments))
        .route_layer(middleware::from_fn_with_state(
            Arc::new(rule(&["ADMIN"])),
            role_guard_middleware,
        ));

    let coach = Router::new()
        .route("/coach/courses", get(pages::coach_courses))
        .route_layer(middleware::from_fn_with_state(
            Arc::new(rule(&["COACH", "ADMIN"])),
            role_guard_middleware,
        ));

    let learner = Router::new()
        .route("/learn/courses", get(pages::learner_courses))
        .route_layer(middleware::from_fn_with_state(
            Arc::new(
                rule(&["LEARNER"])
                    .with_redirects(RedirectConfig::new().role(Role::Coach, "/coach/courses")),
            ),
            role_guard_middleware,
        ));

    let mut app = Router::new()
        .route("/", get(pages::root))
        .route("/health", get(pages::health))
        .route("/signin", get(pages::signin))
        .merge(admin)
        .merge(coach)
        .merge(learner)
        .layer(TraceLayer::new_for_http());

    if config.server.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }
    app
}
