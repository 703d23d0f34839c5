//! Router assembly.

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::middleware::jwt_auth_middleware;
use super::routes::{health, members, session};
use crate::kernel::ServerDeps;

/// Build the application router with all routes and layers.
pub fn build_app(deps: ServerDeps) -> Router {
    let jwt_service = deps.jwt_service.clone();

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/auth/sign-in", post(session::sign_in_handler))
        .route("/auth/sign-out", post(session::sign_out_handler))
        .route("/members", get(members::list_members_handler))
        .route("/members/stats", get(members::member_stats_handler))
        .route("/members/pre-register", post(members::pre_register_handler))
        .route("/members/:id/check-in", post(members::check_in_handler))
        .route("/members/:id/role", patch(members::update_role_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(move |request, next| {
                    jwt_auth_middleware(jwt_service.clone(), request, next)
                })),
        )
        .with_state(deps)
}
