//! Integration tests for the HTTP surface.
//!
//! Exercises the route handlers directly: sign-in token issuance, error
//! mapping, and admin gating on the roster endpoints.

mod common;

use axum::extract::{Extension, Path, State};
use axum::Json;
use common::TestHarness;
use server_core::common::AppState;
use server_core::domains::auth::AuthError;
use server_core::domains::member::actions::reconcile_sign_in;
use server_core::domains::member::models::{MemberKey, Role};
use server_core::kernel::test_dependencies::{test_profile, MockIdentityGateway};
use server_core::kernel::StoreError;
use server_core::server::routes::members::{
    check_in_handler, list_members_handler, member_stats_handler, pre_register_handler,
    update_role_handler, PreRegisterRequest, UpdateRoleRequest,
};
use server_core::server::routes::session::{sign_in_handler, sign_out_handler, SignInRequest};
use server_core::server::routes::ApiError;
use test_context::test_context;

fn admin_state() -> AppState {
    AppState::authenticated("admin-uid", true)
}

fn user_state() -> AppState {
    AppState::authenticated("uid9", false)
}

// ============================================================================
// Sign-in / sign-out
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_sign_in_route_issues_token_with_stored_role(ctx: &TestHarness) {
    let gateway =
        MockIdentityGateway::new().with_profile(test_profile("uid1", "a@x.com", "Ada"));
    let deps = ctx.deps_with_gateway(gateway);

    let response = sign_in_handler(
        State(deps),
        Json(SignInRequest {
            credential: "cred".to_string(),
        }),
    )
    .await
    .unwrap();

    let claims = ctx.jwt_service.verify_token(&response.0.token).unwrap();
    assert_eq!(claims.sub, "uid1");
    assert_eq!(claims.email, "a@x.com");
    assert!(!claims.is_admin());
    assert_eq!(response.0.member.role, Role::User);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_sign_in_route_surfaces_gateway_failure(ctx: &TestHarness) {
    let gateway = MockIdentityGateway::new()
        .with_failure(AuthError::InvalidCredential("bad token".to_string()));
    let deps = ctx.deps_with_gateway(gateway);

    let result = sign_in_handler(
        State(deps),
        Json(SignInRequest {
            credential: "bad".to_string(),
        }),
    )
    .await;

    assert!(matches!(result, Err(ApiError::Auth(_))));
    assert!(ctx.store.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_sign_out_route_requires_auth(ctx: &TestHarness) {
    let deps = ctx.deps_with_gateway(MockIdentityGateway::new());

    let result = sign_out_handler(State(deps), Extension(AppState::anonymous())).await;
    assert!(matches!(result, Err(ApiError::Unauthenticated)));
}

// ============================================================================
// Admin gating
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_members_route_rejects_unauthenticated(ctx: &TestHarness) {
    let deps = ctx.deps_with_gateway(MockIdentityGateway::new());

    let result = list_members_handler(State(deps), Extension(AppState::anonymous())).await;
    assert!(matches!(result, Err(ApiError::Unauthenticated)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_members_route_rejects_regular_user(ctx: &TestHarness) {
    let deps = ctx.deps_with_gateway(MockIdentityGateway::new());

    let result = list_members_handler(State(deps), Extension(user_state())).await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_admin_lists_members_and_stats(ctx: &TestHarness) {
    for (uid, email) in [("uid1", "a@x.com"), ("uid2", "b@x.com")] {
        reconcile_sign_in(&test_profile(uid, email, ""), ctx.store.as_ref())
            .await
            .unwrap();
    }

    let deps = ctx.deps_with_gateway(MockIdentityGateway::new());
    let members = list_members_handler(State(deps.clone()), Extension(admin_state()))
        .await
        .unwrap();
    assert_eq!(members.0.len(), 2);

    let stats = member_stats_handler(State(deps), Extension(admin_state()))
        .await
        .unwrap();
    assert_eq!(stats.0.total, 2);
    assert_eq!(stats.0.checked_in, 0);
    assert_eq!(stats.0.check_in_rate, 0);
}

// ============================================================================
// Mutations
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_check_in_route_marks_member(ctx: &TestHarness) {
    reconcile_sign_in(&test_profile("uid2", "b@x.com", "Bob"), ctx.store.as_ref())
        .await
        .unwrap();

    let deps = ctx.deps_with_gateway(MockIdentityGateway::new());
    let member = check_in_handler(
        State(deps),
        Path("uid2".to_string()),
        Extension(admin_state()),
    )
    .await
    .unwrap();

    assert!(member.0.checked_in);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_check_in_route_unknown_member_maps_to_not_found(ctx: &TestHarness) {
    let deps = ctx.deps_with_gateway(MockIdentityGateway::new());

    let result = check_in_handler(
        State(deps),
        Path("ghost".to_string()),
        Extension(admin_state()),
    )
    .await;

    assert!(matches!(
        result,
        Err(ApiError::Store(StoreError::NotFound(_)))
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_pre_register_route_creates_email_keyed_record(ctx: &TestHarness) {
    let deps = ctx.deps_with_gateway(MockIdentityGateway::new());

    let (status, member) = pre_register_handler(
        State(deps),
        Extension(admin_state()),
        Json(PreRegisterRequest {
            email: "a@x.com".to_string(),
            name: "Ada".to_string(),
            role: Role::Admin,
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, axum::http::StatusCode::CREATED);
    assert_eq!(member.0.id, MemberKey::for_email("a@x.com").as_str());
    assert!(member.0.is_pre_registered);
    assert_eq!(member.0.role, Role::Admin);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_update_role_route(ctx: &TestHarness) {
    reconcile_sign_in(&test_profile("uid2", "b@x.com", "Bob"), ctx.store.as_ref())
        .await
        .unwrap();

    let deps = ctx.deps_with_gateway(MockIdentityGateway::new());
    let member = update_role_handler(
        State(deps),
        Path("uid2".to_string()),
        Extension(admin_state()),
        Json(UpdateRoleRequest { role: Role::Admin }),
    )
    .await
    .unwrap();

    assert_eq!(member.0.role, Role::Admin);
}
