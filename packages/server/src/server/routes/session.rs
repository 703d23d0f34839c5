//! Sign-in and sign-out endpoints.

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ApiError;
use crate::common::AppState;
use crate::domains::auth::complete_sign_in;
use crate::domains::member::models::Member;
use crate::kernel::ServerDeps;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    /// Credential issued by the identity provider (ID token).
    pub credential: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub member: Member,
}

/// Verify a provider credential, reconcile the member record, and issue
/// a session token. The role in the token comes from the stored record,
/// never from the provider.
pub async fn sign_in_handler(
    State(deps): State<ServerDeps>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError> {
    let profile = deps.identity.sign_in(&body.credential).await?;
    let user = complete_sign_in(&profile, deps.member_store.as_ref()).await?;

    let token = deps
        .jwt_service
        .create_token(&user.member.id, user.member.email.clone(), user.role)
        .map_err(ApiError::Internal)?;

    info!(subject = %user.member.id, "issued session token");
    Ok(Json(SignInResponse {
        token,
        member: user.member,
    }))
}

/// End the provider session. The client discards its token; the
/// short-lived session JWT is not tracked server-side.
pub async fn sign_out_handler(
    State(deps): State<ServerDeps>,
    Extension(state): Extension<AppState>,
) -> Result<StatusCode, ApiError> {
    if !state.is_authenticated() {
        return Err(ApiError::Unauthenticated);
    }

    deps.identity.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}
