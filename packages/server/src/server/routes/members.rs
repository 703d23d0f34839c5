//! Admin roster endpoints: list, statistics, check-in, pre-registration,
//! and role updates.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{require_admin, ApiError};
use crate::common::AppState;
use crate::domains::member::actions::{check_in, list_members, pre_register, update_role};
use crate::domains::member::models::{Member, Role};
use crate::domains::member::roster::{Roster, RosterStats};
use crate::kernel::ServerDeps;

/// Full roster. Admin only.
pub async fn list_members_handler(
    State(deps): State<ServerDeps>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Member>>, ApiError> {
    require_admin(&state)?;

    let members = list_members(deps.member_store.as_ref()).await?;
    Ok(Json(members))
}

/// The four summary counters. Admin only.
pub async fn member_stats_handler(
    State(deps): State<ServerDeps>,
    Extension(state): Extension<AppState>,
) -> Result<Json<RosterStats>, ApiError> {
    require_admin(&state)?;

    let members = list_members(deps.member_store.as_ref()).await?;
    Ok(Json(Roster::new(members).stats()))
}

/// Mark a member checked in. Admin only.
pub async fn check_in_handler(
    State(deps): State<ServerDeps>,
    Path(member_id): Path<String>,
    Extension(state): Extension<AppState>,
) -> Result<Json<Member>, ApiError> {
    require_admin(&state)?;

    let member = check_in(&member_id, deps.member_store.as_ref()).await?;
    Ok(Json(member))
}

#[derive(Debug, Deserialize)]
pub struct PreRegisterRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
}

/// Pre-register a member before their first sign-in. Admin only.
pub async fn pre_register_handler(
    State(deps): State<ServerDeps>,
    Extension(state): Extension<AppState>,
    Json(body): Json<PreRegisterRequest>,
) -> Result<(StatusCode, Json<Member>), ApiError> {
    require_admin(&state)?;

    let member = pre_register(
        &body.email,
        &body.name,
        body.role,
        deps.member_store.as_ref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

/// Change a member's role. Admin only.
pub async fn update_role_handler(
    State(deps): State<ServerDeps>,
    Path(member_id): Path<String>,
    Extension(state): Extension<AppState>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<Member>, ApiError> {
    require_admin(&state)?;

    let member = update_role(&member_id, body.role, deps.member_store.as_ref()).await?;
    Ok(Json(member))
}
