use axum::extract::{Path, State};
use axum::Json;

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::errors::AppResult;
use crate::models::membership::JoinWorkspaceResponse;
use crate::services::members;

#[utoipa::path(
    post,
    path = "/members/join/{invite_code}",
    tag = "Members",
    params(("invite_code" = String, Path, description = "Workspace invite code")),
    responses(
        (status = 200, description = "Joined as MEMBER", body = JoinWorkspaceResponse),
        (status = 400, description = "Already a member"),
        (status = 404, description = "Invalid invite code")
    ),
    security(("bearerAuth" = []))
)]
pub async fn join_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invite_code): Path<String>,
) -> AppResult<Json<JoinWorkspaceResponse>> {
    let joined = members::join_by_invite(&state.pool, auth.user_id, &invite_code).await?;
    Ok(Json(joined))
}
