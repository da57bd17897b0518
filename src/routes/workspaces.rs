use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::authz::{Permission, WorkspaceAccess};
use crate::errors::AppResult;
use crate::models::membership::Membership;
use crate::models::workspace::{
    ChangeRoleRequest, TaskAnalytics, Workspace, WorkspaceCreateRequest, WorkspaceDeleted, WorkspaceDetail,
    WorkspaceMembers, WorkspaceUpdateRequest,
};
use crate::services::{members, workspaces};

#[utoipa::path(
    post,
    path = "/workspaces",
    tag = "Workspaces",
    request_body = WorkspaceCreateRequest,
    responses(
        (status = 201, description = "Workspace created, caller is its owner", body = Workspace),
        (status = 400, description = "Invalid name")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<WorkspaceCreateRequest>,
) -> AppResult<(StatusCode, Json<Workspace>)> {
    let workspace = workspaces::create_workspace(&state.pool, auth.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

#[utoipa::path(
    get,
    path = "/workspaces",
    tag = "Workspaces",
    responses((status = 200, description = "Workspaces the caller belongs to", body = [Workspace])),
    security(("bearerAuth" = []))
)]
pub async fn list_workspaces(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Workspace>>> {
    let workspaces = members::list_user_workspaces(&state.pool, auth.user_id).await?;
    Ok(Json(workspaces))
}

#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}",
    tag = "Workspaces",
    params(("workspace_id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Workspace with its members", body = WorkspaceDetail),
        (status = 401, description = "Not a member"),
        (status = 404, description = "Workspace does not exist")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkspaceDetail>> {
    WorkspaceAccess::resolve(&state.pool, auth.user_id, id).await?;

    let detail = workspaces::get_workspace(&state.pool, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/workspaces/{workspace_id}",
    tag = "Workspaces",
    params(("workspace_id" = Uuid, Path, description = "Workspace id")),
    request_body = WorkspaceUpdateRequest,
    responses((status = 200, description = "Workspace updated", body = Workspace)),
    security(("bearerAuth" = []))
)]
pub async fn update_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<WorkspaceUpdateRequest>,
) -> AppResult<Json<Workspace>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, id).await?;
    access.require(&[Permission::EditWorkspace])?;

    let workspace = workspaces::update_workspace(&state.pool, id, payload).await?;
    Ok(Json(workspace))
}

#[utoipa::path(
    delete,
    path = "/workspaces/{workspace_id}",
    tag = "Workspaces",
    params(("workspace_id" = Uuid, Path, description = "Workspace id")),
    responses(
        (status = 200, description = "Workspace and everything in it deleted", body = WorkspaceDeleted),
        (status = 400, description = "Caller is not the owner"),
        (status = 401, description = "Missing DELETE_WORKSPACE")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_workspace(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkspaceDeleted>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, id).await?;
    access.require(&[Permission::DeleteWorkspace])?;

    let current_workspace_id = workspaces::delete_workspace(&state.pool, id, auth.user_id).await?;
    Ok(Json(WorkspaceDeleted { current_workspace_id }))
}

#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/members",
    tag = "Workspaces",
    params(("workspace_id" = Uuid, Path, description = "Workspace id")),
    responses((status = 200, description = "Members and the role catalog", body = WorkspaceMembers)),
    security(("bearerAuth" = []))
)]
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WorkspaceMembers>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, id).await?;
    access.require(&[Permission::ViewOnly])?;

    let members = members::list_workspace_members(&state.pool, id).await?;
    Ok(Json(members))
}

#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/analytics",
    tag = "Workspaces",
    params(("workspace_id" = Uuid, Path, description = "Workspace id")),
    responses((status = 200, description = "Task counts", body = TaskAnalytics)),
    security(("bearerAuth" = []))
)]
pub async fn workspace_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TaskAnalytics>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, id).await?;
    access.require(&[Permission::ViewOnly])?;

    let analytics = workspaces::workspace_analytics(&state.pool, id).await?;
    Ok(Json(analytics))
}

#[utoipa::path(
    put,
    path = "/workspaces/{workspace_id}/members/role",
    tag = "Workspaces",
    params(("workspace_id" = Uuid, Path, description = "Workspace id")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Membership now points at the new role", body = Membership),
        (status = 404, description = "Workspace, role or member not found")
    ),
    security(("bearerAuth" = []))
)]
pub async fn change_member_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeRoleRequest>,
) -> AppResult<Json<Membership>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, id).await?;
    access.require(&[Permission::ChangeMemberRole])?;

    let member = workspaces::change_member_role(&state.pool, id, payload.member_id, payload.role_id).await?;
    Ok(Json(member))
}
