use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::authz::{Permission, WorkspaceAccess};
use crate::errors::AppResult;
use crate::models::pagination::PageQuery;
use crate::models::project::{Project, ProjectCreateRequest, ProjectPage, ProjectUpdateRequest};
use crate::models::workspace::TaskAnalytics;
use crate::services::projects;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectDeleted {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/workspaces/{workspace_id}/projects",
    tag = "Projects",
    params(("workspace_id" = Uuid, Path, description = "Workspace id")),
    request_body = ProjectCreateRequest,
    responses((status = 201, description = "Project created", body = Project)),
    security(("bearerAuth" = []))
)]
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Json(payload): Json<ProjectCreateRequest>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::CreateProject])?;

    let project = projects::create_project(&state.pool, auth.user_id, workspace_id, payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/projects",
    tag = "Projects",
    params(("workspace_id" = Uuid, Path, description = "Workspace id"), PageQuery),
    responses((status = 200, description = "Page of projects, newest first", body = ProjectPage)),
    security(("bearerAuth" = []))
)]
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ProjectPage>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::ViewOnly])?;

    let page = projects::list_projects(&state.pool, workspace_id, query.into()).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/projects/{project_id}",
    tag = "Projects",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace id"),
        ("project_id" = Uuid, Path, description = "Project id")
    ),
    responses(
        (status = 200, description = "Project detail", body = Project),
        (status = 404, description = "Project not in this workspace")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Project>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::ViewOnly])?;

    let project = projects::get_project(&state.pool, workspace_id, id).await?;
    Ok(Json(project))
}

#[utoipa::path(
    put,
    path = "/workspaces/{workspace_id}/projects/{project_id}",
    tag = "Projects",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace id"),
        ("project_id" = Uuid, Path, description = "Project id")
    ),
    request_body = ProjectUpdateRequest,
    responses((status = 200, description = "Project updated", body = Project)),
    security(("bearerAuth" = []))
)]
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ProjectUpdateRequest>,
) -> AppResult<Json<Project>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::EditProject])?;

    let project = projects::update_project(&state.pool, workspace_id, id, payload).await?;
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/workspaces/{workspace_id}/projects/{project_id}",
    tag = "Projects",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace id"),
        ("project_id" = Uuid, Path, description = "Project id")
    ),
    responses((status = 200, description = "Project and its tasks deleted", body = ProjectDeleted)),
    security(("bearerAuth" = []))
)]
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ProjectDeleted>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::DeleteProject])?;

    projects::delete_project(&state.pool, workspace_id, id).await?;
    Ok(Json(ProjectDeleted {
        message: "Project deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/projects/{project_id}/analytics",
    tag = "Projects",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace id"),
        ("project_id" = Uuid, Path, description = "Project id")
    ),
    responses((status = 200, description = "Task counts for the project", body = TaskAnalytics)),
    security(("bearerAuth" = []))
)]
pub async fn project_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<TaskAnalytics>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::ViewOnly])?;

    let analytics = projects::project_analytics(&state.pool, workspace_id, id).await?;
    Ok(Json(analytics))
}
