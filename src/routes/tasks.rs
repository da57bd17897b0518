use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::authz::{Permission, WorkspaceAccess};
use crate::errors::AppResult;
use crate::models::task::{Task, TaskCreateRequest, TaskListItem, TaskListQuery, TaskPage, TaskUpdateRequest};
use crate::services::tasks;

#[utoipa::path(
    post,
    path = "/workspaces/{workspace_id}/projects/{project_id}/tasks",
    tag = "Tasks",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace id"),
        ("project_id" = Uuid, Path, description = "Project id")
    ),
    request_body = TaskCreateRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Assignee is not a member of the workspace")
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TaskCreateRequest>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::CreateTask])?;

    let task = tasks::create_task(&state.pool, auth.user_id, workspace_id, project_id, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/tasks",
    tag = "Tasks",
    params(("workspace_id" = Uuid, Path, description = "Workspace id"), TaskListQuery),
    responses((status = 200, description = "Filtered page of tasks, newest first", body = TaskPage)),
    security(("bearerAuth" = []))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workspace_id): Path<Uuid>,
    Query(query): Query<TaskListQuery>,
) -> AppResult<Json<TaskPage>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::ViewOnly])?;

    let (filter, page) = query.into_parts()?;
    let tasks = tasks::list_tasks(&state.pool, workspace_id, &filter, page).await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    get,
    path = "/workspaces/{workspace_id}/projects/{project_id}/tasks/{task_id}",
    tag = "Tasks",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace id"),
        ("project_id" = Uuid, Path, description = "Project id"),
        ("task_id" = Uuid, Path, description = "Task id")
    ),
    responses(
        (status = 200, description = "Task with project and assignee", body = TaskListItem),
        (status = 404, description = "Task not in this project")
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id, id)): Path<(Uuid, Uuid, Uuid)>,
) -> AppResult<Json<TaskListItem>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::ViewOnly])?;

    let task = tasks::get_task(&state.pool, workspace_id, project_id, id).await?;
    Ok(Json(task))
}

#[utoipa::path(
    put,
    path = "/workspaces/{workspace_id}/projects/{project_id}/tasks/{task_id}",
    tag = "Tasks",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace id"),
        ("project_id" = Uuid, Path, description = "Project id"),
        ("task_id" = Uuid, Path, description = "Task id")
    ),
    request_body = TaskUpdateRequest,
    responses((status = 200, description = "Task updated", body = Task)),
    security(("bearerAuth" = []))
)]
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, project_id, id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<TaskUpdateRequest>,
) -> AppResult<Json<Task>> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::EditTask])?;

    let task = tasks::update_task(&state.pool, workspace_id, project_id, id, payload).await?;
    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/workspaces/{workspace_id}/tasks/{task_id}",
    tag = "Tasks",
    params(
        ("workspace_id" = Uuid, Path, description = "Workspace id"),
        ("task_id" = Uuid, Path, description = "Task id")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not in this workspace")
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((workspace_id, id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    let access = WorkspaceAccess::resolve(&state.pool, auth.user_id, workspace_id).await?;
    access.require(&[Permission::DeleteTask])?;

    tasks::delete_task(&state.pool, workspace_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
