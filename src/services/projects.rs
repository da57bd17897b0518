use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::UnitOfWork;
use crate::errors::{AppError, AppResult};
use crate::models::pagination::{PageRequest, Pagination};
use crate::models::project::{
    DbProjectListItem, Project, ProjectCreateRequest, ProjectListItem, ProjectPage, ProjectUpdateRequest,
    DEFAULT_EMOJI, PROJECT_COLUMNS,
};
use crate::models::workspace::TaskAnalytics;
use crate::services::workspaces::task_analytics;
use crate::utils::{normalize_text, utc_now, validate_name};

pub async fn create_project(
    pool: &SqlitePool,
    user_id: Uuid,
    workspace_id: Uuid,
    req: ProjectCreateRequest,
) -> AppResult<Project> {
    let now = utc_now();
    let project = Project {
        id: Uuid::new_v4(),
        workspace_id,
        name: validate_name("name", &req.name)?,
        emoji: normalize_text(req.emoji.as_deref())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EMOJI.to_string()),
        description: normalize_text(req.description.as_deref()).filter(|d| !d.is_empty()),
        created_by: user_id,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO projects (id, workspace_id, name, emoji, description, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(project.id)
    .bind(project.workspace_id)
    .bind(&project.name)
    .bind(&project.emoji)
    .bind(&project.description)
    .bind(project.created_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(project)
}

/// Newest first.
pub async fn list_projects(pool: &SqlitePool, workspace_id: Uuid, page: PageRequest) -> AppResult<ProjectPage> {
    let total_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE workspace_id = ?")
        .bind(workspace_id)
        .fetch_one(pool)
        .await?;

    let projects = sqlx::query_as::<_, DbProjectListItem>(
        "SELECT p.id, p.workspace_id, p.name, p.emoji, p.description, p.created_by, p.created_at, p.updated_at, \
           u.name AS creator_name, u.profile_picture AS creator_profile_picture \
         FROM projects p JOIN users u ON u.id = p.created_by \
         WHERE p.workspace_id = ? \
         ORDER BY p.created_at DESC, p.id \
         LIMIT ? OFFSET ?",
    )
    .bind(workspace_id)
    .bind(page.page_size)
    .bind(page.skip())
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(ProjectListItem::from)
    .collect();

    Ok(ProjectPage {
        projects,
        pagination: Pagination::new(page, total_count),
    })
}

/// Fetches a project only if it belongs to `workspace_id`.
pub async fn get_project(pool: &SqlitePool, workspace_id: Uuid, project_id: Uuid) -> AppResult<Project> {
    sqlx::query_as::<_, Project>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ? AND workspace_id = ?"
    ))
    .bind(project_id)
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Project not found or does not belong to the specified workspace"))
}

pub async fn update_project(
    pool: &SqlitePool,
    workspace_id: Uuid,
    project_id: Uuid,
    req: ProjectUpdateRequest,
) -> AppResult<Project> {
    let mut project = get_project(pool, workspace_id, project_id).await?;

    if let Some(name) = req.name.as_deref() {
        project.name = validate_name("name", name)?;
    }
    if let Some(emoji) = normalize_text(req.emoji.as_deref()).filter(|e| !e.is_empty()) {
        project.emoji = emoji;
    }
    if let Some(description) = normalize_text(req.description.as_deref()) {
        project.description = Some(description).filter(|d| !d.is_empty());
    }

    let now = utc_now();
    sqlx::query("UPDATE projects SET name = ?, emoji = ?, description = ?, updated_at = ? WHERE id = ? AND workspace_id = ?")
        .bind(&project.name)
        .bind(&project.emoji)
        .bind(&project.description)
        .bind(now)
        .bind(project.id)
        .bind(workspace_id)
        .execute(pool)
        .await?;

    project.updated_at = now;
    Ok(project)
}

/// Deletes a project and all of its tasks together.
pub async fn delete_project(pool: &SqlitePool, workspace_id: Uuid, project_id: Uuid) -> AppResult<()> {
    let mut uow = UnitOfWork::begin(pool, "delete_project").await?;

    let project_id: Uuid = sqlx::query_scalar("SELECT id FROM projects WHERE id = ? AND workspace_id = ?")
        .bind(project_id)
        .bind(workspace_id)
        .fetch_optional(uow.conn())
        .await?
        .ok_or_else(|| AppError::not_found("Project not found or does not belong to the specified workspace"))?;

    let tasks = sqlx::query("DELETE FROM tasks WHERE project_id = ? AND workspace_id = ?")
        .bind(project_id)
        .bind(workspace_id)
        .execute(uow.conn())
        .await?
        .rows_affected();

    sqlx::query("DELETE FROM projects WHERE id = ? AND workspace_id = ?")
        .bind(project_id)
        .bind(workspace_id)
        .execute(uow.conn())
        .await?;

    uow.commit().await?;

    tracing::info!(workspace_id = %workspace_id, project_id = %project_id, tasks, "project deleted");
    Ok(())
}

pub async fn project_analytics(pool: &SqlitePool, workspace_id: Uuid, project_id: Uuid) -> AppResult<TaskAnalytics> {
    let project = get_project(pool, workspace_id, project_id).await?;
    task_analytics(pool, workspace_id, Some(project.id)).await
}
