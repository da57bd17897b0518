use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::pagination::{PageRequest, Pagination};
use crate::models::task::{
    DbTaskListItem, Task, TaskCreateRequest, TaskFilter, TaskListItem, TaskPage, TaskPriority, TaskStatus,
    TaskUpdateRequest, TASK_COLUMNS,
};
use crate::services::projects::get_project;
use crate::utils::{normalize_text, utc_now, validate_name};

const TASK_LIST_SELECT: &str = "SELECT t.id, t.project_id, t.workspace_id, t.title, t.description, t.priority, t.status, \
       t.assigned_to, t.created_by, t.due_date, t.created_at, t.updated_at, \
       p.name AS project_name, p.emoji AS project_emoji, \
       u.name AS assignee_name, u.profile_picture AS assignee_profile_picture \
     FROM tasks t \
     JOIN projects p ON p.id = t.project_id \
     LEFT JOIN users u ON u.id = t.assigned_to";

/// Creates a task under a project of the workspace. An assignee, when given,
/// must already be a member of the workspace.
pub async fn create_task(
    pool: &SqlitePool,
    user_id: Uuid,
    workspace_id: Uuid,
    project_id: Uuid,
    req: TaskCreateRequest,
) -> AppResult<Task> {
    let title = validate_name("title", &req.title)?;
    let project = get_project(pool, workspace_id, project_id).await?;

    if let Some(assignee) = req.assigned_to {
        ensure_workspace_member(pool, workspace_id, assignee).await?;
    }

    let now = utc_now();
    let task = Task {
        id: Uuid::new_v4(),
        project_id: project.id,
        workspace_id,
        title,
        description: normalize_text(req.description.as_deref()).filter(|d| !d.is_empty()),
        priority: req.priority.unwrap_or(TaskPriority::Medium),
        status: req.status.unwrap_or(TaskStatus::Todo),
        assigned_to: req.assigned_to,
        created_by: user_id,
        due_date: req.due_date,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(&format!(
        "INSERT INTO tasks ({TASK_COLUMNS}, title_folded) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(task.id)
    .bind(task.project_id)
    .bind(task.workspace_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.priority)
    .bind(task.status)
    .bind(task.assigned_to)
    .bind(task.created_by)
    .bind(task.due_date)
    .bind(now)
    .bind(now)
    .bind(task.title.to_lowercase())
    .execute(pool)
    .await?;

    Ok(task)
}

/// Partial update. The assignee is taken as given and not re-checked against
/// the workspace membership. An absent assignee or due date keeps the stored
/// value, so neither can be cleared here.
pub async fn update_task(
    pool: &SqlitePool,
    workspace_id: Uuid,
    project_id: Uuid,
    task_id: Uuid,
    req: TaskUpdateRequest,
) -> AppResult<Task> {
    get_project(pool, workspace_id, project_id).await?;
    let mut task = fetch_task(pool, workspace_id, project_id, task_id).await?;

    if let Some(title) = req.title.as_deref() {
        task.title = validate_name("title", title)?;
    }
    if let Some(description) = normalize_text(req.description.as_deref()) {
        task.description = Some(description).filter(|d| !d.is_empty());
    }
    if let Some(priority) = req.priority {
        task.priority = priority;
    }
    if let Some(status) = req.status {
        task.status = status;
    }
    if req.assigned_to.is_some() {
        task.assigned_to = req.assigned_to;
    }
    if req.due_date.is_some() {
        task.due_date = req.due_date;
    }

    let now = utc_now();
    sqlx::query(
        "UPDATE tasks SET title = ?, title_folded = ?, description = ?, priority = ?, status = ?, assigned_to = ?, due_date = ?, updated_at = ? \
         WHERE id = ? AND project_id = ? AND workspace_id = ?",
    )
    .bind(&task.title)
    .bind(task.title.to_lowercase())
    .bind(&task.description)
    .bind(task.priority)
    .bind(task.status)
    .bind(task.assigned_to)
    .bind(task.due_date)
    .bind(now)
    .bind(task.id)
    .bind(project_id)
    .bind(workspace_id)
    .execute(pool)
    .await?;

    task.updated_at = now;
    Ok(task)
}

pub async fn get_task(pool: &SqlitePool, workspace_id: Uuid, project_id: Uuid, task_id: Uuid) -> AppResult<TaskListItem> {
    get_project(pool, workspace_id, project_id).await?;

    sqlx::query_as::<_, DbTaskListItem>(&format!(
        "{TASK_LIST_SELECT} WHERE t.id = ? AND t.project_id = ? AND t.workspace_id = ?"
    ))
    .bind(task_id)
    .bind(project_id)
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?
    .map(TaskListItem::from)
    .ok_or_else(|| AppError::not_found("Task not found or does not belong to this project"))
}

/// Filtered, paginated listing of a workspace's tasks, newest first.
pub async fn list_tasks(
    pool: &SqlitePool,
    workspace_id: Uuid,
    filter: &TaskFilter,
    page: PageRequest,
) -> AppResult<TaskPage> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tasks t");
    push_task_filters(&mut count, workspace_id, filter);
    let total_count = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Sqlite>::new(TASK_LIST_SELECT);
    push_task_filters(&mut select, workspace_id, filter);
    select
        .push(" ORDER BY t.created_at DESC, t.id LIMIT ")
        .push_bind(page.page_size)
        .push(" OFFSET ")
        .push_bind(page.skip());

    let tasks = select
        .build_query_as::<DbTaskListItem>()
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(TaskListItem::from)
        .collect();

    Ok(TaskPage {
        tasks,
        pagination: Pagination::new(page, total_count),
    })
}

pub async fn delete_task(pool: &SqlitePool, workspace_id: Uuid, task_id: Uuid) -> AppResult<()> {
    let deleted = sqlx::query("DELETE FROM tasks WHERE id = ? AND workspace_id = ?")
        .bind(task_id)
        .bind(workspace_id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::not_found("Task not found or does not belong to this workspace"));
    }

    Ok(())
}

async fn fetch_task(pool: &SqlitePool, workspace_id: Uuid, project_id: Uuid, task_id: Uuid) -> AppResult<Task> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND project_id = ? AND workspace_id = ?"
    ))
    .bind(task_id)
    .bind(project_id)
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Task not found or does not belong to this project"))
}

async fn ensure_workspace_member(pool: &SqlitePool, workspace_id: Uuid, user_id: Uuid) -> AppResult<()> {
    let is_member: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM memberships WHERE user_id = ? AND workspace_id = ?)")
            .bind(user_id)
            .bind(workspace_id)
            .fetch_one(pool)
            .await?;

    if !is_member {
        return Err(AppError::bad_request("This user is not a member of the workspace"));
    }
    Ok(())
}

fn push_task_filters(qb: &mut QueryBuilder<'_, Sqlite>, workspace_id: Uuid, filter: &TaskFilter) {
    qb.push(" WHERE t.workspace_id = ").push_bind(workspace_id);

    if let Some(project_id) = filter.project_id {
        qb.push(" AND t.project_id = ").push_bind(project_id);
    }
    if !filter.status.is_empty() {
        qb.push(" AND t.status IN (");
        let mut values = qb.separated(", ");
        for status in &filter.status {
            values.push_bind(*status);
        }
        values.push_unseparated(")");
    }
    if !filter.priority.is_empty() {
        qb.push(" AND t.priority IN (");
        let mut values = qb.separated(", ");
        for priority in &filter.priority {
            values.push_bind(*priority);
        }
        values.push_unseparated(")");
    }
    if !filter.assigned_to.is_empty() {
        qb.push(" AND t.assigned_to IN (");
        let mut values = qb.separated(", ");
        for assignee in &filter.assigned_to {
            values.push_bind(*assignee);
        }
        values.push_unseparated(")");
    }
    if let Some(keyword) = filter.keyword.as_deref() {
        qb.push(" AND instr(t.title_folded, ")
            .push_bind(keyword.to_lowercase())
            .push(") > 0");
    }
    if let Some(due_date) = filter.due_date {
        qb.push(" AND t.due_date = ").push_bind(due_date);
    }
}
