//! Workspace lifecycle: creation with owner bootstrap, partial updates,
//! cascading deletion, analytics and member role changes.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::authz::RoleName;
use crate::db::UnitOfWork;
use crate::errors::{AppError, AppResult};
use crate::models::membership::{DbMemberDetail, MemberDetail, Membership, MEMBERSHIP_COLUMNS, MEMBER_DETAIL_SELECT};
use crate::models::workspace::{
    TaskAnalytics, Workspace, WorkspaceCreateRequest, WorkspaceDetail, WorkspaceUpdateRequest, WORKSPACE_COLUMNS,
};
use crate::utils::{generate_invite_code, normalize_text, utc_now, validate_name};

const INVITE_CODE_ATTEMPTS: u32 = 5;

/// Workspace-scoped rows removed before the workspace itself, in this order.
const DELETE_CASCADE: [(&str, &str); 3] = [
    ("projects", "DELETE FROM projects WHERE workspace_id = ?"),
    ("tasks", "DELETE FROM tasks WHERE workspace_id = ?"),
    ("memberships", "DELETE FROM memberships WHERE workspace_id = ?"),
];

pub async fn create_workspace(pool: &SqlitePool, user_id: Uuid, req: WorkspaceCreateRequest) -> AppResult<Workspace> {
    let name = validate_name("name", &req.name)?;
    let description = normalize_text(req.description.as_deref()).filter(|d| !d.is_empty());

    let mut uow = UnitOfWork::begin(pool, "create_workspace").await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(user_id)
        .fetch_one(uow.conn())
        .await?;
    if !exists {
        return Err(AppError::not_found("User not found"));
    }

    let workspace = create_owned_workspace(uow.conn(), user_id, &name, description.as_deref(), utc_now()).await?;
    uow.commit().await?;

    tracing::info!(user_id = %user_id, workspace_id = %workspace.id, "workspace created");
    Ok(workspace)
}

/// Inserts a workspace, its owner's OWNER membership, and points the owner's
/// current workspace at it. Runs on the caller's connection so it joins the
/// caller's unit of work.
pub(crate) async fn create_owned_workspace(
    conn: &mut SqliteConnection,
    owner_id: Uuid,
    name: &str,
    description: Option<&str>,
    now: DateTime<Utc>,
) -> AppResult<Workspace> {
    let owner_role_id: Uuid = sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
        .bind(RoleName::Owner)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found("Owner role not found"))?;

    let mut workspace = Workspace {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: description.map(str::to_string),
        owner_id,
        invite_code: generate_invite_code(),
        created_at: now,
        updated_at: now,
    };

    let mut attempt = 1;
    loop {
        let inserted = sqlx::query(
            "INSERT INTO workspaces (id, name, description, owner_id, invite_code, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(workspace.id)
        .bind(&workspace.name)
        .bind(&workspace.description)
        .bind(workspace.owner_id)
        .bind(&workspace.invite_code)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await;

        match inserted {
            Ok(_) => break,
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() && attempt < INVITE_CODE_ATTEMPTS => {
                tracing::warn!(attempt, "invite code collision, drawing another");
                workspace.invite_code = generate_invite_code();
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    sqlx::query(
        "INSERT INTO memberships (id, user_id, workspace_id, role_id, joined_at, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(workspace.id)
    .bind(owner_role_id)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE users SET current_workspace_id = ?, updated_at = ? WHERE id = ?")
        .bind(workspace.id)
        .bind(now)
        .bind(owner_id)
        .execute(&mut *conn)
        .await?;

    Ok(workspace)
}

pub async fn get_workspace(pool: &SqlitePool, workspace_id: Uuid) -> AppResult<WorkspaceDetail> {
    let workspace = fetch_workspace(pool, workspace_id).await?;

    let members = sqlx::query_as::<_, DbMemberDetail>(&format!(
        "{MEMBER_DETAIL_SELECT} WHERE m.workspace_id = ? ORDER BY m.joined_at ASC"
    ))
    .bind(workspace_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(MemberDetail::from)
    .collect();

    Ok(WorkspaceDetail { workspace, members })
}

pub async fn update_workspace(
    pool: &SqlitePool,
    workspace_id: Uuid,
    req: WorkspaceUpdateRequest,
) -> AppResult<Workspace> {
    let mut workspace = fetch_workspace(pool, workspace_id).await?;

    if let Some(name) = req.name.as_deref() {
        workspace.name = validate_name("name", name)?;
    }
    if let Some(description) = normalize_text(req.description.as_deref()) {
        workspace.description = Some(description).filter(|d| !d.is_empty());
    }

    let now = utc_now();
    sqlx::query("UPDATE workspaces SET name = ?, description = ?, updated_at = ? WHERE id = ?")
        .bind(&workspace.name)
        .bind(&workspace.description)
        .bind(now)
        .bind(workspace_id)
        .execute(pool)
        .await?;

    workspace.updated_at = now;
    Ok(workspace)
}

/// Deletes a workspace and everything scoped to it. Only the owner may do
/// this. Returns the acting user's current workspace afterwards.
///
/// Users whose current workspace was the deleted one are moved to another
/// workspace they still belong to, or to none.
pub async fn delete_workspace(pool: &SqlitePool, workspace_id: Uuid, acting_user_id: Uuid) -> AppResult<Option<Uuid>> {
    let mut uow = UnitOfWork::begin(pool, "delete_workspace").await?;

    let owner_id: Uuid = sqlx::query_scalar("SELECT owner_id FROM workspaces WHERE id = ?")
        .bind(workspace_id)
        .fetch_optional(uow.conn())
        .await?
        .ok_or_else(|| AppError::not_found("Workspace does not exist"))?;

    if owner_id != acting_user_id {
        return Err(AppError::bad_request("You are not the owner of this workspace"));
    }

    for (scope, statement) in DELETE_CASCADE {
        let removed = sqlx::query(statement)
            .bind(workspace_id)
            .execute(uow.conn())
            .await?
            .rows_affected();
        tracing::debug!(workspace_id = %workspace_id, scope, removed, "cascade step");
    }

    sqlx::query(
        "UPDATE users SET current_workspace_id = \
           (SELECT m.workspace_id FROM memberships m WHERE m.user_id = users.id ORDER BY m.joined_at ASC LIMIT 1), \
         updated_at = ? \
         WHERE current_workspace_id = ?",
    )
    .bind(utc_now())
    .bind(workspace_id)
    .execute(uow.conn())
    .await?;

    sqlx::query("DELETE FROM workspaces WHERE id = ?")
        .bind(workspace_id)
        .execute(uow.conn())
        .await?;

    let current_workspace_id: Option<Uuid> =
        sqlx::query_scalar("SELECT current_workspace_id FROM users WHERE id = ?")
            .bind(acting_user_id)
            .fetch_optional(uow.conn())
            .await?
            .ok_or_else(|| AppError::not_found("User does not exist"))?;

    uow.commit().await?;

    tracing::info!(user_id = %acting_user_id, workspace_id = %workspace_id, "workspace deleted");
    Ok(current_workspace_id)
}

pub async fn workspace_analytics(pool: &SqlitePool, workspace_id: Uuid) -> AppResult<TaskAnalytics> {
    task_analytics(pool, workspace_id, None).await
}

/// Total, overdue (due in the past and not done) and completed task counts,
/// optionally narrowed to one project.
pub(crate) async fn task_analytics(
    pool: &SqlitePool,
    workspace_id: Uuid,
    project_id: Option<Uuid>,
) -> AppResult<TaskAnalytics> {
    let analytics = sqlx::query_as::<_, TaskAnalytics>(
        "SELECT COUNT(*) AS total_tasks, \
           COALESCE(SUM(CASE WHEN due_date IS NOT NULL AND due_date < ? AND status != 'DONE' THEN 1 ELSE 0 END), 0) AS overdue_tasks, \
           COALESCE(SUM(CASE WHEN status = 'DONE' THEN 1 ELSE 0 END), 0) AS completed_tasks \
         FROM tasks WHERE workspace_id = ? AND (? IS NULL OR project_id = ?)",
    )
    .bind(utc_now())
    .bind(workspace_id)
    .bind(project_id)
    .bind(project_id)
    .fetch_one(pool)
    .await?;

    Ok(analytics)
}

/// Points a membership at another role.
///
/// The membership is looked up by its own id. An id that resolves to nothing
/// is a dangling reference and surfaces as an internal error.
pub async fn change_member_role(
    pool: &SqlitePool,
    workspace_id: Uuid,
    member_id: Uuid,
    role_id: Uuid,
) -> AppResult<Membership> {
    let workspace = fetch_workspace(pool, workspace_id).await?;

    let role_name: RoleName = sqlx::query_scalar("SELECT name FROM roles WHERE id = ?")
        .bind(role_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Role does not exist"))?;

    let mut member = sqlx::query_as::<_, Membership>(&format!(
        "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE id = ?"
    ))
    .bind(member_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::internal(format!("member {member_id} does not exist")))?;

    if member.workspace_id != workspace_id {
        return Err(AppError::not_found("Member does not belong to this workspace"));
    }
    if member.user_id == workspace.owner_id && role_name != RoleName::Owner {
        return Err(AppError::bad_request("The workspace owner's role cannot be changed"));
    }

    let now = utc_now();
    sqlx::query("UPDATE memberships SET role_id = ?, updated_at = ? WHERE id = ?")
        .bind(role_id)
        .bind(now)
        .bind(member_id)
        .execute(pool)
        .await?;

    member.role_id = role_id;
    member.updated_at = now;

    tracing::info!(workspace_id = %workspace_id, member_id = %member_id, role = %role_name, "member role changed");
    Ok(member)
}

pub(crate) async fn fetch_workspace(pool: &SqlitePool, workspace_id: Uuid) -> AppResult<Workspace> {
    sqlx::query_as::<_, Workspace>(&format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = ?"))
        .bind(workspace_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Workspace does not exist"))
}
