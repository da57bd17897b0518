use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::RoleName;
use crate::errors::{AppError, AppResult};
use crate::models::membership::{DbMemberDetail, JoinWorkspaceResponse, MemberDetail, MEMBER_DETAIL_SELECT};
use crate::models::role::{DbRole, Role};
use crate::models::workspace::{Workspace, WorkspaceMembers};
use crate::utils::utc_now;

/// Adds the user to the workspace behind `invite_code` as a MEMBER.
pub async fn join_by_invite(pool: &SqlitePool, user_id: Uuid, invite_code: &str) -> AppResult<JoinWorkspaceResponse> {
    let workspace_id: Uuid = sqlx::query_scalar("SELECT id FROM workspaces WHERE invite_code = ?")
        .bind(invite_code.trim())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Invalid invite code or workspace does not exist"))?;

    let already_member: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM memberships WHERE user_id = ? AND workspace_id = ?)")
            .bind(user_id)
            .bind(workspace_id)
            .fetch_one(pool)
            .await?;
    if already_member {
        return Err(AppError::bad_request("You are already a member of this workspace"));
    }

    let role_id: Uuid = sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
        .bind(RoleName::Member)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Role does not exist"))?;

    let now = utc_now();
    let inserted = sqlx::query(
        "INSERT INTO memberships (id, user_id, workspace_id, role_id, joined_at, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(workspace_id)
    .bind(role_id)
    .bind(now)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await;

    match inserted {
        Ok(_) => {}
        // A concurrent join won the race past the existence check above.
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            return Err(AppError::bad_request("You are already a member of this workspace"));
        }
        Err(err) => return Err(err.into()),
    }

    tracing::info!(user_id = %user_id, workspace_id = %workspace_id, "member joined by invite");
    Ok(JoinWorkspaceResponse {
        workspace_id,
        role: RoleName::Member,
    })
}

/// Every workspace the user holds a membership in.
pub async fn list_user_workspaces(pool: &SqlitePool, user_id: Uuid) -> AppResult<Vec<Workspace>> {
    let workspaces = sqlx::query_as::<_, Workspace>(
        "SELECT w.id, w.name, w.description, w.owner_id, w.invite_code, w.created_at, w.updated_at \
         FROM memberships m JOIN workspaces w ON w.id = m.workspace_id \
         WHERE m.user_id = ? ORDER BY m.joined_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(workspaces)
}

/// Members of a workspace plus the role catalog, for role pickers.
pub async fn list_workspace_members(pool: &SqlitePool, workspace_id: Uuid) -> AppResult<WorkspaceMembers> {
    let members = sqlx::query_as::<_, DbMemberDetail>(&format!(
        "{MEMBER_DETAIL_SELECT} WHERE m.workspace_id = ? ORDER BY m.joined_at ASC"
    ))
    .bind(workspace_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(MemberDetail::from)
    .collect();

    let roles = list_roles(pool).await?;

    Ok(WorkspaceMembers { members, roles })
}

pub async fn list_roles(pool: &SqlitePool) -> AppResult<Vec<Role>> {
    sqlx::query_as::<_, DbRole>("SELECT id, name, permissions, created_at, updated_at FROM roles ORDER BY name")
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Role::try_from)
        .collect()
}
