use sqlx::SqlitePool;
use uuid::Uuid;

use super::guard::authorize;
use super::registry::{Permission, RoleName};
use crate::errors::{AppError, AppResult};

/// Looks up the caller's role in a workspace. Read-only.
///
/// A missing workspace is `NotFound`; an existing workspace without a
/// membership for `user_id` is `Unauthorized`.
pub async fn resolve_role(pool: &SqlitePool, user_id: Uuid, workspace_id: Uuid) -> AppResult<RoleName> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM workspaces WHERE id = ?)")
        .bind(workspace_id)
        .fetch_one(pool)
        .await?;

    if !exists {
        return Err(AppError::not_found("Workspace does not exist"));
    }

    let role: Option<RoleName> = sqlx::query_scalar(
        "SELECT r.name FROM memberships m JOIN roles r ON r.id = m.role_id WHERE m.user_id = ? AND m.workspace_id = ?",
    )
    .bind(user_id)
    .bind(workspace_id)
    .fetch_optional(pool)
    .await?;

    role.ok_or_else(|| AppError::unauthorized("You're not a member of this workspace"))
}

/// A caller whose membership in a workspace has been confirmed.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceAccess {
    pub user_id: Uuid,
    pub workspace_id: Uuid,
    pub role: RoleName,
}

impl WorkspaceAccess {
    pub async fn resolve(pool: &SqlitePool, user_id: Uuid, workspace_id: Uuid) -> AppResult<Self> {
        let role = resolve_role(pool, user_id, workspace_id).await?;
        Ok(Self {
            user_id,
            workspace_id,
            role,
        })
    }

    pub fn require(&self, required: &[Permission]) -> AppResult<()> {
        authorize(self.role, required).inspect_err(|_| {
            tracing::info!(
                user_id = %self.user_id,
                workspace_id = %self.workspace_id,
                role = %self.role,
                "workspace action denied"
            );
        })
    }
}
