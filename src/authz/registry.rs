use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::UnitOfWork;
use crate::errors::{AppError, AppResult};
use crate::models::role::{DbRole, Role};
use crate::utils::utc_now;

/// Workspace roles. Closed set; a new role is a new variant plus a row in
/// [`permissions_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Owner,
    Admin,
    Member,
}

impl RoleName {
    pub const ALL: [RoleName; 3] = [RoleName::Owner, RoleName::Admin, RoleName::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Owner => "OWNER",
            RoleName::Admin => "ADMIN",
            RoleName::Member => "MEMBER",
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleName::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AppError::configuration(format!("unknown role: {s}")))
    }
}

/// Atomic capabilities checked by the guard. No permission implies another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    CreateWorkspace,
    DeleteWorkspace,
    EditWorkspace,
    ManageWorkspaceSettings,
    AddMember,
    ChangeMemberRole,
    RemoveMember,
    CreateProject,
    EditProject,
    DeleteProject,
    CreateTask,
    EditTask,
    DeleteTask,
    ViewOnly,
}

impl Permission {
    pub const ALL: [Permission; 14] = [
        Permission::CreateWorkspace,
        Permission::DeleteWorkspace,
        Permission::EditWorkspace,
        Permission::ManageWorkspaceSettings,
        Permission::AddMember,
        Permission::ChangeMemberRole,
        Permission::RemoveMember,
        Permission::CreateProject,
        Permission::EditProject,
        Permission::DeleteProject,
        Permission::CreateTask,
        Permission::EditTask,
        Permission::DeleteTask,
        Permission::ViewOnly,
    ];
}

const OWNER_PERMISSIONS: &[Permission] = &Permission::ALL;

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::AddMember,
    Permission::CreateProject,
    Permission::EditProject,
    Permission::DeleteProject,
    Permission::CreateTask,
    Permission::EditTask,
    Permission::DeleteTask,
    Permission::ManageWorkspaceSettings,
    Permission::ViewOnly,
];

const MEMBER_PERMISSIONS: &[Permission] = &[
    Permission::ViewOnly,
    Permission::CreateTask,
    Permission::EditTask,
];

/// The static grant table.
pub fn permissions_for(role: RoleName) -> &'static [Permission] {
    match role {
        RoleName::Owner => OWNER_PERMISSIONS,
        RoleName::Admin => ADMIN_PERMISSIONS,
        RoleName::Member => MEMBER_PERMISSIONS,
    }
}

pub fn permission_set(role: RoleName) -> HashSet<Permission> {
    permissions_for(role).iter().copied().collect()
}

/// Brings the stored role rows in line with the grant table.
///
/// Missing roles are inserted, existing ones get their permission list
/// overwritten. Ids of existing rows are kept so memberships stay valid.
/// Runs as one unit of work: either every role reflects the table or none
/// was touched.
pub async fn seed_roles(pool: &SqlitePool) -> AppResult<Vec<Role>> {
    let mut uow = UnitOfWork::begin(pool, "seed_roles").await?;
    let now = utc_now();

    for role in RoleName::ALL {
        let permissions = serde_json::to_string(permissions_for(role))
            .map_err(|err| AppError::internal(format!("failed to encode permissions: {err}")))?;

        sqlx::query(
            "INSERT INTO roles (id, name, permissions, created_at, updated_at) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(name) DO UPDATE SET permissions = excluded.permissions, updated_at = excluded.updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(role)
        .bind(permissions)
        .bind(now)
        .bind(now)
        .execute(uow.conn())
        .await?;
    }

    let rows = sqlx::query_as::<_, DbRole>(
        "SELECT id, name, permissions, created_at, updated_at FROM roles ORDER BY name",
    )
    .fetch_all(uow.conn())
    .await?;

    uow.commit().await?;

    let roles = rows
        .into_iter()
        .map(Role::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(count = roles.len(), "roles seeded");
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_holds_every_permission() {
        let owner = permission_set(RoleName::Owner);
        for permission in Permission::ALL {
            assert!(owner.contains(&permission), "owner lacks {permission:?}");
        }
    }

    #[test]
    fn member_is_limited_to_tasks_and_viewing() {
        assert_eq!(
            permission_set(RoleName::Member),
            HashSet::from([Permission::ViewOnly, Permission::CreateTask, Permission::EditTask])
        );
    }

    #[test]
    fn admin_cannot_touch_workspace_lifecycle_or_roles() {
        let admin = permission_set(RoleName::Admin);
        assert!(!admin.contains(&Permission::DeleteWorkspace));
        assert!(!admin.contains(&Permission::EditWorkspace));
        assert!(!admin.contains(&Permission::ChangeMemberRole));
        assert!(admin.contains(&Permission::DeleteProject));
    }

    #[test]
    fn role_names_parse_and_reject_unknowns() {
        for role in RoleName::ALL {
            assert_eq!(role.as_str().parse::<RoleName>().unwrap(), role);
        }
        assert!(matches!("GUEST".parse::<RoleName>(), Err(AppError::Configuration(_))));
    }

    #[test]
    fn permissions_serialize_as_screaming_snake_case() {
        let json = serde_json::to_string(&[Permission::ManageWorkspaceSettings, Permission::ViewOnly]).unwrap();
        assert_eq!(json, r#"["MANAGE_WORKSPACE_SETTINGS","VIEW_ONLY"]"#);
    }
}
