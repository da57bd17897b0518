mod common;

use anyhow::Result;
use uuid::Uuid;

use teamsync::authz::{permissions_for, resolve_role, seed_roles, Permission, RoleName, WorkspaceAccess};
use teamsync::errors::AppError;
use teamsync::models::workspace::WorkspaceCreateRequest;
use teamsync::services::{members, workspaces};

async fn team_workspace(pool: &sqlx::SqlitePool, owner_id: Uuid) -> Result<teamsync::models::workspace::Workspace> {
    Ok(workspaces::create_workspace(
        pool,
        owner_id,
        WorkspaceCreateRequest {
            name: "Team".to_string(),
            description: None,
        },
    )
    .await?)
}

#[tokio::test]
async fn invite_code_join_grants_member_role_once() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let guest = common::register(&db.pool, "Guest", "guest@example.com").await?;
    let workspace = team_workspace(&db.pool, owner.id).await?;

    let joined = members::join_by_invite(&db.pool, guest.id, &workspace.invite_code).await?;
    assert_eq!(joined.workspace_id, workspace.id);
    assert_eq!(joined.role, RoleName::Member);
    assert_eq!(resolve_role(&db.pool, guest.id, workspace.id).await?, RoleName::Member);

    let again = members::join_by_invite(&db.pool, guest.id, &workspace.invite_code).await;
    assert!(matches!(again, Err(AppError::BadRequest(msg)) if msg == "You are already a member of this workspace"));

    let owner_again = members::join_by_invite(&db.pool, owner.id, &workspace.invite_code).await;
    assert!(matches!(owner_again, Err(AppError::BadRequest(_))));

    let bad_code = members::join_by_invite(&db.pool, guest.id, "nope1234").await;
    assert!(matches!(bad_code, Err(AppError::NotFound(_))));

    assert_eq!(
        common::count(&db.pool, "SELECT COUNT(*) FROM memberships WHERE workspace_id = ?", workspace.id).await?,
        2
    );
    Ok(())
}

#[tokio::test]
async fn resolution_distinguishes_missing_workspaces_from_outsiders() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let outsider = common::register(&db.pool, "Outsider", "outsider@example.com").await?;
    let workspace = team_workspace(&db.pool, owner.id).await?;

    let missing = resolve_role(&db.pool, owner.id, Uuid::new_v4()).await;
    assert!(matches!(missing, Err(AppError::NotFound(msg)) if msg == "Workspace does not exist"));

    let stranger = resolve_role(&db.pool, outsider.id, workspace.id).await;
    assert!(matches!(stranger, Err(AppError::Unauthorized(msg)) if msg == "You're not a member of this workspace"));

    let access = WorkspaceAccess::resolve(&db.pool, owner.id, workspace.id).await?;
    assert_eq!(access.role, RoleName::Owner);
    assert_eq!(access.workspace_id, workspace.id);
    Ok(())
}

#[tokio::test]
async fn member_access_is_limited_to_its_grant() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let guest = common::register(&db.pool, "Guest", "guest@example.com").await?;
    let workspace = team_workspace(&db.pool, owner.id).await?;
    members::join_by_invite(&db.pool, guest.id, &workspace.invite_code).await?;

    let access = WorkspaceAccess::resolve(&db.pool, guest.id, workspace.id).await?;
    access.require(&[Permission::ViewOnly])?;
    access.require(&[Permission::CreateTask, Permission::EditTask])?;

    for denied in [Permission::DeleteTask, Permission::CreateProject, Permission::DeleteWorkspace] {
        assert!(matches!(access.require(&[denied]), Err(AppError::Unauthorized(_))));
    }
    // All listed permissions must be held.
    assert!(access.require(&[Permission::ViewOnly, Permission::AddMember]).is_err());
    Ok(())
}

#[tokio::test]
async fn listings_cover_user_workspaces_and_workspace_members() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let guest = common::register(&db.pool, "Guest", "guest@example.com").await?;
    let workspace = team_workspace(&db.pool, owner.id).await?;
    members::join_by_invite(&db.pool, guest.id, &workspace.invite_code).await?;

    let guest_workspaces = members::list_user_workspaces(&db.pool, guest.id).await?;
    assert_eq!(guest_workspaces.len(), 2);
    assert!(guest_workspaces.iter().any(|w| w.id == workspace.id));

    let listing = members::list_workspace_members(&db.pool, workspace.id).await?;
    assert_eq!(listing.members.len(), 2);
    assert_eq!(listing.members[0].user.id, owner.id);
    assert_eq!(listing.members[0].role.name, RoleName::Owner);
    assert_eq!(listing.members[1].user.email, "guest@example.com");
    assert_eq!(listing.members[1].role.name, RoleName::Member);
    assert_eq!(listing.roles.len(), RoleName::ALL.len());
    Ok(())
}

#[tokio::test]
async fn seeding_is_idempotent_and_repairs_drift() -> Result<()> {
    let db = common::setup().await?;

    let first = seed_roles(&db.pool).await?;
    let second = seed_roles(&db.pool).await?;
    assert_eq!(first.len(), 3);

    let ids = |roles: &[teamsync::models::role::Role]| {
        let mut ids: Vec<(RoleName, Uuid)> = roles.iter().map(|r| (r.name, r.id)).collect();
        ids.sort_by_key(|(name, _)| name.as_str());
        ids
    };
    assert_eq!(ids(&first), ids(&second));

    sqlx::query("UPDATE roles SET permissions = '[]' WHERE name = 'MEMBER'")
        .execute(&db.pool)
        .await?;
    let repaired = seed_roles(&db.pool).await?;
    let member = repaired
        .iter()
        .find(|r| r.name == RoleName::Member)
        .expect("member role present");
    assert_eq!(member.permissions, permissions_for(RoleName::Member).to_vec());
    assert_eq!(ids(&repaired), ids(&first));
    Ok(())
}
