mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use uuid::Uuid;

use teamsync::authz::{resolve_role, RoleName};
use teamsync::errors::AppError;
use teamsync::models::project::ProjectCreateRequest;
use teamsync::models::task::TaskCreateRequest;
use teamsync::models::workspace::{WorkspaceCreateRequest, WorkspaceUpdateRequest};
use teamsync::services::{accounts, members, projects, tasks, workspaces};

fn workspace_request(name: &str) -> WorkspaceCreateRequest {
    WorkspaceCreateRequest {
        name: name.to_string(),
        description: None,
    }
}

fn project_request(name: &str) -> ProjectCreateRequest {
    ProjectCreateRequest {
        name: name.to_string(),
        emoji: None,
        description: None,
    }
}

fn task_request(title: &str) -> TaskCreateRequest {
    TaskCreateRequest {
        title: title.to_string(),
        description: None,
        priority: None,
        status: None,
        assigned_to: None,
        due_date: Some(Utc::now() + Duration::days(3)),
    }
}

async fn role_id(pool: &sqlx::SqlitePool, role: RoleName) -> Result<Uuid> {
    Ok(sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
        .bind(role)
        .fetch_one(pool)
        .await?)
}

async fn membership_id(pool: &sqlx::SqlitePool, user_id: Uuid, workspace_id: Uuid) -> Result<Uuid> {
    Ok(sqlx::query_scalar("SELECT id FROM memberships WHERE user_id = ? AND workspace_id = ?")
        .bind(user_id)
        .bind(workspace_id)
        .fetch_one(pool)
        .await?)
}

#[tokio::test]
async fn registration_bootstraps_a_personal_workspace() -> Result<()> {
    let db = common::setup().await?;
    let user = common::register(&db.pool, "Ada", "ada@example.com").await?;

    let personal = user.current_workspace_id.expect("current workspace set at registration");
    let detail = workspaces::get_workspace(&db.pool, personal).await?;
    assert_eq!(detail.workspace.name, "My Workspace");
    assert_eq!(detail.workspace.description.as_deref(), Some("Workspace created for Ada"));
    assert_eq!(detail.workspace.owner_id, user.id);
    assert_eq!(detail.members.len(), 1);
    assert_eq!(detail.members[0].role.name, RoleName::Owner);

    assert_eq!(resolve_role(&db.pool, user.id, personal).await?, RoleName::Owner);
    Ok(())
}

#[tokio::test]
async fn creating_a_workspace_makes_the_creator_owner_and_current() -> Result<()> {
    let db = common::setup().await?;
    let user = common::register(&db.pool, "Ada", "ada@example.com").await?;

    let workspace = workspaces::create_workspace(
        &db.pool,
        user.id,
        WorkspaceCreateRequest {
            name: "  Design  ".to_string(),
            description: Some("Design work".to_string()),
        },
    )
    .await?;

    assert_eq!(workspace.name, "Design");
    assert_eq!(workspace.owner_id, user.id);
    assert_eq!(workspace.invite_code.len(), 8);
    assert_eq!(resolve_role(&db.pool, user.id, workspace.id).await?, RoleName::Owner);

    let refreshed = accounts::fetch_user(&db.pool, user.id).await?;
    assert_eq!(refreshed.current_workspace_id, Some(workspace.id));

    let missing = workspaces::create_workspace(&db.pool, Uuid::new_v4(), workspace_request("Ghost")).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let blank = workspaces::create_workspace(&db.pool, user.id, workspace_request("   ")).await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_missing_fields_and_clears_empty_description() -> Result<()> {
    let db = common::setup().await?;
    let user = common::register(&db.pool, "Ada", "ada@example.com").await?;
    let workspace = workspaces::create_workspace(
        &db.pool,
        user.id,
        WorkspaceCreateRequest {
            name: "Design".to_string(),
            description: Some("Design work".to_string()),
        },
    )
    .await?;

    let renamed = workspaces::update_workspace(
        &db.pool,
        workspace.id,
        WorkspaceUpdateRequest {
            name: Some("Brand".to_string()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(renamed.name, "Brand");
    assert_eq!(renamed.description.as_deref(), Some("Design work"));

    let cleared = workspaces::update_workspace(
        &db.pool,
        workspace.id,
        WorkspaceUpdateRequest {
            description: Some(String::new()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(cleared.name, "Brand");
    assert_eq!(cleared.description, None);

    let empty_name = workspaces::update_workspace(
        &db.pool,
        workspace.id,
        WorkspaceUpdateRequest {
            name: Some(" ".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(empty_name, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn deleting_a_workspace_cascades_and_moves_current_workspaces() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let guest = common::register(&db.pool, "Guest", "guest@example.com").await?;
    let owner_personal = owner.current_workspace_id.expect("personal workspace");
    let guest_personal = guest.current_workspace_id.expect("personal workspace");

    let workspace = workspaces::create_workspace(&db.pool, owner.id, workspace_request("Doomed")).await?;
    members::join_by_invite(&db.pool, guest.id, &workspace.invite_code).await?;
    sqlx::query("UPDATE users SET current_workspace_id = ? WHERE id = ?")
        .bind(workspace.id)
        .bind(guest.id)
        .execute(&db.pool)
        .await?;

    for name in ["Alpha", "Beta"] {
        let project = projects::create_project(&db.pool, owner.id, workspace.id, project_request(name)).await?;
        for title in ["first", "second", "third"] {
            tasks::create_task(&db.pool, owner.id, workspace.id, project.id, task_request(title)).await?;
        }
    }

    let current = workspaces::delete_workspace(&db.pool, workspace.id, owner.id).await?;
    assert_eq!(current, Some(owner_personal));

    let ws = workspace.id;
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM workspaces WHERE id = ?", ws).await?, 0);
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM projects WHERE workspace_id = ?", ws).await?, 0);
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM tasks WHERE workspace_id = ?", ws).await?, 0);
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM memberships WHERE workspace_id = ?", ws).await?, 0);

    let guest_after = accounts::fetch_user(&db.pool, guest.id).await?;
    assert_eq!(guest_after.current_workspace_id, Some(guest_personal));

    // Unrelated workspaces are untouched.
    assert_eq!(resolve_role(&db.pool, owner.id, owner_personal).await?, RoleName::Owner);
    assert_eq!(resolve_role(&db.pool, guest.id, guest_personal).await?, RoleName::Owner);
    Ok(())
}

#[tokio::test]
async fn deleting_the_last_workspace_leaves_no_current_workspace() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let personal = owner.current_workspace_id.expect("personal workspace");

    let current = workspaces::delete_workspace(&db.pool, personal, owner.id).await?;
    assert_eq!(current, None);
    assert_eq!(accounts::fetch_user(&db.pool, owner.id).await?.current_workspace_id, None);
    Ok(())
}

#[tokio::test]
async fn only_the_owner_can_delete() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let admin = common::register(&db.pool, "Admin", "admin@example.com").await?;
    let workspace = workspaces::create_workspace(&db.pool, owner.id, workspace_request("Kept")).await?;
    members::join_by_invite(&db.pool, admin.id, &workspace.invite_code).await?;

    let result = workspaces::delete_workspace(&db.pool, workspace.id, admin.id).await;
    assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "You are not the owner of this workspace"));
    assert_eq!(
        common::count(&db.pool, "SELECT COUNT(*) FROM workspaces WHERE id = ?", workspace.id).await?,
        1
    );

    let missing = workspaces::delete_workspace(&db.pool, Uuid::new_v4(), owner.id).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn a_failed_cascade_step_rolls_everything_back() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let workspace = workspaces::create_workspace(&db.pool, owner.id, workspace_request("Fragile")).await?;
    let project = projects::create_project(&db.pool, owner.id, workspace.id, project_request("Alpha")).await?;
    tasks::create_task(&db.pool, owner.id, workspace.id, project.id, task_request("only")).await?;

    sqlx::query(
        "CREATE TRIGGER fail_membership_delete BEFORE DELETE ON memberships \
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .execute(&db.pool)
    .await?;

    let result = workspaces::delete_workspace(&db.pool, workspace.id, owner.id).await;
    assert!(matches!(result, Err(AppError::Database(_))));

    let ws = workspace.id;
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM workspaces WHERE id = ?", ws).await?, 1);
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM projects WHERE workspace_id = ?", ws).await?, 1);
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM tasks WHERE workspace_id = ?", ws).await?, 1);
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM memberships WHERE workspace_id = ?", ws).await?, 1);
    assert_eq!(accounts::fetch_user(&db.pool, owner.id).await?.current_workspace_id, Some(ws));

    sqlx::query("DROP TRIGGER fail_membership_delete").execute(&db.pool).await?;
    workspaces::delete_workspace(&db.pool, ws, owner.id).await?;
    assert_eq!(common::count(&db.pool, "SELECT COUNT(*) FROM workspaces WHERE id = ?", ws).await?, 0);
    Ok(())
}

#[tokio::test]
async fn member_roles_can_be_changed_within_the_workspace() -> Result<()> {
    let db = common::setup().await?;
    let owner = common::register(&db.pool, "Owner", "owner@example.com").await?;
    let member = common::register(&db.pool, "Member", "member@example.com").await?;
    let workspace = workspaces::create_workspace(&db.pool, owner.id, workspace_request("Team")).await?;
    members::join_by_invite(&db.pool, member.id, &workspace.invite_code).await?;

    let admin_role = role_id(&db.pool, RoleName::Admin).await?;
    let member_row = membership_id(&db.pool, member.id, workspace.id).await?;

    let updated = workspaces::change_member_role(&db.pool, workspace.id, member_row, admin_role).await?;
    assert_eq!(updated.role_id, admin_role);
    assert_eq!(resolve_role(&db.pool, member.id, workspace.id).await?, RoleName::Admin);

    let unknown_role = workspaces::change_member_role(&db.pool, workspace.id, member_row, Uuid::new_v4()).await;
    assert!(matches!(unknown_role, Err(AppError::NotFound(_))));

    let unknown_member = workspaces::change_member_role(&db.pool, workspace.id, Uuid::new_v4(), admin_role).await;
    assert!(matches!(unknown_member, Err(AppError::Internal(_))));

    let unknown_workspace = workspaces::change_member_role(&db.pool, Uuid::new_v4(), member_row, admin_role).await;
    assert!(matches!(unknown_workspace, Err(AppError::NotFound(_))));

    // A membership from another workspace cannot be edited through this one.
    let foreign_row = membership_id(&db.pool, member.id, member.current_workspace_id.expect("personal")).await?;
    let foreign = workspaces::change_member_role(&db.pool, workspace.id, foreign_row, admin_role).await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    let owner_row = membership_id(&db.pool, owner.id, workspace.id).await?;
    let demote_owner = workspaces::change_member_role(&db.pool, workspace.id, owner_row, admin_role).await;
    assert!(matches!(demote_owner, Err(AppError::BadRequest(_))));
    assert_eq!(resolve_role(&db.pool, owner.id, workspace.id).await?, RoleName::Owner);
    Ok(())
}
