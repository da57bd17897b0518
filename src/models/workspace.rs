use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::membership::MemberDetail;
use crate::models::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Strong reference: the owner always also holds an OWNER membership.
    pub owner_id: Uuid,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const WORKSPACE_COLUMNS: &str = "id, name, description, owner_id, invite_code, created_at, updated_at";

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkspaceDetail {
    #[serde(flatten)]
    pub workspace: Workspace,
    pub members: Vec<MemberDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkspaceMembers {
    pub members: Vec<MemberDetail>,
    pub roles: Vec<Role>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WorkspaceCreateRequest {
    #[schema(example = "Design Team")]
    pub name: String,
    #[schema(example = "Everything the design team is working on.")]
    pub description: Option<String>,
}

/// Partial update. A missing field keeps its value; an empty `description`
/// clears it; an empty `name` is rejected.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct WorkspaceUpdateRequest {
    #[schema(example = "Design Team")]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromRow)]
pub struct TaskAnalytics {
    pub total_tasks: i64,
    pub overdue_tasks: i64,
    pub completed_tasks: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkspaceDeleted {
    pub current_workspace_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub member_id: Uuid,
    pub role_id: Uuid,
}
