use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::RoleName;
use crate::models::role::RoleSummary;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workspace_id: Uuid,
    pub role_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const MEMBERSHIP_COLUMNS: &str = "id, user_id, workspace_id, role_id, joined_at, created_at, updated_at";

/// A membership with its user and role resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberDetail {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub user: MemberUser,
    pub role: RoleSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbMemberDetail {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub user_profile_picture: Option<String>,
    pub role_id: Uuid,
    pub role_name: RoleName,
}

pub const MEMBER_DETAIL_SELECT: &str = "SELECT m.id, m.workspace_id, m.joined_at, \
     u.id AS user_id, u.name AS user_name, u.email AS user_email, u.profile_picture AS user_profile_picture, \
     r.id AS role_id, r.name AS role_name \
     FROM memberships m \
     JOIN users u ON u.id = m.user_id \
     JOIN roles r ON r.id = m.role_id";

impl From<DbMemberDetail> for MemberDetail {
    fn from(value: DbMemberDetail) -> Self {
        MemberDetail {
            id: value.id,
            workspace_id: value.workspace_id,
            joined_at: value.joined_at,
            user: MemberUser {
                id: value.user_id,
                name: value.user_name,
                email: value.user_email,
                profile_picture: value.user_profile_picture,
            },
            role: RoleSummary {
                id: value.role_id,
                name: value.role_name,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JoinWorkspaceResponse {
    pub workspace_id: Uuid,
    pub role: RoleName,
}
