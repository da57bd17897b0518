use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::pagination::Pagination;
use crate::models::user::UserSummary;

pub const DEFAULT_EMOJI: &str = "📊";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub emoji: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const PROJECT_COLUMNS: &str = "id, workspace_id, name, emoji, description, created_by, created_at, updated_at";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectListItem {
    #[serde(flatten)]
    pub project: Project,
    pub creator: UserSummary,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbProjectListItem {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub emoji: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_name: String,
    pub creator_profile_picture: Option<String>,
}

impl From<DbProjectListItem> for ProjectListItem {
    fn from(value: DbProjectListItem) -> Self {
        ProjectListItem {
            creator: UserSummary {
                id: value.created_by,
                name: value.creator_name,
                profile_picture: value.creator_profile_picture,
            },
            project: Project {
                id: value.id,
                workspace_id: value.workspace_id,
                name: value.name,
                emoji: value.emoji,
                description: value.description,
                created_by: value.created_by,
                created_at: value.created_at,
                updated_at: value.updated_at,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectPage {
    pub projects: Vec<ProjectListItem>,
    pub pagination: Pagination,
}

/// Embedded in task listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub emoji: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectCreateRequest {
    #[schema(example = "Website Redesign")]
    pub name: String,
    #[schema(example = "🚀")]
    pub emoji: Option<String>,
    #[schema(example = "Refresh the marketing site.")]
    pub description: Option<String>,
}

/// Partial update, same rules as the workspace update: missing fields keep
/// their value, an empty `description` clears it, an empty `name` is rejected.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProjectUpdateRequest {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub description: Option<String>,
}
