use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{Permission, RoleName};
use crate::errors::AppError;

/// A stored role row. Its permission list is a copy of the static grant
/// table, refreshed by role seeding.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub name: RoleName,
    pub permissions: Vec<Permission>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbRole {
    pub id: Uuid,
    pub name: RoleName,
    pub permissions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbRole> for Role {
    type Error = AppError;

    fn try_from(value: DbRole) -> Result<Self, Self::Error> {
        let permissions = serde_json::from_str(&value.permissions).map_err(|err| {
            AppError::configuration(format!("role {} has an unreadable permission list: {err}", value.name))
        })?;

        Ok(Role {
            id: value.id,
            name: value.name,
            permissions,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct RoleSummary {
    pub id: Uuid,
    pub name: RoleName,
}
