use super::registry::{permissions_for, Permission, RoleName};
use crate::errors::{AppError, AppResult};

/// Allows the action only if `role` is granted every permission in `required`.
pub fn authorize(role: RoleName, required: &[Permission]) -> AppResult<()> {
    let granted = permissions_for(role);
    let missing = required.iter().find(|permission| !granted.contains(permission));

    match missing {
        None => Ok(()),
        Some(permission) => {
            tracing::debug!(role = %role, permission = ?permission, "permission denied");
            Err(AppError::unauthorized(
                "You don't have the necessary permissions to perform this action",
            ))
        }
    }
}
