use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where an identity comes from. `Email` is the local password login.
///
/// Each user gets exactly one `accounts` row, written when the user is
/// bootstrapped and never updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    Google,
    Facebook,
    Github,
    Email,
}

/// What an identity provider tells us about a user after a successful handshake.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedProfile {
    pub provider: Provider,
    pub provider_id: String,
    pub display_name: String,
    pub email: String,
    pub picture: Option<String>,
}
