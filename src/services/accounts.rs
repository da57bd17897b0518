//! User bootstrap and credential checks.
//!
//! Every new user, local or federated, is created together with an account
//! binding and a personal workspace that the user owns. The three writes share
//! one unit of work.

use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::db::UnitOfWork;
use crate::errors::{AppError, AppResult};
use crate::models::account::{FederatedProfile, Provider};
use crate::models::user::{DbUser, RegisterRequest, User, USER_COLUMNS};
use crate::services::workspaces::create_owned_workspace;
use crate::utils::{normalize_text, utc_now, validate_name};

const PERSONAL_WORKSPACE_NAME: &str = "My Workspace";

/// Local email/password sign-up.
pub async fn register(pool: &SqlitePool, req: RegisterRequest) -> AppResult<User> {
    let name = validate_name("name", &req.name)?;
    let email = normalize_email(&req.email)?;
    let password_hash = hash_password(&req.password)?;

    let mut uow = UnitOfWork::begin(pool, "register").await?;

    if find_user_by_email(uow.conn(), &email).await?.is_some() {
        return Err(AppError::bad_request("Email already exists"));
    }

    let user_id = bootstrap_user(
        uow.conn(),
        NewUser {
            name: &name,
            email: &email,
            password_hash: Some(&password_hash),
            profile_picture: None,
            provider: Provider::Email,
            provider_id: &email,
        },
    )
    .await?;

    let user = fetch_user_in(uow.conn(), user_id).await?;
    uow.commit().await?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(user)
}

/// Returns the user behind a federated identity, creating the user, its
/// account binding and a personal workspace on first sight.
pub async fn login_or_create_account(pool: &SqlitePool, profile: FederatedProfile) -> AppResult<User> {
    let email = normalize_email(&profile.email)?;

    let mut uow = UnitOfWork::begin(pool, "login_or_create_account").await?;

    if let Some(existing) = find_user_by_email(uow.conn(), &email).await? {
        uow.rollback().await?;
        return Ok(existing.into());
    }

    let name = normalize_text(Some(&profile.display_name))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.clone());
    let picture = normalize_text(profile.picture.as_deref()).filter(|p| !p.is_empty());

    let user_id = bootstrap_user(
        uow.conn(),
        NewUser {
            name: &name,
            email: &email,
            password_hash: None,
            profile_picture: picture.as_deref(),
            provider: profile.provider,
            provider_id: &profile.provider_id,
        },
    )
    .await?;

    let user = fetch_user_in(uow.conn(), user_id).await?;
    uow.commit().await?;

    tracing::info!(user_id = %user.id, provider = ?profile.provider, "federated user created");
    Ok(user)
}

/// Checks local credentials and stamps `last_login` on success.
pub async fn verify_user(pool: &SqlitePool, email: &str, password: &str) -> AppResult<User> {
    let email = normalize_email(email)?;

    let has_account: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE provider = ? AND provider_id = ?)")
            .bind(Provider::Email)
            .bind(&email)
            .fetch_one(pool)
            .await?;
    if !has_account {
        return Err(AppError::not_found("Invalid email or password"));
    }

    let mut conn = pool.acquire().await?;
    let user = find_user_by_email(&mut *conn, &email)
        .await?
        .ok_or_else(|| AppError::not_found("User not found for the given account"))?;

    let matches = match user.password_hash.as_deref() {
        Some(hash) => verify_password(password, hash)?,
        None => false,
    };
    if !matches {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let now = utc_now();
    sqlx::query("UPDATE users SET last_login = ?, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(now)
        .bind(user.id)
        .execute(&mut *conn)
        .await?;

    let mut user = User::from(user);
    user.last_login = Some(now);
    user.updated_at = now;
    Ok(user)
}

pub async fn fetch_user(pool: &SqlitePool, user_id: Uuid) -> AppResult<User> {
    let mut conn = pool.acquire().await?;
    fetch_user_in(&mut *conn, user_id).await
}

struct NewUser<'a> {
    name: &'a str,
    email: &'a str,
    password_hash: Option<&'a str>,
    profile_picture: Option<&'a str>,
    provider: Provider,
    provider_id: &'a str,
}

async fn bootstrap_user(conn: &mut SqliteConnection, new_user: NewUser<'_>) -> AppResult<Uuid> {
    let now = utc_now();
    let user_id = Uuid::new_v4();

    let inserted = sqlx::query(&format!(
        "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, 1, NULL, NULL, ?, ?)"
    ))
    .bind(user_id)
    .bind(new_user.name)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.profile_picture)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await;

    match inserted {
        Ok(_) => {}
        // Another sign-up with this email committed after the lookup.
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            return Err(AppError::bad_request("Email already exists"));
        }
        Err(err) => return Err(err.into()),
    }

    sqlx::query("INSERT INTO accounts (id, user_id, provider, provider_id, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new_user.provider)
        .bind(new_user.provider_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    let description = format!("Workspace created for {}", new_user.name);
    create_owned_workspace(conn, user_id, PERSONAL_WORKSPACE_NAME, Some(&description), now).await?;

    Ok(user_id)
}

async fn find_user_by_email(conn: &mut SqliteConnection, email: &str) -> AppResult<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

async fn fetch_user_in(conn: &mut SqliteConnection, user_id: Uuid) -> AppResult<User> {
    sqlx::query_as::<_, DbUser>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .map(User::from)
        .ok_or_else(|| AppError::not_found("User not found"))
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("email must be a valid email address"));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
        assert!(matches!(normalize_email("   "), Err(AppError::Validation(_))));
        assert!(matches!(normalize_email("nobody"), Err(AppError::Validation(_))));
    }
}
