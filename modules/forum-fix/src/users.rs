use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use tracing::info;

use forum_common::{ForumAdminError, Result};

use crate::password;
use crate::role::Role;

/// Hard ceiling for `list-users`.
pub const MAX_LIST_LIMIT: u32 = 500;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

type UserTuple = (i32, String, String, String, bool, DateTime<Utc>);

fn row_to_user((id, username, email, role, email_verified, created_at): UserTuple) -> UserRow {
    UserRow {
        id,
        username,
        email,
        role,
        email_verified,
        created_at,
    }
}

#[derive(Debug)]
pub struct RoleChange {
    pub user: UserRow,
    pub previous: String,
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub async fn find_by_email(pool: &MySqlPool, email: &str) -> Result<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserTuple>(
        r#"
        SELECT id, username, email, role, email_verified, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_user))
}

pub async fn require_by_email(pool: &MySqlPool, email: &str) -> Result<UserRow> {
    find_by_email(pool, email)
        .await?
        .ok_or_else(|| ForumAdminError::NotFound(format!("no user with email {email}")))
}

/// Rows a listing will actually return for a requested `limit`.
pub fn effective_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_LIST_LIMIT)
}

pub async fn list(pool: &MySqlPool, limit: u32, unverified_only: bool) -> Result<Vec<UserRow>> {
    let limit = effective_limit(limit) as i64;

    let sql = if unverified_only {
        r#"
        SELECT id, username, email, role, email_verified, created_at
        FROM users
        WHERE email_verified = FALSE
        ORDER BY created_at DESC
        LIMIT ?
        "#
    } else {
        r#"
        SELECT id, username, email, role, email_verified, created_at
        FROM users
        ORDER BY created_at DESC
        LIMIT ?
        "#
    };

    let rows = sqlx::query_as::<_, UserTuple>(sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(row_to_user).collect())
}

// ---------------------------------------------------------------------------
// Fixes
// ---------------------------------------------------------------------------

/// Replace a user's password with a bcrypt hash of `new_password`.
///
/// The password is validated and hashed before the database is touched.
pub async fn reset_password(pool: &MySqlPool, email: &str, new_password: &str) -> Result<UserRow> {
    let hashed = password::hash(new_password)?;
    let user = require_by_email(pool, email).await?;

    sqlx::query("UPDATE users SET password = ? WHERE id = ?")
        .bind(&hashed)
        .bind(user.id)
        .execute(pool)
        .await?;

    info!(user_id = user.id, username = user.username.as_str(), "Password reset");
    Ok(user)
}

pub async fn set_role(pool: &MySqlPool, email: &str, role: Role) -> Result<RoleChange> {
    let user = require_by_email(pool, email).await?;
    let previous = user.role.clone();

    if previous.parse::<Role>().ok() == Some(role) {
        return Ok(RoleChange {
            user,
            previous,
            changed: false,
        });
    }

    sqlx::query("UPDATE users SET role = ? WHERE id = ?")
        .bind(role.as_str())
        .bind(user.id)
        .execute(pool)
        .await?;

    info!(
        user_id = user.id,
        from = previous.as_str(),
        to = role.as_str(),
        "Role changed"
    );

    let user = UserRow {
        role: role.as_str().to_string(),
        ..user
    };
    Ok(RoleChange {
        user,
        previous,
        changed: true,
    })
}

/// Mark one user's email verified. Returns the number of rows changed
/// (0 when the user was already verified).
pub async fn verify_email(pool: &MySqlPool, email: &str) -> Result<u64> {
    let user = require_by_email(pool, email).await?;

    let result = sqlx::query(
        "UPDATE users SET email_verified = TRUE, verification_token = NULL \
         WHERE id = ? AND email_verified = FALSE",
    )
    .bind(user.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn verify_all(pool: &MySqlPool) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE users SET email_verified = TRUE, verification_token = NULL \
         WHERE email_verified = FALSE",
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
