//! Team service — CMS operator accounts and role rules.
//!
//! DESIGN
//! ======
//! Operators are the auth principals: the `users` table backs both login and
//! the team-management screens. Members are deactivated, never hard-deleted,
//! because content rows keep `author_id`/`created_by` references to them.

use sqlx::{PgPool, Row};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    #[error("member not found: {0}")]
    NotFound(Uuid),
    #[error("invalid email")]
    InvalidEmail,
    #[error("email already belongs to a member: {0}")]
    EmailTaken(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("operators cannot demote or deactivate themselves")]
    SelfLockout,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Operator role, ordered least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Viewer,
    Editor,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw {
            "viewer" => Some(Self::Viewer),
            "editor" => Some(Self::Editor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Require at least the given role.
///
/// # Errors
///
/// Returns [`TeamError::Forbidden`] when the operator's role is insufficient.
pub fn ensure_role(user: &crate::services::session::SessionUser, required: Role) -> Result<(), TeamError> {
    if user.role >= required {
        Ok(())
    } else {
        Err(TeamError::Forbidden(format!(
            "requires {} role, operator is {}",
            required.as_str(),
            user.role.as_str()
        )))
    }
}

/// Row returned from member queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MemberRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: Option<String>,
}

fn member_from_row(row: &sqlx::postgres::PgRow) -> MemberRow {
    let role: String = row.get("role");
    MemberRow {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        role: Role::from_str(&role).unwrap_or(Role::Viewer),
        active: row.get("active"),
        created_at: row.get("created_at"),
    }
}

const MEMBER_COLUMNS: &str = "id, email, name, role, active, to_char(created_at, 'YYYY-MM-DD HH24:MI') AS created_at";

// =============================================================================
// CRUD
// =============================================================================

/// List all members, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_members(pool: &PgPool) -> Result<Vec<MemberRow>, TeamError> {
    let rows = sqlx::query(&format!("SELECT {MEMBER_COLUMNS} FROM users ORDER BY created_at DESC"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(member_from_row).collect())
}

/// Fetch one member.
///
/// # Errors
///
/// Returns [`TeamError::NotFound`] for an unknown id.
pub async fn get_member(pool: &PgPool, member_id: Uuid) -> Result<MemberRow, TeamError> {
    let row = sqlx::query(&format!("SELECT {MEMBER_COLUMNS} FROM users WHERE id = $1"))
        .bind(member_id)
        .fetch_optional(pool)
        .await?
        .ok_or(TeamError::NotFound(member_id))?;
    Ok(member_from_row(&row))
}

/// Invite a new member. The email must not already belong to one.
///
/// # Errors
///
/// Returns [`TeamError::EmailTaken`] on duplicate email.
pub async fn create_member(pool: &PgPool, email: &str, name: &str, role: Role) -> Result<MemberRow, TeamError> {
    let normalized = crate::services::email_auth::normalize_email(email).ok_or(TeamError::InvalidEmail)?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(&normalized)
        .fetch_one(pool)
        .await?;
    if exists {
        return Err(TeamError::EmailTaken(normalized));
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, name, role) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(&normalized)
        .bind(name)
        .bind(role.as_str())
        .execute(pool)
        .await?;

    get_member(pool, id).await
}

/// Fields an admin may change on a member.
#[derive(Debug, Default, serde::Deserialize)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Update a member's name, role, or active flag.
///
/// Deactivating a member also deletes their sessions so existing cookies stop
/// working. `actor_id` guards against admins locking themselves out.
///
/// # Errors
///
/// Returns [`TeamError::SelfLockout`] when an admin demotes or deactivates
/// themselves, [`TeamError::NotFound`] for an unknown id.
pub async fn update_member(
    pool: &PgPool,
    actor_id: Uuid,
    member_id: Uuid,
    patch: MemberPatch,
) -> Result<MemberRow, TeamError> {
    if actor_id == member_id {
        let demoted = patch.role.is_some_and(|role| role != Role::Admin);
        let deactivated = patch.active == Some(false);
        if demoted || deactivated {
            return Err(TeamError::SelfLockout);
        }
    }

    let current = get_member(pool, member_id).await?;
    let name = patch.name.unwrap_or(current.name);
    let role = patch.role.unwrap_or(current.role);
    let active = patch.active.unwrap_or(current.active);

    sqlx::query("UPDATE users SET name = $2, role = $3, active = $4, updated_at = now() WHERE id = $1")
        .bind(member_id)
        .bind(&name)
        .bind(role.as_str())
        .bind(active)
        .execute(pool)
        .await?;

    if !active {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(member_id)
            .execute(pool)
            .await?;
    }

    get_member(pool, member_id).await
}

#[cfg(test)]
#[path = "team_test.rs"]
mod tests;
