//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shoebox_core::{Email, UserId, UserRole, UserStatus};

use super::RepositoryError;
use crate::models::user::{NewUser, OAuthProfile, User};

/// All user columns, shared by every SELECT/RETURNING clause.
const USER_COLUMNS: &str = "id, name, email, password_hash, mirror_uid, google_id, photo_url, \
     role, status, fcm_token, mobile_number, address, last_login, created_at, updated_at";

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    password_hash: Option<String>,
    mirror_uid: Option<String>,
    google_id: Option<String>,
    photo_url: Option<String>,
    role: UserRole,
    status: UserStatus,
    fcm_token: Option<String>,
    mobile_number: Option<String>,
    address: Option<String>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email,
            mirror_uid: self.mirror_uid,
            google_id: self.google_id,
            photo_url: self.photo_url,
            role: self.role,
            status: self.status,
            fcm_token: self.fcm_token,
            mobile_number: self.mobile_number,
            address: self.address,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get a user by email together with their stored password hash.
    ///
    /// The hash is `None` for OAuth-only accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let hash = r.password_hash.clone();
                Ok(Some((r.into_user()?, hash)))
            }
            None => Ok(None),
        }
    }

    /// Get a user by their Google account id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"
        ))
        .bind(google_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user with a password hash (signup path).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(&self, input: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, password_hash, mobile_number, address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.email.as_str())
        .bind(&input.password_hash)
        .bind(&input.mobile_number)
        .bind(&input.address)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))?;

        row.into_user()
    }

    /// Create a new user from an OAuth profile (no password).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_oauth(&self, profile: &OAuthProfile) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, google_id, photo_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&profile.name)
        .bind(profile.email.as_str())
        .bind(&profile.google_id)
        .bind(&profile.photo_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already exists"))?;

        row.into_user()
    }

    /// Merge missing OAuth fields into an existing user.
    ///
    /// Only fills `google_id` and `photo_url` where they are currently NULL;
    /// existing values are never overwritten, which keeps repeated OAuth
    /// logins idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn merge_oauth_fields(
        &self,
        id: UserId,
        profile: &OAuthProfile,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users
             SET google_id = COALESCE(google_id, $2),
                 photo_url = COALESCE(photo_url, $3),
                 updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&profile.google_id)
        .bind(&profile.photo_url)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }

    /// Record a successful login, optionally rotating the push token.
    ///
    /// The `users.fcm_token` invariant says a token value is held by at most
    /// one user; clearing it from any other holder and assigning it here run
    /// in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn record_login(
        &self,
        id: UserId,
        fcm_token: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if let Some(token) = fcm_token {
            sqlx::query("UPDATE users SET fcm_token = NULL WHERE fcm_token = $1 AND id <> $2")
                .bind(token)
                .bind(id.as_i32())
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE users SET fcm_token = $1, last_login = now() WHERE id = $2")
                .bind(token)
                .bind(id.as_i32())
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
                .bind(id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Clear the push token for a user (logout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_fcm_token(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET fcm_token = NULL WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Update profile fields (name, mobile number, address).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: Option<&str>,
        mobile_number: Option<&str>,
        address: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 mobile_number = COALESCE($3, mobile_number),
                 address = COALESCE($4, address),
                 updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(name)
        .bind(mobile_number)
        .bind(address)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_user()
    }

    /// Record the mirror-assigned uid after the mirror worker provisions
    /// the identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_mirror_uid(&self, id: UserId, uid: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET mirror_uid = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_i32())
            .bind(uid)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Hard-delete a user (explicit admin action only).
    ///
    /// # Returns
    ///
    /// The deleted user's mirror uid (if any), so the caller can enqueue the
    /// mirror-side delete. `None` when no row matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn delete(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("DELETE FROM users WHERE id = $1 RETURNING mirror_uid")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        match row {
            Some((mirror_uid,)) => Ok(mirror_uid),
            None => Err(RepositoryError::NotFound),
        }
    }
}
