//! Authentication service.
//!
//! Password signup/login, Google OAuth reconciliation, and signed session
//! tokens. The local `users` table is canonical; the identity mirror is
//! updated asynchronously by the mirror worker and never consulted here.

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, JwtKeys, issue_token, verify_token};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use shoebox_core::{Email, UserId, UserStatus};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, OAuthProfile, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Input for password signup.
#[derive(Debug, Clone)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
}

/// Outcome of an OAuth login, distinguishing fresh accounts so the caller
/// can enqueue the mirror provisioning exactly once.
#[derive(Debug)]
pub struct OAuthOutcome {
    pub user: User,
    pub token: String,
    /// True when this login created the local account.
    pub created: bool,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    keys: &'a JwtKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, keys: &'a JwtKeys) -> Self {
        Self {
            users: UserRepository::new(pool),
            keys,
        }
    }

    /// Register a new user with email and password, returning the user and
    /// a freshly issued session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn signup(&self, input: SignupInput) -> Result<(User, String), AuthError> {
        let email = Email::parse(&input.email)?;
        validate_password(&input.password)?;
        let password_hash = hash_password(&input.password)?;

        let user = self
            .users
            .create_with_password(&NewUser {
                name: input.name,
                email,
                password_hash,
                mobile_number: input.mobile_number,
                address: input.address,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let token = issue_token(&user, self.keys)?;
        Ok((user, token))
    }

    /// Login with email and password.
    ///
    /// When the client supplies a push token it is rotated onto this user in
    /// the same transaction that records the login, so a device handed
    /// between accounts never notifies the previous owner.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong
    /// (OAuth-only accounts fail the same way).
    /// Returns `AuthError::AccountInactive` for deactivated accounts.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        fcm_token: Option<&str>,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // OAuth-only accounts have no hash; report the same error as a wrong
        // password so the response doesn't leak how the account signs in.
        let hash = password_hash.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &hash)?;

        if user.status != UserStatus::Active {
            return Err(AuthError::AccountInactive);
        }

        self.users.record_login(user.id, fcm_token).await?;

        let token = issue_token(&user, self.keys)?;
        Ok((user, token))
    }

    /// Login (or register) through a Google OAuth profile.
    ///
    /// Reconciliation order: match on `google_id`, then on email (filling in
    /// the missing OAuth fields), then create a fresh password-less account.
    /// Repeating the same login is idempotent; existing profile values are
    /// never overwritten.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountInactive` for deactivated accounts.
    pub async fn oauth_login(
        &self,
        profile: OAuthProfile,
        fcm_token: Option<&str>,
    ) -> Result<OAuthOutcome, AuthError> {
        let mut created = false;

        let user = match &profile.google_id {
            Some(google_id) => self.users.get_by_google_id(google_id).await?,
            None => None,
        };

        let user = match user {
            Some(user) => user,
            None => match self.users.get_by_email(&profile.email).await? {
                Some(existing) => self.users.merge_oauth_fields(existing.id, &profile).await?,
                None => {
                    created = true;
                    self.users.create_oauth(&profile).await?
                }
            },
        };

        if user.status != UserStatus::Active {
            return Err(AuthError::AccountInactive);
        }

        self.users.record_login(user.id, fcm_token).await?;

        let token = issue_token(&user, self.keys)?;
        Ok(OAuthOutcome {
            user,
            token,
            created,
        })
    }

    /// Logout: release the push token so the device stops receiving
    /// notifications for this account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn logout(&self, user_id: UserId) -> Result<(), AuthError> {
        self.users.clear_fcm_token(user_id).await?;
        Ok(())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update profile fields. Absent fields keep their stored values.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: Option<&str>,
        mobile_number: Option<&str>,
        address: Option<&str>,
    ) -> Result<User, AuthError> {
        self.users
            .update_profile(user_id, name, mobile_number, address)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    /// Delete an account.
    ///
    /// # Returns
    ///
    /// The mirror uid (if the mirror had provisioned this identity) so the
    /// caller can enqueue the mirror-side delete.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn delete_account(&self, user_id: UserId) -> Result<Option<String>, AuthError> {
        self.users.delete(user_id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough password").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
