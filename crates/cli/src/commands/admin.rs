//! Admin user management command.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use shoebox_core::Email;

use super::{CommandError, connect};

/// Create an admin user, or promote an existing user with this email.
///
/// # Errors
///
/// Returns `CommandError::InvalidInput` for a malformed email or a failed
/// password hash, `CommandError::Database` for database failures.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let email =
        Email::parse(email).map_err(|e| CommandError::InvalidInput(format!("email: {e}")))?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CommandError::InvalidInput(format!("password hash: {e}")))?
        .to_string();

    let pool = connect().await?;

    sqlx::query(
        "INSERT INTO users (name, email, password_hash, role)
         VALUES ($1, $2, $3, 'admin')
         ON CONFLICT (email)
         DO UPDATE SET role = 'admin', updated_at = now()",
    )
    .bind(name)
    .bind(email.as_str())
    .bind(&password_hash)
    .execute(&pool)
    .await?;

    tracing::info!(email = %email, "admin user ready");
    Ok(())
}
