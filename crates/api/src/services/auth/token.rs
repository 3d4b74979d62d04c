//! Stateless session tokens.
//!
//! Every authenticated request carries a signed HS256 bearer token. The
//! token embeds the user id, email, and role so route guards can authorize
//! without a database round trip; the database stays authoritative for
//! anything that must reflect the current account state.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use shoebox_core::{UserId, UserRole};

use super::AuthError;
use crate::models::user::User;

/// Token lifetime. Mobile clients refresh by logging in again.
const TOKEN_TTL_DAYS: i64 = 7;

/// Signing and verification keys derived from the configured session secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Derive keys from the session secret.
    #[must_use]
    pub fn from_secret(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }
}

/// Claims carried in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    /// Email at issue time.
    pub email: String,
    /// Role at issue time.
    pub role: UserRole,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// The user id this token was issued for.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// Issue a session token for a user.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if signing fails (malformed key).
pub fn issue_token(user: &User, keys: &JwtKeys) -> Result<String, AuthError> {
    let exp = chrono::Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS);
    let claims = Claims {
        sub: user.id.as_i32(),
        email: user.email.as_str().to_owned(),
        role: user.role,
        exp: exp.timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding).map_err(|_| AuthError::InvalidToken)
}

/// Verify a session token and return its claims.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` for malformed, mis-signed, or expired
/// tokens. The caller cannot distinguish the three cases.
pub fn verify_token(token: &str, keys: &JwtKeys) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shoebox_core::{Email, UserStatus};

    fn test_user(role: UserRole) -> User {
        User {
            id: UserId::new(42),
            name: "Test User".to_owned(),
            email: Email::parse("user@example.com").unwrap(),
            mirror_uid: None,
            google_id: None,
            photo_url: None,
            role,
            status: UserStatus::Active,
            fcm_token: None,
            mobile_number: None,
            address: None,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_keys() -> JwtKeys {
        JwtKeys::from_secret(&SecretString::from("test-secret-with-enough-entropy-0123"))
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let keys = test_keys();
        let token = issue_token(&test_user(UserRole::User), &keys).unwrap();
        let claims = verify_token(&token, &keys).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.user_id(), UserId::new(42));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = issue_token(&test_user(UserRole::Admin), &test_keys()).unwrap();
        let other = JwtKeys::from_secret(&SecretString::from("a-completely-different-secret-key"));

        assert!(matches!(
            verify_token(&token, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(matches!(
            verify_token("not.a.token", &test_keys()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_admin_role_survives_roundtrip() {
        let keys = test_keys();
        let token = issue_token(&test_user(UserRole::Admin), &keys).unwrap();
        let claims = verify_token(&token, &keys).unwrap();
        assert!(claims.role.is_admin());
    }
}
