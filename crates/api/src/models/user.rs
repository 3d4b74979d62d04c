//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shoebox_core::{Email, UserId, UserRole, UserStatus};

/// A storefront user (domain type).
///
/// The canonical record. The identity mirror only ever holds a projection of
/// this; `mirror_uid` is filled in by the mirror worker once provisioning
/// succeeds.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address (unique).
    pub email: Email,
    /// Mirror-assigned identity id, if the mirror has caught up.
    pub mirror_uid: Option<String>,
    /// Google account id for OAuth-linked users.
    pub google_id: Option<String>,
    /// Profile photo URL.
    pub photo_url: Option<String>,
    /// Permission level.
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
    /// Push-notification token. Unique across all users while held.
    #[serde(skip_serializing)]
    pub fcm_token: Option<String>,
    /// Contact number.
    pub mobile_number: Option<String>,
    /// Shipping address.
    pub address: Option<String>,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user through password signup.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
}

/// Profile data from an OAuth provider (or a partial offline sync).
///
/// `google_id` and `photo_url` are merged into an existing user only where
/// the existing values are absent.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub name: String,
    pub email: Email,
    pub google_id: Option<String>,
    pub photo_url: Option<String>,
}
