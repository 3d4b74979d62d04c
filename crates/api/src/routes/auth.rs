//! Authentication and account route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shoebox_core::{Email, UserId};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::user::{OAuthProfile, User};
use crate::services::auth::{AuthService, SignupInput};
use crate::services::mirror::{MirrorJob, upsert_job_for};
use crate::state::AppState;

/// Body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Device push token, rotated onto this account on success.
    pub fcm_token: Option<String>,
}

/// Body for `POST /auth/oauth` and `POST /auth/sync`.
#[derive(Debug, Deserialize)]
pub struct OAuthRequest {
    pub name: String,
    pub email: String,
    pub google_id: Option<String>,
    pub photo_url: Option<String>,
    pub fcm_token: Option<String>,
}

/// Body for `PUT /auth/me`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<String>,
}

/// Successful auth response: the session token plus the user record.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// `POST /auth/signup` - register with email and password.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let auth = AuthService::new(state.pool(), state.jwt_keys());

    let (user, token) = auth
        .signup(SignupInput {
            name: body.name,
            email: body.email,
            password: body.password,
            mobile_number: body.mobile_number,
            address: body.address,
        })
        .await?;

    state.mirror().enqueue(upsert_job_for(&user));
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// `POST /auth/login` - login with email and password.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool(), state.jwt_keys());

    let (user, token) = auth
        .login(&body.email, &body.password, body.fcm_token.as_deref())
        .await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(AuthResponse { token, user }))
}

/// `POST /auth/oauth` - login (or register) through a Google profile.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn oauth(
    State(state): State<AppState>,
    Json(body): Json<OAuthRequest>,
) -> Result<Json<AuthResponse>> {
    oauth_inner(state, body).await
}

/// `POST /auth/sync` - relaxed find-or-create for partial profiles.
///
/// Same reconciliation as `/auth/oauth`; clients that only hold a name and
/// email use this path. A missing `google_id` simply skips that match step.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn sync(
    State(state): State<AppState>,
    Json(body): Json<OAuthRequest>,
) -> Result<Json<AuthResponse>> {
    oauth_inner(state, body).await
}

async fn oauth_inner(state: AppState, body: OAuthRequest) -> Result<Json<AuthResponse>> {
    let email = Email::parse(&body.email)
        .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;

    let auth = AuthService::new(state.pool(), state.jwt_keys());
    let outcome = auth
        .oauth_login(
            OAuthProfile {
                name: body.name,
                email,
                google_id: body.google_id,
                photo_url: body.photo_url,
            },
            body.fcm_token.as_deref(),
        )
        .await?;

    if outcome.created {
        state.mirror().enqueue(upsert_job_for(&outcome.user));
    }
    set_sentry_user(&outcome.user.id, Some(outcome.user.email.as_str()));

    Ok(Json(AuthResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}

/// `POST /auth/logout` - release the caller's push token.
#[instrument(skip(state, user))]
pub async fn logout(State(state): State<AppState>, user: CurrentUser) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool(), state.jwt_keys());
    auth.logout(user.user_id()).await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me` - the caller's own account record.
#[instrument(skip(state, user))]
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<User>> {
    let auth = AuthService::new(state.pool(), state.jwt_keys());
    Ok(Json(auth.get_user(user.user_id()).await?))
}

/// `PUT /auth/me` - update profile fields.
#[instrument(skip(state, user, body))]
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let auth = AuthService::new(state.pool(), state.jwt_keys());
    let updated = auth
        .update_profile(
            user.user_id(),
            body.name.as_deref(),
            body.mobile_number.as_deref(),
            body.address.as_deref(),
        )
        .await?;

    Ok(Json(updated))
}

/// `DELETE /users/{id}` - delete an account (admin).
///
/// The mirrored identity, when one was provisioned, is cleaned up by the
/// mirror worker.
#[instrument(skip(state, _admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    axum::extract::Path(id): axum::extract::Path<i32>,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool(), state.jwt_keys());
    let mirror_uid = auth.delete_account(UserId::new(id)).await?;

    if let Some(mirror_uid) = mirror_uid {
        state.mirror().enqueue(MirrorJob::Delete { mirror_uid });
    }

    Ok(StatusCode::NO_CONTENT)
}
