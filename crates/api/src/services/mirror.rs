//! Identity mirror worker.
//!
//! The local `users` table is the canonical identity store; an external
//! identity provider holds a mirrored projection so mobile clients can use
//! its SDKs. Mirror writes happen off the request path: services enqueue a
//! job, a background worker retries it until the mirror converges, and the
//! mirror-assigned uid is written back to `users.mirror_uid` on success.
//!
//! Jobs are idempotent. Upserts key on the local user id, deletes treat a
//! missing remote identity as already done, so redelivery after a crash or
//! retry storm is harmless.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

use shoebox_core::UserId;

use crate::db::users::UserRepository;

/// Attempts per job before giving up.
const MAX_ATTEMPTS: u32 = 5;

/// Base backoff, doubled per attempt.
const BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Errors from the mirror HTTP client.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Transport-level failure.
    #[error("mirror request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The mirror answered with an unexpected status.
    #[error("mirror returned {0}")]
    UnexpectedStatus(StatusCode),
}

/// A unit of mirror work.
#[derive(Debug, Clone)]
pub enum MirrorJob {
    /// Create or refresh the mirrored identity for a local user.
    Upsert {
        user_id: UserId,
        email: String,
        display_name: String,
        photo_url: Option<String>,
    },
    /// Remove a mirrored identity after the local account was deleted.
    Delete { mirror_uid: String },
}

/// Handle for enqueueing mirror jobs.
///
/// Cheap to clone. When the mirror is not configured the handle swallows
/// jobs with a debug log, so callers never branch on deployment shape.
#[derive(Clone)]
pub struct MirrorHandle {
    tx: Option<mpsc::UnboundedSender<MirrorJob>>,
}

impl MirrorHandle {
    /// A handle that drops every job (mirror not configured).
    #[must_use]
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    /// Enqueue a job. Never blocks and never fails the request path.
    pub fn enqueue(&self, job: MirrorJob) {
        match &self.tx {
            Some(tx) => {
                if tx.send(job).is_err() {
                    tracing::error!("mirror worker is gone, dropping job");
                }
            }
            None => tracing::debug!("identity mirror disabled, dropping job"),
        }
    }
}

/// HTTP client for the identity mirror API.
#[derive(Clone)]
pub struct MirrorClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

#[derive(Serialize)]
struct UpsertIdentityRequest<'a> {
    external_id: String,
    email: &'a str,
    display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
}

#[derive(Deserialize)]
struct UpsertIdentityResponse {
    uid: String,
}

impl MirrorClient {
    /// Create a new mirror client.
    #[must_use]
    pub fn new(base_url: Url, api_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Create or refresh a mirrored identity, returning the mirror uid.
    ///
    /// Keyed on the local user id, so repeating the call converges on the
    /// same remote identity.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError` on transport failure or a non-success status.
    pub async fn upsert_identity(
        &self,
        user_id: UserId,
        email: &str,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<String, MirrorError> {
        let url = self.endpoint("v1/identities");
        let response = self
            .http
            .put(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&UpsertIdentityRequest {
                external_id: user_id.to_string(),
                email,
                display_name,
                photo_url,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MirrorError::UnexpectedStatus(response.status()));
        }

        let body: UpsertIdentityResponse = response.json().await?;
        Ok(body.uid)
    }

    /// Delete a mirrored identity. A missing identity counts as success.
    ///
    /// # Errors
    ///
    /// Returns `MirrorError` on transport failure or a non-success status
    /// other than 404.
    pub async fn delete_identity(&self, mirror_uid: &str) -> Result<(), MirrorError> {
        let url = self.endpoint(&format!("v1/identities/{mirror_uid}"));
        let response = self
            .http
            .delete(url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(MirrorError::UnexpectedStatus(status))
        }
    }

    fn endpoint(&self, path: &str) -> Url {
        // join() only fails on a malformed base, which config validation
        // already rejected.
        self.base_url.join(path).unwrap_or_else(|_| self.base_url.clone())
    }
}

/// Spawn the mirror worker and return its enqueue handle.
///
/// The worker owns the receiving end of the queue and exits when every
/// handle has been dropped.
#[must_use]
pub fn spawn_mirror_worker(pool: PgPool, client: MirrorClient) -> MirrorHandle {
    let (tx, mut rx) = mpsc::unbounded_channel::<MirrorJob>();

    tokio::spawn(async move {
        tracing::info!("identity mirror worker started");
        while let Some(job) = rx.recv().await {
            run_job_with_retries(&pool, &client, job).await;
        }
        tracing::info!("identity mirror worker stopped");
    });

    MirrorHandle { tx: Some(tx) }
}

/// Run one job to completion or exhaustion.
async fn run_job_with_retries(pool: &PgPool, client: &MirrorClient, job: MirrorJob) {
    for attempt in 1..=MAX_ATTEMPTS {
        match run_job(pool, client, &job).await {
            Ok(()) => return,
            Err(e) if attempt < MAX_ATTEMPTS => {
                let backoff = BACKOFF_BASE * 2u32.pow(attempt - 1);
                tracing::warn!(
                    error = %e,
                    attempt,
                    backoff_secs = backoff.as_secs(),
                    "mirror job failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "mirror job failed permanently");
                sentry::capture_error(&e);
            }
        }
    }
}

async fn run_job(pool: &PgPool, client: &MirrorClient, job: &MirrorJob) -> Result<(), MirrorError> {
    match job {
        MirrorJob::Upsert {
            user_id,
            email,
            display_name,
            photo_url,
        } => {
            let uid = client
                .upsert_identity(*user_id, email, display_name, photo_url.as_deref())
                .await?;

            // The user may have been deleted while the job was queued; a
            // zero-row update is fine, the delete job handles the mirror.
            if let Err(e) = UserRepository::new(pool).set_mirror_uid(*user_id, &uid).await {
                tracing::warn!(error = %e, user_id = %user_id, "failed to record mirror uid");
            }

            tracing::debug!(user_id = %user_id, "mirrored identity upserted");
            Ok(())
        }
        MirrorJob::Delete { mirror_uid } => {
            client.delete_identity(mirror_uid).await?;
            tracing::debug!("mirrored identity deleted");
            Ok(())
        }
    }
}

/// Build an upsert job from a user record.
#[must_use]
pub fn upsert_job_for(user: &crate::models::user::User) -> MirrorJob {
    MirrorJob::Upsert {
        user_id: user.id,
        email: user.email.as_str().to_owned(),
        display_name: user.name.clone(),
        photo_url: user.photo_url.clone(),
    }
}
