//! Sign-up and sign-in orchestration
//!
//! Sign-up spans two remote systems: the identity provider and the
//! application's user-record endpoint. When the second step fails the
//! freshly created identity is deleted again so the user can retry with the
//! same email.

use super::error::{AuthError, PersistenceError};
use super::records::{NewUserRecord, Session};
use super::traits::{IdentityProvider, UserDirectory};
use std::sync::Arc;
use thiserror::Error;

/// Minimum password length accepted before contacting the provider
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignUpError {
    /// Rejected locally before any remote call
    #[error("{0}")]
    Invalid(&'static str),
    /// Rejected by the identity provider
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The user record could not be created; the identity was rolled back
    #[error("Failed to create user profile")]
    Profile(#[source] PersistenceError),
}

/// How a successful sign-up ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// The provider wants the email confirmed before the first sign-in
    ConfirmationRequired,
}

/// Values entered on the sign-up screen
#[derive(Debug, Clone, Copy)]
pub struct SignUpRequest<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

impl SignUpRequest<'_> {
    fn check(&self) -> Result<(), SignUpError> {
        if self.password != self.confirm_password {
            return Err(SignUpError::Invalid("Passwords do not match"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SignUpError::Invalid(
                "Password must be at least 8 characters",
            ));
        }
        if self.full_name.trim().is_empty() {
            return Err(SignUpError::Invalid("Full name is required"));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AccountService {
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn UserDirectory>,
}

impl AccountService {
    pub fn new(identity: Arc<dyn IdentityProvider>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            identity,
            directory,
        }
    }

    pub async fn sign_up(&self, request: SignUpRequest<'_>) -> Result<SignUpOutcome, SignUpError> {
        request.check()?;

        let email = request.email.trim();
        let response = self.identity.sign_up(email, request.password).await?;

        if response.already_registered {
            tracing::info!("Sign-up for an already registered email, confirmation sent");
            return Ok(SignUpOutcome::ConfirmationRequired);
        }

        let user = NewUserRecord {
            id: response.user_id.clone(),
            email: email.to_string(),
            full_name: request.full_name.trim().to_string(),
        };

        if let Err(err) = self.directory.create_user(&user).await {
            tracing::error!(user_id = %user.id, "Failed to create user profile: {err}");
            if let Err(rollback) = self.identity.delete_user(&user.id).await {
                tracing::error!(user_id = %user.id, "Rolling back identity failed: {rollback}");
            } else {
                tracing::warn!(user_id = %user.id, "Rolled back identity after profile failure");
            }
            return Err(SignUpError::Profile(err));
        }

        if let Some(session) = response.session {
            tracing::info!(user_id = %session.user_id, "Signed up and signed in");
            return Ok(SignUpOutcome::SignedIn(session));
        }

        // No session yet: try signing in directly, the provider may not require confirmation.
        match self.identity.sign_in(email, request.password).await {
            Ok(session) => Ok(SignUpOutcome::SignedIn(session)),
            Err(err) => {
                tracing::info!("Sign-in after sign-up not possible yet: {err}");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.identity.sign_in(email.trim(), password).await?;
        tracing::info!(user_id = %session.user_id, "Signed in");
        Ok(session)
    }

    pub async fn sign_out(&self) {
        self.identity.sign_out().await;
    }
}
