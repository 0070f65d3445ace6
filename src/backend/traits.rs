//! Trait abstraction for the hosted backend to enable mocking in tests

use super::error::{AuthError, PersistenceError};
use super::records::{FormationRecord, NewUserRecord, Session, SignUpResponse, UserId, UserProfile};
use async_trait::async_trait;

/// Identity provider holding the signed-in session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Id of the signed-in user, if any
    async fn current_user_id(&self) -> Option<UserId>;

    /// Register a new user
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, AuthError>;

    /// Sign in with email and password
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Remove a user, used to roll back a half-finished sign-up
    async fn delete_user(&self, user_id: &str) -> Result<(), AuthError>;

    /// Forget the current session
    async fn sign_out(&self);
}

/// Remote data store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Insert one record and return the stored row
    async fn insert(
        &self,
        collection: &str,
        record: &FormationRecord,
    ) -> Result<FormationRecord, PersistenceError>;
}

/// Endpoint creating the application's own user record after sign-up
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn create_user(&self, user: &NewUserRecord) -> Result<UserProfile, PersistenceError>;
}
