//! Submission gateway: attributes a completed form to the signed-in user and
//! writes it to the data store.

use super::error::PersistenceError;
use super::records::{FormationRecord, FORMATIONS_COLLECTION};
use super::traits::{IdentityProvider, PersistenceStore};
use crate::state::FormValue;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Generic message shown for any failed submission
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit business formation. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("you must be signed in to submit")]
    NotSignedIn,
    #[error("could not store the application: {0}")]
    Persistence(#[from] PersistenceError),
}

impl SubmitError {
    /// Text shown to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::NotSignedIn => "You must be signed in to submit an application.",
            SubmitError::Persistence(_) => SUBMIT_FAILED_MESSAGE,
        }
    }
}

/// Writes completed applications through the persistence store
#[derive(Clone)]
pub struct SubmissionGateway {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn PersistenceStore>,
}

impl SubmissionGateway {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn PersistenceStore>) -> Self {
        Self { identity, store }
    }

    /// Store `value` as a pending application owned by the current user.
    ///
    /// `submission_id` becomes the record id. A retry that hits an already
    /// stored id is treated as success, so one wizard session yields at most
    /// one row.
    pub async fn submit(
        &self,
        value: &FormValue,
        submission_id: Uuid,
    ) -> Result<FormationRecord, SubmitError> {
        let user_id = self
            .identity
            .current_user_id()
            .await
            .ok_or(SubmitError::NotSignedIn)?;

        let record = FormationRecord::pending(value, user_id, submission_id);

        match self.store.insert(FORMATIONS_COLLECTION, &record).await {
            Ok(stored) => {
                tracing::info!(%submission_id, "Business formation submitted");
                Ok(stored)
            }
            Err(PersistenceError::Duplicate) => {
                tracing::info!(%submission_id, "Submission already stored, treating retry as success");
                Ok(record)
            }
            Err(err) => {
                tracing::error!(%submission_id, "Error submitting form: {err}");
                Err(err.into())
            }
        }
    }
}
