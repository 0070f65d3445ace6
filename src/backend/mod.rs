//! Backend module: hosted auth/data API client and the services built on it

mod account;
mod client;
mod error;
mod gateway;
mod records;
mod traits;

pub use account::{AccountService, SignUpOutcome, SignUpRequest};
pub use client::SupabaseClient;
pub use error::PersistenceError;
pub use gateway::{SubmissionGateway, SubmitError};
pub use records::{FormationRecord, Session};
pub use traits::{IdentityProvider, PersistenceStore, UserDirectory};

#[cfg(test)]
pub use error::AuthError;
#[cfg(test)]
pub use gateway::SUBMIT_FAILED_MESSAGE;
#[cfg(test)]
pub use records::{FormationStatus, SignUpResponse, UserProfile};
#[cfg(test)]
pub use traits::{MockIdentityProvider, MockPersistenceStore, MockUserDirectory};
