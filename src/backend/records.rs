//! Records exchanged with the hosted backend

use crate::state::{EntityType, Expedite, FormValue, Owner, Signature};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an authenticated user
pub type UserId = String;

/// Collection formation applications are written to
pub const FORMATIONS_COLLECTION: &str = "business_formations";

/// Processing status of a stored application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormationStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Rejected,
}

/// Row of the `business_formations` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationRecord {
    /// Client-minted submission id, reused when an unchanged form is retried
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub entity_name: String,
    pub entity_address: String,
    pub service_product_offered: String,
    pub entity_type: EntityType,
    pub expedite: Expedite,
    pub owners: Vec<Owner>,
    pub signatures: Vec<Signature>,
    pub user_id: UserId,
    pub status: FormationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FormationRecord {
    /// Build a pending record for `value` owned by `user_id`
    pub fn pending(value: &FormValue, user_id: UserId, id: Uuid) -> Self {
        Self {
            id: Some(id),
            entity_name: value.entity_name.clone(),
            entity_address: value.entity_address.clone(),
            service_product_offered: value.service_product_offered.clone(),
            entity_type: value.entity_type,
            expedite: value.expedite,
            owners: value.owners.clone(),
            signatures: value.signatures.clone(),
            user_id,
            status: FormationStatus::Pending,
            created_at: None,
        }
    }
}

/// Signed-in identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub access_token: String,
}

/// Result of asking the identity provider to register a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpResponse {
    pub user_id: UserId,
    /// Present when the provider signed the user in right away
    pub session: Option<Session>,
    /// The email was already registered; the provider sends a confirmation instead
    pub already_registered: bool,
}

/// Body of `POST /api/create-user`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserRecord {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
}

/// Row of the `users` collection as returned by the user-record endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
