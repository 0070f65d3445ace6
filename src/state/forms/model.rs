//! Business formation form value and its parts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of entity being formed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntityType {
    #[default]
    #[serde(rename = "LLC")]
    Llc,
    #[serde(rename = "S-CORP")]
    SCorp,
    #[serde(rename = "C-CORP")]
    CCorp,
}

impl EntityType {
    pub const ALL: [EntityType; 3] = [EntityType::Llc, EntityType::SCorp, EntityType::CCorp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llc => "LLC",
            Self::SCorp => "S-CORP",
            Self::CCorp => "C-CORP",
        }
    }

    /// Cycle to the next entity type (wraps around)
    pub fn next(&self) -> Self {
        match self {
            Self::Llc => Self::SCorp,
            Self::SCorp => Self::CCorp,
            Self::CCorp => Self::Llc,
        }
    }

    /// Cycle to the previous entity type (wraps around)
    pub fn prev(&self) -> Self {
        match self {
            Self::Llc => Self::CCorp,
            Self::SCorp => Self::Llc,
            Self::CCorp => Self::SCorp,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Entity type must be one of LLC, S-CORP, C-CORP (got {s:?})"))
    }
}

/// Expedited processing option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Expedite {
    #[serde(rename = "YES")]
    Yes,
    #[default]
    #[serde(rename = "NO")]
    No,
}

impl Expedite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    /// Human readable description shown next to the option
    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "Yes (+$100 + 3% processing fee, 24HR turnaround)",
            Self::No => "No (regular processing: 7-10 business days)",
        }
    }
}

impl fmt::Display for Expedite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Expedite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Ok(Self::Yes),
            "NO" => Ok(Self::No),
            _ => Err(format!("Expedite must be YES or NO (got {s:?})")),
        }
    }
}

/// A natural person owning part of the entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Tax id, collected for the responsible party
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssn: Option<String>,
    /// Date of birth, collected for the responsible party
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default)]
    pub responsible_party: bool,
    /// 1-based position in the owner list
    pub owner_number: u32,
}

impl Owner {
    /// The first owner, who carries the tax identification obligations
    pub fn responsible_party() -> Self {
        Self {
            ssn: Some(String::new()),
            dob: Some(String::new()),
            responsible_party: true,
            owner_number: 1,
            ..Default::default()
        }
    }

    /// An additional owner with the given 1-based number
    pub fn additional(owner_number: u32) -> Self {
        Self {
            owner_number,
            ..Default::default()
        }
    }

    /// Heading used when listing owners
    pub fn heading(&self) -> String {
        if self.owner_number <= 1 {
            "Primary Owner (Responsible Party)".to_string()
        } else {
            format!("Additional Owner {}", self.owner_number)
        }
    }
}

/// Attestation signed by one owner
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub sign_here: String,
    pub date: String,
    /// 1-based signer position, matching the owner it belongs to
    pub signer_number: u32,
}

impl Signature {
    pub fn new(signer_number: u32) -> Self {
        Self {
            signer_number,
            ..Default::default()
        }
    }
}

/// The complete in-progress business formation application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValue {
    pub entity_name: String,
    pub entity_address: String,
    pub service_product_offered: String,
    pub entity_type: EntityType,
    pub expedite: Expedite,
    pub owners: Vec<Owner>,
    pub signatures: Vec<Signature>,
    pub preparer_acknowledged: bool,
}

impl Default for FormValue {
    fn default() -> Self {
        Self {
            entity_name: String::new(),
            entity_address: String::new(),
            service_product_offered: String::new(),
            entity_type: EntityType::default(),
            expedite: Expedite::default(),
            owners: vec![Owner::responsible_party()],
            signatures: vec![Signature::new(1)],
            preparer_acknowledged: false,
        }
    }
}

impl FormValue {
    /// Append a new owner and, when missing, the signature slot that goes with it.
    /// Returns the number given to the new owner.
    pub fn add_owner(&mut self) -> u32 {
        let owner_number = self.owners.len() as u32 + 1;
        self.owners.push(Owner::additional(owner_number));
        while self.signatures.len() < self.owners.len() {
            let signer_number = self.signatures.len() as u32 + 1;
            self.signatures.push(Signature::new(signer_number));
        }
        owner_number
    }
}
