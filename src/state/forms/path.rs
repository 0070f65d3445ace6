//! Field paths addressing values inside a [`FormValue`]

use super::model::FormValue;
use std::fmt;

/// Field of an owner entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OwnerField {
    FullName,
    Address,
    Phone,
    Email,
    Ssn,
    Dob,
}

impl OwnerField {
    /// Fields shown for every owner
    pub const COMMON: [OwnerField; 4] = [
        OwnerField::FullName,
        OwnerField::Address,
        OwnerField::Phone,
        OwnerField::Email,
    ];

    /// Fields collected only for the responsible party
    pub const RESPONSIBLE_PARTY: [OwnerField; 2] = [OwnerField::Ssn, OwnerField::Dob];

    pub fn key(&self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Ssn => "ssn",
            Self::Dob => "dob",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Address => "Address",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::Ssn => "SSN",
            Self::Dob => "Date of Birth (YYYY-MM-DD)",
        }
    }
}

/// Field of a signature entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignatureField {
    SignHere,
    Date,
}

impl SignatureField {
    pub const ALL: [SignatureField; 2] = [SignatureField::SignHere, SignatureField::Date];

    pub fn key(&self) -> &'static str {
        match self {
            Self::SignHere => "signHere",
            Self::Date => "date",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SignHere => "Signature (type your full name)",
            Self::Date => "Date (YYYY-MM-DD)",
        }
    }
}

/// Path to a field of the form value.
///
/// `Owners` and `Signatures` name whole collections and cover every entry
/// inside them; `Owner` and `Signature` name a single field of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldPath {
    EntityName,
    EntityAddress,
    ServiceProductOffered,
    EntityType,
    Expedite,
    Owners,
    Owner(usize, OwnerField),
    PreparerAcknowledged,
    Signatures,
    Signature(usize, SignatureField),
}

/// How a field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text input
    Text,
    /// Fixed set of options cycled with arrow keys or space
    Choice,
    /// Boolean toggled with space
    Checkbox,
    /// A collection, not directly editable
    Collection,
}

impl FieldPath {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::EntityType | Self::Expedite => FieldKind::Choice,
            Self::PreparerAcknowledged => FieldKind::Checkbox,
            Self::Owners | Self::Signatures => FieldKind::Collection,
            _ => FieldKind::Text,
        }
    }

    /// Whether `self` names `other` or a collection containing it
    #[cfg(test)]
    pub fn covers(&self, other: &FieldPath) -> bool {
        match (self, other) {
            (Self::Owners, Self::Owner(..)) => true,
            (Self::Signatures, Self::Signature(..)) => true,
            _ => self == other,
        }
    }

    /// Whether the field value may be multi-line
    pub fn is_multiline(&self) -> bool {
        matches!(
            self,
            Self::EntityAddress | Self::Owner(_, OwnerField::Address)
        )
    }

    pub fn label(&self) -> String {
        match self {
            Self::EntityName => "Entity Name".to_string(),
            Self::EntityAddress => "Entity Address".to_string(),
            Self::ServiceProductOffered => "Service/Product Offered".to_string(),
            Self::EntityType => "Entity Type".to_string(),
            Self::Expedite => "Expedite Processing (24HR TURNAROUND)".to_string(),
            Self::Owners => "Owners".to_string(),
            Self::Owner(_, field) => field.label().to_string(),
            Self::PreparerAcknowledged => {
                "I acknowledge that I have reviewed the preparer information and fee details"
                    .to_string()
            }
            Self::Signatures => "Signatures".to_string(),
            Self::Signature(_, field) => field.label().to_string(),
        }
    }

    /// Current value rendered as text
    pub fn display_value(&self, value: &FormValue) -> String {
        match self {
            Self::EntityType => value.entity_type.to_string(),
            Self::Expedite => value.expedite.label().to_string(),
            Self::PreparerAcknowledged => {
                if value.preparer_acknowledged {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
            Self::Owners => format!("{} owner(s)", value.owners.len()),
            Self::Signatures => format!("{} signature(s)", value.signatures.len()),
            _ => self.text(value).unwrap_or_default().to_string(),
        }
    }

    /// Borrow the text behind a text field
    pub fn text<'a>(&self, value: &'a FormValue) -> Option<&'a str> {
        match self {
            Self::EntityName => Some(&value.entity_name),
            Self::EntityAddress => Some(&value.entity_address),
            Self::ServiceProductOffered => Some(&value.service_product_offered),
            Self::Owner(index, field) => {
                let owner = value.owners.get(*index)?;
                match field {
                    OwnerField::FullName => Some(&owner.full_name),
                    OwnerField::Address => Some(&owner.address),
                    OwnerField::Phone => Some(&owner.phone),
                    OwnerField::Email => Some(&owner.email),
                    OwnerField::Ssn => Some(owner.ssn.as_deref().unwrap_or("")),
                    OwnerField::Dob => Some(owner.dob.as_deref().unwrap_or("")),
                }
            }
            Self::Signature(index, field) => {
                let signature = value.signatures.get(*index)?;
                match field {
                    SignatureField::SignHere => Some(&signature.sign_here),
                    SignatureField::Date => Some(&signature.date),
                }
            }
            _ => None,
        }
    }

    /// Mutably borrow the text behind a text field
    pub fn text_mut<'a>(&self, value: &'a mut FormValue) -> Option<&'a mut String> {
        match self {
            Self::EntityName => Some(&mut value.entity_name),
            Self::EntityAddress => Some(&mut value.entity_address),
            Self::ServiceProductOffered => Some(&mut value.service_product_offered),
            Self::Owner(index, field) => {
                let owner = value.owners.get_mut(*index)?;
                match field {
                    OwnerField::FullName => Some(&mut owner.full_name),
                    OwnerField::Address => Some(&mut owner.address),
                    OwnerField::Phone => Some(&mut owner.phone),
                    OwnerField::Email => Some(&mut owner.email),
                    OwnerField::Ssn => Some(owner.ssn.get_or_insert_with(String::new)),
                    OwnerField::Dob => Some(owner.dob.get_or_insert_with(String::new)),
                }
            }
            Self::Signature(index, field) => {
                let signature = value.signatures.get_mut(*index)?;
                match field {
                    SignatureField::SignHere => Some(&mut signature.sign_here),
                    SignatureField::Date => Some(&mut signature.date),
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityName => f.write_str("entityName"),
            Self::EntityAddress => f.write_str("entityAddress"),
            Self::ServiceProductOffered => f.write_str("serviceProductOffered"),
            Self::EntityType => f.write_str("entityType"),
            Self::Expedite => f.write_str("expedite"),
            Self::Owners => f.write_str("owners"),
            Self::Owner(index, field) => write!(f, "owners.{index}.{}", field.key()),
            Self::PreparerAcknowledged => f.write_str("preparerAcknowledged"),
            Self::Signatures => f.write_str("signatures"),
            Self::Signature(index, field) => write!(f, "signatures.{index}.{}", field.key()),
        }
    }
}
