//! Declarative validation rules for the formation form
//!
//! Rules live in static tables keyed by field path and are interpreted by
//! [`validate`], a pure function over a [`FormValue`]. Validation is always
//! scoped to the requested paths so unfilled later steps never block earlier
//! ones.

use super::model::FormValue;
use super::path::{FieldPath, OwnerField, SignatureField};
use std::collections::BTreeMap;
use thiserror::Error;

/// A single check applied to a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Text must contain something other than whitespace
    Required,
    /// Text must be at least this many characters long
    MinLength(usize),
    /// Text must look like an email address
    Email,
    /// Text must be one of the listed options
    OneOf(&'static [&'static str]),
    /// Flag must be set
    Accepted,
    /// Collection must hold at least this many entries
    MinItems(usize),
}

/// Value a check is applied to
#[derive(Debug, Clone, Copy)]
enum Subject<'a> {
    Text(&'a str),
    Flag(bool),
    Count(usize),
}

impl Check {
    fn passes(&self, subject: Subject<'_>) -> bool {
        match (self, subject) {
            (Check::Required, Subject::Text(s)) => !s.trim().is_empty(),
            (Check::MinLength(min), Subject::Text(s)) => s.chars().count() >= *min,
            (Check::Email, Subject::Text(s)) => is_valid_email(s),
            (Check::OneOf(options), Subject::Text(s)) => options.contains(&s),
            (Check::Accepted, Subject::Flag(flag)) => flag,
            (Check::MinItems(min), Subject::Count(n)) => n >= *min,
            _ => false,
        }
    }
}

/// Which owners an owner rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applies {
    EveryOwner,
    /// Only the first owner, who is the responsible party
    ResponsibleParty,
}

struct Rule {
    path: FieldPath,
    check: Check,
    message: &'static str,
}

struct OwnerRule {
    field: OwnerField,
    check: Check,
    applies: Applies,
    message: &'static str,
}

struct SignatureRule {
    field: SignatureField,
    check: Check,
    message: &'static str,
}

const ENTITY_TYPES: &[&str] = &["LLC", "S-CORP", "C-CORP"];
const EXPEDITE_OPTIONS: &[&str] = &["YES", "NO"];

/// Rules for top level fields and collection sizes
const FIELD_RULES: &[Rule] = &[
    Rule {
        path: FieldPath::EntityName,
        check: Check::Required,
        message: "Entity name is required",
    },
    Rule {
        path: FieldPath::EntityAddress,
        check: Check::Required,
        message: "Entity address is required",
    },
    Rule {
        path: FieldPath::ServiceProductOffered,
        check: Check::Required,
        message: "Service/product offered is required",
    },
    Rule {
        path: FieldPath::EntityType,
        check: Check::OneOf(ENTITY_TYPES),
        message: "Entity type must be LLC, S-CORP or C-CORP",
    },
    Rule {
        path: FieldPath::Expedite,
        check: Check::OneOf(EXPEDITE_OPTIONS),
        message: "Expedite must be YES or NO",
    },
    Rule {
        path: FieldPath::Owners,
        check: Check::MinItems(1),
        message: "At least one owner is required",
    },
    Rule {
        path: FieldPath::Signatures,
        check: Check::MinItems(1),
        message: "At least one signature is required",
    },
    Rule {
        path: FieldPath::PreparerAcknowledged,
        check: Check::Accepted,
        message: "You must acknowledge the preparer information",
    },
];

const OWNER_RULES: &[OwnerRule] = &[
    OwnerRule {
        field: OwnerField::FullName,
        check: Check::Required,
        applies: Applies::EveryOwner,
        message: "Full name is required",
    },
    OwnerRule {
        field: OwnerField::Address,
        check: Check::Required,
        applies: Applies::EveryOwner,
        message: "Address is required",
    },
    OwnerRule {
        field: OwnerField::Phone,
        check: Check::MinLength(10),
        applies: Applies::EveryOwner,
        message: "Valid phone number is required",
    },
    OwnerRule {
        field: OwnerField::Email,
        check: Check::Email,
        applies: Applies::EveryOwner,
        message: "Valid email is required",
    },
    OwnerRule {
        field: OwnerField::Ssn,
        check: Check::MinLength(9),
        applies: Applies::ResponsibleParty,
        message: "Valid SSN is required",
    },
    OwnerRule {
        field: OwnerField::Dob,
        check: Check::Required,
        applies: Applies::ResponsibleParty,
        message: "Date of birth is required",
    },
];

const SIGNATURE_RULES: &[SignatureRule] = &[
    SignatureRule {
        field: SignatureField::SignHere,
        check: Check::Required,
        message: "Signature is required",
    },
    SignatureRule {
        field: SignatureField::Date,
        check: Check::Required,
        message: "Date is required",
    },
];

/// Per-field validation failures, keyed by field path
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{} field(s) failed validation", .fields.len())]
pub struct ValidationErrors {
    fields: BTreeMap<FieldPath, String>,
}

impl ValidationErrors {
    /// Record a message for a field, keeping the first one reported
    pub fn insert(&mut self, path: FieldPath, message: impl Into<String>) {
        self.fields.entry(path).or_insert_with(|| message.into());
    }

    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.fields.get(path).map(String::as_str)
    }

    #[cfg(test)]
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.fields.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.fields.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// First failing field in path order
    #[cfg(test)]
    pub fn first(&self) -> Option<(&FieldPath, &str)> {
        self.iter().next()
    }

    pub fn remove(&mut self, path: &FieldPath) {
        self.fields.remove(path);
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Validate the given paths of `value`.
///
/// Collection paths check the collection size and every entry inside it;
/// entry paths check just that field of that entry.
pub fn validate(value: &FormValue, paths: &[FieldPath]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    for path in paths {
        check_path(value, path, &mut errors);
    }
    errors.into_result()
}

fn check_path(value: &FormValue, path: &FieldPath, errors: &mut ValidationErrors) {
    for rule in FIELD_RULES.iter().filter(|r| r.path == *path) {
        let subject = match path {
            FieldPath::EntityType => Subject::Text(value.entity_type.as_str()),
            FieldPath::Expedite => Subject::Text(value.expedite.as_str()),
            FieldPath::Owners => Subject::Count(value.owners.len()),
            FieldPath::Signatures => Subject::Count(value.signatures.len()),
            FieldPath::PreparerAcknowledged => Subject::Flag(value.preparer_acknowledged),
            other => Subject::Text(other.text(value).unwrap_or("")),
        };
        if !rule.check.passes(subject) {
            errors.insert(*path, rule.message);
        }
    }

    match path {
        FieldPath::Owners => {
            for index in 0..value.owners.len() {
                for field in OwnerField::COMMON
                    .iter()
                    .chain(OwnerField::RESPONSIBLE_PARTY.iter())
                {
                    check_owner_field(value, index, *field, errors);
                }
            }
        }
        FieldPath::Owner(index, field) => check_owner_field(value, *index, *field, errors),
        FieldPath::Signatures => {
            for index in 0..value.signatures.len() {
                for field in SignatureField::ALL {
                    check_signature_field(value, index, field, errors);
                }
            }
        }
        FieldPath::Signature(index, field) => {
            check_signature_field(value, *index, *field, errors)
        }
        _ => {}
    }
}

fn check_owner_field(
    value: &FormValue,
    index: usize,
    field: OwnerField,
    errors: &mut ValidationErrors,
) {
    let path = FieldPath::Owner(index, field);
    let Some(text) = path.text(value) else {
        return;
    };
    for rule in OWNER_RULES.iter().filter(|r| r.field == field) {
        if rule.applies == Applies::ResponsibleParty && index != 0 {
            continue;
        }
        if !rule.check.passes(Subject::Text(text)) {
            errors.insert(path, rule.message);
        }
    }
}

fn check_signature_field(
    value: &FormValue,
    index: usize,
    field: SignatureField,
    errors: &mut ValidationErrors,
) {
    let path = FieldPath::Signature(index, field);
    let Some(text) = path.text(value) else {
        return;
    };
    for rule in SIGNATURE_RULES.iter().filter(|r| r.field == field) {
        if !rule.check.passes(Subject::Text(text)) {
            errors.insert(path, rule.message);
        }
    }
}

/// Syntactic email check: one `@`, a non-empty local part and a dotted domain
pub fn is_valid_email(s: &str) -> bool {
    let s = s.trim();
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
