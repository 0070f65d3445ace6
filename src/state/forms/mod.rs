//! Form domain layer
//!
//! The formation application value, its field paths, the validation rule
//! tables, the step table and the wizard controller driving them. The
//! sign-in form lives here too.

mod auth_form;
mod field;
mod model;
mod path;
mod schema;
mod steps;
mod wizard;

pub use auth_form::{AuthForm, AuthMode, Form};
pub use field::FormField;
pub use model::{EntityType, Expedite, FormValue, Owner, Signature};
pub use path::{FieldKind, FieldPath};
pub use steps::{Step, STEPS, TOTAL_STEPS};
pub use wizard::{Advance, FormationWizard, SubmitBlocked, SubmitOutcome, WizardStatus};

#[cfg(test)]
pub use path::OwnerField;
