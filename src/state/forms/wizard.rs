//! Formation wizard controller
//!
//! Owns the in-progress [`FormValue`] and the navigation state of one
//! fill-out. Every step transition goes through the step table and the
//! validator; the network call of a submission is split into
//! [`FormationWizard::begin_submit`] and [`FormationWizard::finish_submit`]
//! so the caller decides where the request runs.

use super::model::FormValue;
use super::path::{FieldKind, FieldPath};
use super::schema::{validate, ValidationErrors};
use super::steps::{Step, STEPS};
use crate::backend::{FormationRecord, SubmissionGateway, SubmitError};
use thiserror::Error;
use uuid::Uuid;

/// Message shown when the current step has invalid fields
pub const FIX_FIELDS_MESSAGE: &str = "Please fix the highlighted fields";

/// Message shown after a successful submission
pub const SUBMITTED_MESSAGE: &str = "Business formation submitted successfully!";

/// Where the wizard is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStatus {
    #[default]
    Editing,
    /// A submission is in flight; edits and further submits are ignored
    Submitting,
    Submitted,
}

/// Navigation and validation state of one fill-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSession {
    pub step: Step,
    pub status: WizardStatus,
    pub last_validation_passed: bool,
    pub message: Option<String>,
    pub errors: ValidationErrors,
    /// Index into the current step's editable fields
    pub active_field: usize,
    /// Sent as the record id so a retried insert cannot store a second row
    pub submission_id: Uuid,
    /// Form value of the last attempt made with `submission_id`
    pub last_sent: Option<FormValue>,
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            step: Step::default(),
            status: WizardStatus::Editing,
            last_validation_passed: false,
            message: None,
            errors: ValidationErrors::default(),
            active_field: 0,
            submission_id: Uuid::new_v4(),
            last_sent: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.status == WizardStatus::Submitting
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`FormationWizard::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved(Step),
    /// The step has invalid fields, errors are on the session
    Invalid,
    /// The terminal step is valid and the form can be submitted
    ReadyToSubmit,
    /// A submission is in flight or already done
    Busy,
}

/// Why a submission was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("submission is only possible from the last step")]
    NotOnLastStep,
    #[error("a submission is already in progress")]
    InProgress,
    #[error("the application was already submitted")]
    AlreadySubmitted,
    #[error("no submission is in progress")]
    NotStarted,
    #[error("{0:?} has invalid fields")]
    Invalid(Step),
}

/// Snapshot handed to the gateway
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub value: FormValue,
    pub submission_id: Uuid,
}

/// How a submission attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(FormationRecord),
    Failed(SubmitError),
    Blocked(SubmitBlocked),
}

#[derive(Debug, Clone, Default)]
pub struct FormationWizard {
    pub value: FormValue,
    pub session: WizardSession,
}

impl FormationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.session.step
    }

    pub fn status(&self) -> WizardStatus {
        self.session.status
    }

    fn is_editing(&self) -> bool {
        self.session.status == WizardStatus::Editing
    }

    /// Validate the current step and move on when it passes
    pub fn advance(&mut self) -> Advance {
        if !self.is_editing() {
            return Advance::Busy;
        }

        let step = self.session.step;
        if let Err(errors) = validate(&self.value, step.fields()) {
            tracing::warn!(?step, failed = errors.len(), "Step validation failed");
            self.session.errors = errors;
            self.session.last_validation_passed = false;
            self.session.message = Some(FIX_FIELDS_MESSAGE.to_string());
            return Advance::Invalid;
        }

        self.session.errors.clear();
        self.session.last_validation_passed = true;
        match step.next() {
            Some(next) => {
                tracing::info!(from = ?step, to = ?next, "Advanced wizard step");
                self.session.step = next;
                self.session.active_field = 0;
                self.session.message = None;
                Advance::Moved(next)
            }
            None => Advance::ReadyToSubmit,
        }
    }

    /// Go back one step without validating
    pub fn retreat(&mut self) {
        if !self.is_editing() {
            return;
        }
        self.session.step = self.session.step.prev();
        self.session.active_field = 0;
        self.session.errors.clear();
        self.session.message = None;
    }

    /// Append an owner and its signature slot, returning the owner's number
    pub fn add_owner(&mut self) -> Option<u32> {
        if !self.is_editing() {
            return None;
        }
        let number = self.value.add_owner();
        tracing::info!(owner_number = number, "Added owner");
        Some(number)
    }

    /// Check every step and enter the submitting state.
    ///
    /// On failure the wizard jumps to the first step with invalid fields.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, SubmitBlocked> {
        match self.session.status {
            WizardStatus::Submitting => return Err(SubmitBlocked::InProgress),
            WizardStatus::Submitted => return Err(SubmitBlocked::AlreadySubmitted),
            WizardStatus::Editing => {}
        }
        if !self.session.step.is_terminal() {
            return Err(SubmitBlocked::NotOnLastStep);
        }

        for descriptor in STEPS.iter() {
            if let Err(errors) = validate(&self.value, descriptor.fields) {
                tracing::warn!(step = ?descriptor.step, "Submission blocked by invalid fields");
                self.session.step = descriptor.step;
                self.session.active_field = 0;
                self.session.errors = errors;
                self.session.last_validation_passed = false;
                self.session.message = Some(FIX_FIELDS_MESSAGE.to_string());
                return Err(SubmitBlocked::Invalid(descriptor.step));
            }
        }

        // An earlier attempt may have been stored with the old values
        if self
            .session
            .last_sent
            .as_ref()
            .is_some_and(|sent| *sent != self.value)
        {
            let previous = self.session.submission_id;
            self.session.submission_id = Uuid::new_v4();
            tracing::info!(
                %previous,
                submission_id = %self.session.submission_id,
                "Form edited since last attempt, using a new submission id"
            );
        }
        self.session.last_sent = Some(self.value.clone());

        self.session.errors.clear();
        self.session.last_validation_passed = true;
        self.session.status = WizardStatus::Submitting;
        self.session.message = None;
        tracing::info!(submission_id = %self.session.submission_id, "Submitting business formation");

        Ok(SubmitTicket {
            value: self.value.clone(),
            submission_id: self.session.submission_id,
        })
    }

    /// Apply the gateway's answer to a submission started with `begin_submit`
    pub fn finish_submit(&mut self, result: Result<FormationRecord, SubmitError>) -> SubmitOutcome {
        if !self.session.is_submitting() {
            tracing::warn!("Ignoring submission result, no submission in progress");
            return SubmitOutcome::Blocked(SubmitBlocked::NotStarted);
        }

        match result {
            Ok(record) => {
                self.value = FormValue::default();
                self.session.status = WizardStatus::Submitted;
                self.session.errors.clear();
                self.session.active_field = 0;
                self.session.message = Some(SUBMITTED_MESSAGE.to_string());
                SubmitOutcome::Submitted(record)
            }
            Err(err) => {
                self.session.status = WizardStatus::Editing;
                self.session.message = Some(err.user_message().to_string());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Submit in place, awaiting the gateway
    #[allow(dead_code)] // the app runs begin_submit/finish_submit around a spawned request
    pub async fn submit(&mut self, gateway: &SubmissionGateway) -> SubmitOutcome {
        let ticket = match self.begin_submit() {
            Ok(ticket) => ticket,
            Err(blocked) => return SubmitOutcome::Blocked(blocked),
        };
        let result = gateway.submit(&ticket.value, ticket.submission_id).await;
        self.finish_submit(result)
    }

    /// Advance, or submit when the terminal step is valid.
    ///
    /// Returns the submission outcome when a submission was attempted.
    #[allow(dead_code)] // the app runs begin_submit/finish_submit around a spawned request
    pub async fn advance_or_submit(&mut self, gateway: &SubmissionGateway) -> Option<SubmitOutcome> {
        match self.advance() {
            Advance::ReadyToSubmit => Some(self.submit(gateway).await),
            _ => None,
        }
    }

    /// Start over with an empty application and a fresh submission id
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Fields editable on the current step
    pub fn fields(&self) -> Vec<FieldPath> {
        self.session.step.editable_fields(&self.value)
    }

    pub fn active_path(&self) -> Option<FieldPath> {
        self.fields().get(self.session.active_field).copied()
    }

    pub fn error_for(&self, path: &FieldPath) -> Option<&str> {
        self.session.errors.get(path)
    }

    pub fn next_field(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.session.active_field = (self.session.active_field + 1) % count;
        }
    }

    pub fn prev_field(&mut self) {
        let count = self.fields().len();
        if count == 0 {
            return;
        }
        if self.session.active_field == 0 {
            self.session.active_field = count - 1;
        } else {
            self.session.active_field -= 1;
        }
    }

    fn active_text_mut(&mut self) -> Option<(FieldPath, &mut String)> {
        if !self.is_editing() {
            return None;
        }
        let path = self.active_path()?;
        let text = path.text_mut(&mut self.value)?;
        Some((path, text))
    }

    pub fn input_char(&mut self, c: char) {
        if let Some((path, text)) = self.active_text_mut() {
            text.push(c);
            self.session.errors.remove(&path);
        }
    }

    pub fn input_newline(&mut self) {
        if self.active_path().is_some_and(|p| p.is_multiline()) {
            self.input_char('\n');
        }
    }

    pub fn backspace(&mut self) {
        if let Some((_, text)) = self.active_text_mut() {
            text.pop();
        }
    }

    /// Toggle the active checkbox or cycle the active choice forward
    pub fn toggle(&mut self) {
        self.cycle_choice(true);
    }

    /// Cycle a choice field, or flip a checkbox
    pub fn cycle_choice(&mut self, forward: bool) {
        if !self.is_editing() {
            return;
        }
        let Some(path) = self.active_path() else {
            return;
        };
        match (path, path.kind()) {
            (FieldPath::EntityType, _) => {
                self.value.entity_type = if forward {
                    self.value.entity_type.next()
                } else {
                    self.value.entity_type.prev()
                };
            }
            (FieldPath::Expedite, _) => self.value.expedite = self.value.expedite.toggle(),
            (_, FieldKind::Checkbox) => {
                self.value.preparer_acknowledged = !self.value.preparer_acknowledged;
            }
            _ => return,
        }
        self.session.errors.remove(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        FormationStatus, MockIdentityProvider, MockPersistenceStore, PersistenceError,
        SUBMIT_FAILED_MESSAGE,
    };
    use crate::state::forms::model::{EntityType, Expedite, Owner};
    use crate::state::forms::path::OwnerField;
    use std::sync::{Arc, Mutex};

    fn jane() -> Owner {
        Owner {
            full_name: "Jane Doe".to_string(),
            address: "1 Main St".to_string(),
            phone: "3125551234".to_string(),
            email: "jane@x.com".to_string(),
            ssn: Some("123456789".to_string()),
            dob: Some("1990-01-01".to_string()),
            responsible_party: true,
            owner_number: 1,
        }
    }

    fn complete_value() -> FormValue {
        let mut value = FormValue {
            entity_name: "Acme LLC".to_string(),
            entity_address: "1 Main St".to_string(),
            service_product_offered: "Widgets".to_string(),
            entity_type: EntityType::SCorp,
            expedite: Expedite::Yes,
            owners: vec![jane()],
            preparer_acknowledged: true,
            ..Default::default()
        };
        value.signatures[0].sign_here = "Jane Doe".to_string();
        value.signatures[0].date = "2024-05-01".to_string();
        value
    }

    fn wizard_at(step: Step, value: FormValue) -> FormationWizard {
        let mut wizard = FormationWizard::new();
        wizard.value = value;
        wizard.session.step = step;
        wizard
    }

    fn gateway_with(store: MockPersistenceStore) -> SubmissionGateway {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_current_user_id()
            .returning(|| Some("u-1".to_string()));
        SubmissionGateway::new(Arc::new(identity), Arc::new(store))
    }

    fn echo_store() -> MockPersistenceStore {
        let mut store = MockPersistenceStore::new();
        store
            .expect_insert()
            .returning(|_, record| Ok(record.clone()));
        store
    }

    mod navigation {
        use super::*;

        #[test]
        fn test_initial_state() {
            let wizard = FormationWizard::new();
            assert_eq!(wizard.step(), Step::EntityInformation);
            assert_eq!(wizard.status(), WizardStatus::Editing);
            assert_eq!(wizard.value.owners.len(), 1);
            assert_eq!(wizard.value.signatures.len(), 1);
            assert!(wizard.session.errors.is_empty());
        }

        #[test]
        fn test_empty_entity_name_blocks_advance() {
            let mut value = complete_value();
            value.entity_name = String::new();
            let mut wizard = wizard_at(Step::EntityInformation, value);

            assert_eq!(wizard.advance(), Advance::Invalid);
            assert_eq!(wizard.step(), Step::EntityInformation);
            assert_eq!(
                wizard.error_for(&FieldPath::EntityName),
                Some("Entity name is required")
            );
            assert!(!wizard.session.last_validation_passed);
            assert_eq!(wizard.session.message.as_deref(), Some(FIX_FIELDS_MESSAGE));
        }

        #[test]
        fn test_valid_owner_step_advances() {
            let mut wizard = wizard_at(Step::OwnerInformation, complete_value());
            assert_eq!(wizard.advance(), Advance::Moved(Step::PreparerInformation));
            assert_eq!(wizard.step(), Step::PreparerInformation);
            assert!(wizard.session.last_validation_passed);
        }

        #[test]
        fn test_advance_only_checks_current_step() {
            let mut value = complete_value();
            value.preparer_acknowledged = false;
            value.signatures[0].sign_here.clear();
            let mut wizard = wizard_at(Step::EntityInformation, value);
            assert_eq!(wizard.advance(), Advance::Moved(Step::OwnerInformation));
        }

        #[test]
        fn test_advance_moves_iff_step_fields_pass() {
            for descriptor in STEPS.iter().filter(|d| !d.is_terminal()) {
                let mut wizard = wizard_at(descriptor.step, complete_value());
                assert_eq!(wizard.advance(), Advance::Moved(descriptor.next.unwrap()));

                let mut wizard = wizard_at(descriptor.step, FormValue::default());
                assert_eq!(wizard.advance(), Advance::Invalid);
                assert_eq!(wizard.step(), descriptor.step);
            }
        }

        #[test]
        fn test_terminal_step_reports_ready() {
            let mut wizard = wizard_at(Step::Attestation, complete_value());
            assert_eq!(wizard.advance(), Advance::ReadyToSubmit);
            assert_eq!(wizard.step(), Step::Attestation);
        }

        #[test]
        fn test_retreat_clamps_and_skips_validation() {
            let mut wizard = FormationWizard::new();
            wizard.retreat();
            assert_eq!(wizard.step(), Step::EntityInformation);

            let mut wizard = wizard_at(Step::PreparerInformation, FormValue::default());
            wizard.retreat();
            assert_eq!(wizard.step(), Step::OwnerInformation);
            assert!(wizard.session.errors.is_empty());
        }

        #[test]
        fn test_retreat_clears_messages() {
            let mut wizard = wizard_at(Step::OwnerInformation, FormValue::default());
            assert_eq!(wizard.advance(), Advance::Invalid);
            wizard.retreat();
            assert!(wizard.session.errors.is_empty());
            assert!(wizard.session.message.is_none());
        }

        #[test]
        fn test_retreat_then_advance_is_stable() {
            let mut wizard = wizard_at(Step::OwnerInformation, complete_value());
            assert_eq!(wizard.advance(), Advance::Moved(Step::PreparerInformation));
            wizard.retreat();
            assert_eq!(wizard.advance(), Advance::Moved(Step::PreparerInformation));
        }
    }

    mod owners {
        use super::*;

        #[test]
        fn test_add_owner() {
            let mut wizard = FormationWizard::new();
            assert_eq!(wizard.add_owner(), Some(2));
            assert_eq!(wizard.value.owners.len(), 2);
            let second = &wizard.value.owners[1];
            assert_eq!(second.owner_number, 2);
            assert!(!second.responsible_party);
            assert_eq!(wizard.value.signatures.len(), 2);
        }

        #[test]
        fn test_additional_owner_needs_no_ssn() {
            let mut value = complete_value();
            value.add_owner();
            value.owners[1] = Owner {
                full_name: "John Roe".to_string(),
                address: "2 Main St".to_string(),
                phone: "3125550000".to_string(),
                email: "john@x.com".to_string(),
                ..Owner::additional(2)
            };
            let mut wizard = wizard_at(Step::OwnerInformation, value);
            assert_eq!(wizard.advance(), Advance::Moved(Step::PreparerInformation));
        }

        #[test]
        fn test_no_owner_added_while_submitting() {
            let mut wizard = wizard_at(Step::Attestation, complete_value());
            wizard.begin_submit().unwrap();
            assert_eq!(wizard.add_owner(), None);
            assert_eq!(wizard.value.owners.len(), 1);
        }
    }

    mod editing {
        use super::*;

        #[test]
        fn test_typing_into_active_field() {
            let mut wizard = FormationWizard::new();
            for c in "Acme".chars() {
                wizard.input_char(c);
            }
            assert_eq!(wizard.value.entity_name, "Acme");
            wizard.backspace();
            assert_eq!(wizard.value.entity_name, "Acm");
        }

        #[test]
        fn test_editing_clears_field_error() {
            let mut wizard = FormationWizard::new();
            assert_eq!(wizard.advance(), Advance::Invalid);
            assert!(wizard.error_for(&FieldPath::EntityName).is_some());
            wizard.input_char('A');
            assert!(wizard.error_for(&FieldPath::EntityName).is_none());
            assert!(wizard.error_for(&FieldPath::EntityAddress).is_some());
        }

        #[test]
        fn test_field_cursor_wraps() {
            let mut wizard = FormationWizard::new();
            wizard.prev_field();
            assert_eq!(wizard.active_path(), Some(FieldPath::Expedite));
            wizard.next_field();
            assert_eq!(wizard.active_path(), Some(FieldPath::EntityName));
        }

        #[test]
        fn test_cycle_entity_type_and_expedite() {
            let mut wizard = FormationWizard::new();
            wizard.session.active_field = 3;
            assert_eq!(wizard.active_path(), Some(FieldPath::EntityType));
            wizard.cycle_choice(true);
            assert_eq!(wizard.value.entity_type, EntityType::SCorp);
            wizard.cycle_choice(false);
            wizard.cycle_choice(false);
            assert_eq!(wizard.value.entity_type, EntityType::CCorp);

            wizard.next_field();
            wizard.toggle();
            assert_eq!(wizard.value.expedite, Expedite::Yes);
        }

        #[test]
        fn test_toggle_acknowledgment() {
            let mut wizard = wizard_at(Step::PreparerInformation, FormValue::default());
            wizard.toggle();
            assert!(wizard.value.preparer_acknowledged);
            wizard.input_char('x');
            assert!(wizard.value.preparer_acknowledged);
        }

        #[test]
        fn test_ssn_field_only_for_first_owner() {
            let mut wizard = wizard_at(Step::OwnerInformation, FormValue::default());
            wizard.add_owner();
            let fields = wizard.fields();
            assert!(fields.contains(&FieldPath::Owner(0, OwnerField::Ssn)));
            assert!(!fields.contains(&FieldPath::Owner(1, OwnerField::Ssn)));
        }

        #[test]
        fn test_newline_only_in_multiline_fields() {
            let mut wizard = FormationWizard::new();
            wizard.input_newline();
            assert_eq!(wizard.value.entity_name, "");
            wizard.next_field();
            wizard.input_newline();
            assert_eq!(wizard.value.entity_address, "\n");
        }
    }

    mod submission {
        use super::*;
        use pretty_assertions::assert_eq;
        use std::collections::HashMap;

        #[tokio::test]
        async fn test_submit_before_last_step_never_calls_gateway() {
            let mut store = MockPersistenceStore::new();
            store.expect_insert().never();
            let gateway = gateway_with(store);

            for step in [
                Step::EntityInformation,
                Step::OwnerInformation,
                Step::PreparerInformation,
            ] {
                let mut wizard = wizard_at(step, complete_value());
                assert_eq!(
                    wizard.submit(&gateway).await,
                    SubmitOutcome::Blocked(SubmitBlocked::NotOnLastStep)
                );
                assert_eq!(wizard.step(), step);
            }
        }

        #[tokio::test]
        async fn test_successful_submission_record_matches_form() {
            let captured = Arc::new(Mutex::new(None));
            let sink = captured.clone();
            let mut store = MockPersistenceStore::new();
            store.expect_insert().times(1).returning(move |_, record| {
                *sink.lock().unwrap() = Some(record.clone());
                Ok(record.clone())
            });
            let gateway = gateway_with(store);

            let value = complete_value();
            let mut wizard = wizard_at(Step::Attestation, value.clone());
            let submission_id = wizard.session.submission_id;

            let outcome = wizard.submit(&gateway).await;
            let SubmitOutcome::Submitted(record) = outcome else {
                panic!("expected a stored record, got {outcome:?}");
            };

            let sent = captured.lock().unwrap().clone().unwrap();
            assert_eq!(sent, record);
            assert_eq!(record.entity_name, value.entity_name);
            assert_eq!(record.entity_address, value.entity_address);
            assert_eq!(record.service_product_offered, value.service_product_offered);
            assert_eq!(record.entity_type, value.entity_type);
            assert_eq!(record.expedite, value.expedite);
            assert_eq!(record.owners, value.owners);
            assert_eq!(record.signatures, value.signatures);
            assert_eq!(record.user_id, "u-1");
            assert_eq!(record.status, FormationStatus::Pending);
            assert_eq!(record.id, Some(submission_id));

            assert_eq!(wizard.status(), WizardStatus::Submitted);
            assert_eq!(wizard.value, FormValue::default());
            assert_eq!(wizard.session.message.as_deref(), Some(SUBMITTED_MESSAGE));
        }

        #[tokio::test]
        async fn test_store_failure_keeps_wizard_on_last_step() {
            let mut store = MockPersistenceStore::new();
            store
                .expect_insert()
                .returning(|_, _| Err(PersistenceError::Transport("connection reset".to_string())));
            let gateway = gateway_with(store);

            let mut wizard = wizard_at(Step::Attestation, complete_value());
            let outcome = wizard.submit(&gateway).await;

            assert!(matches!(outcome, SubmitOutcome::Failed(SubmitError::Persistence(_))));
            assert_eq!(wizard.step(), Step::Attestation);
            assert!(!wizard.session.is_submitting());
            assert_eq!(wizard.session.message.as_deref(), Some(SUBMIT_FAILED_MESSAGE));
            assert_eq!(wizard.value, complete_value());
        }

        #[tokio::test]
        async fn test_retry_reuses_submission_id() {
            let ids = Arc::new(Mutex::new(Vec::new()));
            let sink = ids.clone();
            let mut store = MockPersistenceStore::new();
            let mut calls = 0;
            store.expect_insert().times(2).returning(move |_, record| {
                sink.lock().unwrap().push(record.id);
                calls += 1;
                if calls == 1 {
                    Err(PersistenceError::Transport("timeout".to_string()))
                } else {
                    Err(PersistenceError::Duplicate)
                }
            });
            let gateway = gateway_with(store);

            let mut wizard = wizard_at(Step::Attestation, complete_value());
            assert!(matches!(wizard.submit(&gateway).await, SubmitOutcome::Failed(_)));
            assert!(matches!(wizard.submit(&gateway).await, SubmitOutcome::Submitted(_)));

            let ids = ids.lock().unwrap();
            assert_eq!(ids.len(), 2);
            assert_eq!(ids[0], ids[1]);
        }

        #[tokio::test]
        async fn test_edits_after_failed_attempt_get_a_new_submission_id() {
            // The first insert lands but its response is lost
            let rows: Arc<Mutex<HashMap<Uuid, FormationRecord>>> = Arc::default();
            let db = rows.clone();
            let mut store = MockPersistenceStore::new();
            let mut calls = 0;
            store.expect_insert().times(2).returning(move |_, record| {
                calls += 1;
                let mut db = db.lock().unwrap();
                let id = record.id.unwrap();
                if db.contains_key(&id) {
                    return Err(PersistenceError::Duplicate);
                }
                db.insert(id, record.clone());
                if calls == 1 {
                    Err(PersistenceError::Transport("response lost".to_string()))
                } else {
                    Ok(record.clone())
                }
            });
            let gateway = gateway_with(store);

            let mut wizard = wizard_at(Step::Attestation, complete_value());
            let first_id = wizard.session.submission_id;
            assert!(matches!(wizard.submit(&gateway).await, SubmitOutcome::Failed(_)));

            wizard.value.entity_name = "Corrected Name Inc".to_string();
            let outcome = wizard.submit(&gateway).await;
            let SubmitOutcome::Submitted(record) = outcome else {
                panic!("expected a stored record, got {outcome:?}");
            };

            let second_id = record.id.unwrap();
            assert_ne!(second_id, first_id);
            let rows = rows.lock().unwrap();
            assert_eq!(rows[&second_id].entity_name, "Corrected Name Inc");
            assert_eq!(record.entity_name, rows[&second_id].entity_name);
        }

        #[test]
        fn test_second_begin_submit_is_refused() {
            let mut wizard = wizard_at(Step::Attestation, complete_value());
            assert!(wizard.begin_submit().is_ok());
            assert_eq!(wizard.status(), WizardStatus::Submitting);
            assert_eq!(wizard.begin_submit().unwrap_err(), SubmitBlocked::InProgress);
            assert_eq!(wizard.advance(), Advance::Busy);
        }

        #[test]
        fn test_begin_submit_revalidates_earlier_steps() {
            let mut value = complete_value();
            value.owners[0].phone = "123".to_string();
            let mut wizard = wizard_at(Step::Attestation, value);

            assert_eq!(
                wizard.begin_submit().unwrap_err(),
                SubmitBlocked::Invalid(Step::OwnerInformation)
            );
            assert_eq!(wizard.step(), Step::OwnerInformation);
            assert_eq!(
                wizard.error_for(&FieldPath::Owner(0, OwnerField::Phone)),
                Some("Valid phone number is required")
            );
            assert_eq!(wizard.status(), WizardStatus::Editing);
        }

        #[test]
        fn test_stale_result_is_ignored() {
            let mut wizard = wizard_at(Step::Attestation, complete_value());
            let outcome = wizard.finish_submit(Err(SubmitError::NotSignedIn));
            assert_eq!(outcome, SubmitOutcome::Blocked(SubmitBlocked::NotStarted));
            assert_eq!(wizard.status(), WizardStatus::Editing);
            assert!(wizard.session.message.is_none());
        }

        #[tokio::test]
        async fn test_advance_or_submit() {
            let gateway = gateway_with(echo_store());

            let mut wizard = wizard_at(Step::PreparerInformation, complete_value());
            assert!(wizard.advance_or_submit(&gateway).await.is_none());
            assert_eq!(wizard.step(), Step::Attestation);

            let outcome = wizard.advance_or_submit(&gateway).await;
            assert!(matches!(outcome, Some(SubmitOutcome::Submitted(_))));
        }

        #[test]
        fn test_reset_starts_a_new_application() {
            let mut wizard = wizard_at(Step::Attestation, complete_value());
            let old_id = wizard.session.submission_id;
            wizard.begin_submit().unwrap();
            wizard.reset();
            assert_eq!(wizard.step(), Step::EntityInformation);
            assert_eq!(wizard.status(), WizardStatus::Editing);
            assert_eq!(wizard.value, FormValue::default());
            assert_ne!(wizard.session.submission_id, old_id);
        }
    }
}
