//! Application state and core logic

use crate::backend::{
    AccountService, FormationRecord, IdentityProvider, PersistenceError, PersistenceStore,
    Session, SignUpOutcome, SubmissionGateway, SubmitError, SupabaseClient, UserDirectory,
};
use crate::config::{PreparerInfo, TuiConfig};
use crate::platform::COPY_MODIFIER;
use crate::state::{
    Advance, AppState, AuthMode, FieldKind, Form, Step, SubmitBlocked, SubmitOutcome, View,
};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::oneshot::{self, error::TryRecvError};

type SubmissionResult = Result<FormationRecord, SubmitError>;

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Sign-in and sign-up
    accounts: AccountService,
    /// Writes completed applications
    gateway: SubmissionGateway,
    /// Preparer shown on the preparer step
    pub preparer: Option<PreparerInfo>,
    /// Whether the app should quit
    quit: bool,
    /// Copy feedback message
    pub copy_message: Option<String>,
    /// Puts text on the system clipboard
    copy_text: fn(&str) -> Result<()>,
    /// Result channel of the submission running in the background
    pending_submission: Option<oneshot::Receiver<SubmissionResult>>,
}

impl App {
    /// Create a new App talking to the configured backend
    pub fn new(config: TuiConfig) -> Result<Self> {
        let client = Arc::new(SupabaseClient::new(config.backend_settings()?)?);
        Ok(Self::with_backend(
            client.clone(),
            client.clone(),
            client,
            config.preparer,
        ))
    }

    pub fn with_backend(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn PersistenceStore>,
        directory: Arc<dyn UserDirectory>,
        preparer: Option<PreparerInfo>,
    ) -> Self {
        Self {
            state: AppState::default(),
            accounts: AccountService::new(identity.clone(), directory),
            gateway: SubmissionGateway::new(identity, store),
            preparer,
            quit: false,
            copy_message: None,
            copy_text: copy_to_clipboard,
            pending_submission: None,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submission.is_some()
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Clear any status messages on key press
        self.copy_message = None;
        self.state.status_message = None;

        match self.state.current_view {
            View::Auth => self.handle_auth_key(key).await?,
            View::Wizard => self.handle_wizard_key(key).await?,
            View::Submitted => self.handle_submitted_key(key).await?,
        }

        Ok(())
    }

    /// Handle keys in the sign-in / sign-up view
    async fn handle_auth_key(&mut self, key: KeyEvent) -> Result<()> {
        let form = &mut self.state.auth_form;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('t') if ctrl => form.toggle_mode(),
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Enter => self.submit_auth().await,
            KeyCode::Backspace => form.get_active_field_mut().pop_char(),
            KeyCode::Char(c) if !ctrl => form.get_active_field_mut().push_char(c),
            _ => {}
        }
        Ok(())
    }

    async fn submit_auth(&mut self) {
        match self.state.auth_form.mode {
            AuthMode::SignIn => {
                let form = &self.state.auth_form;
                let result = self
                    .accounts
                    .sign_in(form.email.as_text(), form.password.as_text())
                    .await;
                match result {
                    Ok(session) => self.signed_in(session),
                    Err(err) => {
                        tracing::warn!("Sign-in failed: {err}");
                        self.push_error(err.to_string());
                    }
                }
            }
            AuthMode::SignUp => {
                let request = self.state.auth_form.sign_up_request();
                let result = self.accounts.sign_up(request).await;
                match result {
                    Ok(SignUpOutcome::SignedIn(session)) => self.signed_in(session),
                    Ok(SignUpOutcome::ConfirmationRequired) => {
                        self.state.auth_form.toggle_mode();
                        self.state.status_message =
                            Some("Check your email for the confirmation link".to_string());
                    }
                    Err(err) => {
                        tracing::warn!("Sign-up failed: {err}");
                        self.push_error(err.to_string());
                    }
                }
            }
        }
    }

    fn signed_in(&mut self, session: Session) {
        tracing::info!(user_id = %session.user_id, "User signed in");
        self.state.signed_in_email = Some(session.email);
        self.state.auth_form.clear_secrets();
        self.state.current_view = View::Wizard;
    }

    async fn sign_out(&mut self) {
        self.accounts.sign_out().await;
        self.pending_submission = None;
        self.state.clear_session();
        self.state.status_message = Some("Signed out".to_string());
    }

    /// Handle keys in the formation wizard
    async fn handle_wizard_key(&mut self, key: KeyEvent) -> Result<()> {
        // Ignore input while a submission is in flight
        if self.is_submitting() {
            return Ok(());
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let active = self.state.wizard.active_path();
        let kind = active.map(|p| p.kind());
        let wizard = &mut self.state.wizard;

        match key.code {
            KeyCode::Char('n') if ctrl => self.advance_wizard(),
            KeyCode::Char('p') if ctrl => wizard.retreat(),
            KeyCode::Char('s') if ctrl => self.advance_wizard(),
            KeyCode::Char('o') if ctrl => {
                if wizard.step() == Step::OwnerInformation {
                    if let Some(number) = wizard.add_owner() {
                        self.state.status_message = Some(format!("Added owner {number}"));
                    }
                }
            }
            KeyCode::Char('l') if ctrl => self.sign_out().await,
            KeyCode::Esc => wizard.retreat(),
            KeyCode::Tab | KeyCode::Down => wizard.next_field(),
            KeyCode::BackTab | KeyCode::Up => wizard.prev_field(),
            KeyCode::Enter if active.is_some_and(|p| p.is_multiline()) && !ctrl => {
                wizard.input_newline()
            }
            KeyCode::Enter => self.advance_wizard(),
            KeyCode::Left if kind == Some(FieldKind::Choice) => wizard.cycle_choice(false),
            KeyCode::Right if kind == Some(FieldKind::Choice) => wizard.cycle_choice(true),
            KeyCode::Char(' ') if matches!(kind, Some(FieldKind::Choice | FieldKind::Checkbox)) => {
                wizard.toggle()
            }
            KeyCode::Backspace => wizard.backspace(),
            KeyCode::Char(c) if !ctrl => wizard.input_char(c),
            _ => {}
        }
        Ok(())
    }

    /// Validate the current step, starting the submission on the last one
    fn advance_wizard(&mut self) {
        if let Advance::ReadyToSubmit = self.state.wizard.advance() {
            self.start_submission();
        }
    }

    /// Run the gateway call on a background task
    fn start_submission(&mut self) {
        let ticket = match self.state.wizard.begin_submit() {
            Ok(ticket) => ticket,
            Err(SubmitBlocked::Invalid(step)) => {
                tracing::info!(?step, "Returned to step with invalid fields");
                return;
            }
            Err(blocked) => {
                tracing::debug!("Submission not started: {blocked}");
                return;
            }
        };

        let gateway = self.gateway.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = gateway.submit(&ticket.value, ticket.submission_id).await;
            // Receiver is gone only when the user signed out meanwhile
            let _ = tx.send(result);
        });
        self.pending_submission = Some(rx);
    }

    /// Apply the background submission's result once it has arrived
    pub fn poll_submission(&mut self) {
        let Some(rx) = self.pending_submission.as_mut() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err(SubmitError::Persistence(
                PersistenceError::Transport("submission task stopped".to_string()),
            )),
        };
        self.pending_submission = None;

        match self.state.wizard.finish_submit(result) {
            SubmitOutcome::Submitted(record) => {
                self.state.last_submission = Some(record);
                self.state.current_view = View::Submitted;
            }
            SubmitOutcome::Failed(err) => self.push_error(err.user_message()),
            SubmitOutcome::Blocked(_) => {}
        }
    }

    /// Handle keys on the confirmation screen
    async fn handle_submitted_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('y') if key.modifiers.contains(COPY_MODIFIER) => {
                self.copy_submission_id()
            }
            KeyCode::Char('l') if ctrl => self.sign_out().await,
            KeyCode::Char('n') | KeyCode::Enter => {
                self.state.wizard.reset();
                self.state.current_view = View::Wizard;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            _ => {}
        }
        Ok(())
    }

    fn copy_submission_id(&mut self) {
        let Some(id) = self.state.last_submission.as_ref().and_then(|r| r.id) else {
            return;
        };
        match (self.copy_text)(&id.to_string()) {
            Ok(()) => self.copy_message = Some("Copied application id".to_string()),
            Err(err) => {
                tracing::warn!("Clipboard unavailable: {err}");
                self.push_error(format!("Could not copy the application id: {err}"));
            }
        }
    }
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    use arboard::Clipboard;
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text)?;
    Ok(())
}
