//! Application state definitions

use super::forms::{AuthForm, FormationWizard};
use crate::backend::FormationRecord;
use std::collections::VecDeque;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Sign in or create an account
    #[default]
    Auth,
    /// The formation wizard
    Wizard,
    /// Confirmation after a successful submission
    Submitted,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Auth => "Sign In",
            Self::Wizard => "Business Formation",
            Self::Submitted => "Submitted",
        }
    }
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,

    // Forms
    pub auth_form: AuthForm,
    pub wizard: FormationWizard,

    // Session
    pub signed_in_email: Option<String>,
    pub last_submission: Option<FormationRecord>,

    // UI state
    pub status_message: Option<String>,
    error_queue: VecDeque<String>,
}

impl AppState {
    /// Queue an error for the error dialog
    pub fn push_error(&mut self, message: String) {
        self.error_queue.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.error_queue.is_empty()
    }

    /// Error currently shown, oldest first
    pub fn current_error(&self) -> Option<&str> {
        self.error_queue.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.error_queue.pop_front();
    }

    /// Number of errors waiting behind the current one
    pub fn queued_errors(&self) -> usize {
        self.error_queue.len().saturating_sub(1)
    }

    #[cfg(test)]
    pub fn is_signed_in(&self) -> bool {
        self.signed_in_email.is_some()
    }

    /// Forget the user and everything entered for them
    pub fn clear_session(&mut self) {
        self.signed_in_email = None;
        self.last_submission = None;
        self.wizard.reset();
        self.auth_form.clear_secrets();
        self.current_view = View::Auth;
    }
}
