//! Sign-in / sign-up form

use super::field::FormField;
use crate::backend::SignUpRequest;

/// Trait for common form operations
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        self.set_active_field((current + 1) % count);
    }
    fn prev_field(&mut self) {
        let count = self.field_count();
        let current = self.active_field();
        if current == 0 {
            self.set_active_field(count - 1);
        } else {
            self.set_active_field(current - 1);
        }
    }
    fn get_active_field_mut(&mut self) -> &mut FormField;
    fn get_field(&self, index: usize) -> Option<&FormField>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub full_name: FormField,
    pub email: FormField,
    pub password: FormField,
    pub confirm_password: FormField,
    pub active_field_index: usize,
}

impl AuthForm {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::SignIn,
            full_name: FormField::text("Full Name"),
            email: FormField::text("Email"),
            password: FormField::secret("Password"),
            confirm_password: FormField::secret("Confirm Password"),
            active_field_index: 0,
        }
    }

    /// Switch between sign-in and sign-up, keeping the email
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.password.clear();
        self.confirm_password.clear();
        self.active_field_index = 0;
    }

    /// Fields shown in the current mode, in order
    fn fields(&self) -> Vec<&FormField> {
        match self.mode {
            AuthMode::SignIn => vec![&self.email, &self.password],
            AuthMode::SignUp => vec![
                &self.full_name,
                &self.email,
                &self.password,
                &self.confirm_password,
            ],
        }
    }

    pub fn sign_up_request(&self) -> SignUpRequest<'_> {
        SignUpRequest {
            full_name: self.full_name.as_text(),
            email: self.email.as_text(),
            password: self.password.as_text(),
            confirm_password: self.confirm_password.as_text(),
        }
    }

    /// Drop entered passwords
    pub fn clear_secrets(&mut self) {
        self.password.clear();
        self.confirm_password.clear();
    }
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new()
    }
}

impl Form for AuthForm {
    fn field_count(&self) -> usize {
        match self.mode {
            AuthMode::SignIn => 2,
            AuthMode::SignUp => 4,
        }
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.field_count() - 1);
    }
    fn get_active_field_mut(&mut self) -> &mut FormField {
        match (self.mode, self.active_field_index) {
            (AuthMode::SignIn, 0) => &mut self.email,
            (AuthMode::SignIn, _) => &mut self.password,
            (AuthMode::SignUp, 0) => &mut self.full_name,
            (AuthMode::SignUp, 1) => &mut self.email,
            (AuthMode::SignUp, 2) => &mut self.password,
            (AuthMode::SignUp, _) => &mut self.confirm_password,
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        self.fields().get(index).copied()
    }
}
