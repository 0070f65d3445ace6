//! Form rendering module
//!
//! This module contains UI components for rendering forms:
//! - `field_renderer`: Field rendering utilities
//! - `auth_form`: Sign-in and sign-up form
//! - `wizard`: The formation wizard steps

mod auth_form;
mod field_renderer;
mod wizard;

pub use auth_form::draw_auth;
pub use wizard::draw_wizard;
