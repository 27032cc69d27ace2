//! Core types shared by every depstrap module.
//!
//! Currently this is the error system: [`DepstrapError`] for typed failures and
//! [`ErrorContext`] / [`user_friendly_error`] for what the CLI prints.

pub mod error;

pub use error::{DepstrapError, ErrorContext, user_friendly_error};
