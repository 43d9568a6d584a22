//! Field rules of the domain types.
//!
//! The rules are declared on the structs with `#[derive(Validate)]`; this
//! module turns a failed run into a [`DomainError::Validation`].

pub use validator::Validate;
use validator::{ValidationError, ValidationErrors};

use super::slug::is_valid_slug;
use crate::error::DomainError;

/// Separator between the messages of a [`DomainError::Validation`].
pub const MESSAGE_SEPARATOR: &str = "; ";

/// Run every rule of `value`, reporting all failed fields together.
pub fn check_fields<T: Validate>(value: &T) -> Result<(), DomainError> {
    value.validate().map_err(into_domain_error)
}

/// `custom` rule for slug fields.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(ValidationError::new("slug")
            .with_message("must be 1-200 letters, digits, hyphens or underscores".into()))
    }
}

fn into_domain_error(errors: ValidationErrors) -> DomainError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => format!("{field} {message}"),
                None => format!("{field} is invalid ({})", e.code),
            })
        })
        .collect();
    messages.sort();

    DomainError::Validation(messages.join(MESSAGE_SEPARATOR))
}
