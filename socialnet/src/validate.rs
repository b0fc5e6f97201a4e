use itertools::Itertools;
use thiserror::Error;

use crate::error::{Error, Result};
use crate::model::User;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ValidationError {
    #[error("Id cannot be empty.")]
    EmptyId,

    #[error("First name cannot be empty.")]
    EmptyFirstName,

    #[error("Last name cannot be empty.")]
    EmptyLastName,
}

/// Attribute checks a [crate::UserStore] runs before accepting a record.
pub trait Validator<T> {
    /// Returns every problem found, or an empty vec if `entity` is valid.
    fn validate(&self, entity: &T) -> Vec<ValidationError>;

    /// Folds all problems reported by [Validator::validate] into a single
    /// [Error::ValidationFailed].
    fn check(&self, entity: &T) -> Result<()> {
        let errors = self.validate(entity);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed(errors_to_string(&errors)))
        }
    }
}

/// Requires a non-blank id, first name and last name.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserValidator;

impl Validator<User> for UserValidator {
    fn validate(&self, user: &User) -> Vec<ValidationError> {
        let mut errors = vec![];
        if is_blank(user.id().as_str()) {
            errors.push(ValidationError::EmptyId);
        }
        if is_blank(&user.first_name) {
            errors.push(ValidationError::EmptyFirstName);
        }
        if is_blank(&user.last_name) {
            errors.push(ValidationError::EmptyLastName);
        }
        errors
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn errors_to_string(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| e.to_string()).join(" ")
}
