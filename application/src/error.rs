use std::fmt::Display;

use error_stack::Context;

use kernel::prelude::entity::Violations;

/// User-facing outcome of a rejected book operation. Every variant except
/// `Store` is an expected result the presentation layer renders as-is;
/// `Store` wraps an infrastructure failure and stays opaque to callers.
#[derive(Debug, PartialEq, Eq)]
pub enum BookError {
    Validation(Violations),
    Duplicate(Duplicate),
    Conflict(Conflict),
    NotFound,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplicate {
    OnCreate,
    OnUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    Deleted,
    Modified,
}

impl Display for BookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookError::Validation(_) => write!(f, "One or more fields are invalid."),
            BookError::Duplicate(Duplicate::OnCreate) => {
                write!(f, "This book already exists.")
            }
            BookError::Duplicate(Duplicate::OnUpdate) => {
                write!(
                    f,
                    "Another book with the same Title and Author already exists."
                )
            }
            BookError::Conflict(Conflict::Deleted) => {
                write!(f, "This record was deleted by another user.")
            }
            BookError::Conflict(Conflict::Modified) => {
                write!(
                    f,
                    "This record was modified by another user. Please refresh and try again."
                )
            }
            BookError::NotFound => write!(f, "The requested book does not exist."),
            BookError::Store => write!(f, "The book store failed to complete the request."),
        }
    }
}

impl Context for BookError {}
