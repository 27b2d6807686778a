use std::fmt::Display;

use error_stack::Context;

#[derive(Debug)]
pub enum KernelError {
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::Timeout => write!(f, "Store operation timed out"),
            KernelError::Internal => write!(f, "Internal store error"),
        }
    }
}

impl Context for KernelError {}
