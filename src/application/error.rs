use std::error::Error as StdError;

use thiserror::Error;

use crate::{config::LoadError, domain::writeup::ContentViolations, infra::error::InfraError};

/// Error message plus its chain of causes, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    /// Causes joined with `: `, suitable for a single log field.
    pub fn joined(&self) -> String {
        self.messages.join(": ")
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("content rejected: {0}")]
    Validation(#[from] ContentViolations),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to load configuration")]
    Config(#[from] LoadError),
}

impl AppError {
    pub fn report(&self) -> ErrorReport {
        ErrorReport::from_error("application::error::AppError", self)
    }

    /// Process exit status for the command-line entry point.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation(_) => 2,
            AppError::Config(_) => 78,
            AppError::Infra(_) => 1,
        }
    }
}
