//! Crate-wide error types.

use thiserror::Error;

use crate::domain::PolicyError;
use crate::scheduler::{ConstructionError, StateError};

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Job construction error: {0}")]
    Construction(#[from] ConstructionError),

    #[error("State computation error: {0}")]
    State(#[from] StateError),

    #[error("Invalid policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
