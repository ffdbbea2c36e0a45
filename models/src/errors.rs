// models/src/errors.rs

use std::fmt;

pub use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Patient,
    Doctor,
    Appointment,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Patient => "patient",
            Entity::Doctor => "doctor",
            Entity::Appointment => "appointment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("{0} with id {1} was not found")]
    NotFound(Entity, i32),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A validation error.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// An appointment referenced a patient that is not in the store.
    #[error("patient {0} not found")]
    PatientNotFound(i32),
    /// An appointment referenced a doctor that is not in the store.
    #[error("doctor {0} not found")]
    DoctorNotFound(i32),
    /// A status string outside the four recognized values.
    #[error("invalid appointment status '{0}'")]
    InvalidStatus(String),
}

/// A type alias for a `Result` that returns a `StoreError` on failure.
pub type StoreResult<T> = Result<T, StoreError>;
