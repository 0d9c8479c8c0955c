//! Error types for the liftmax engine.

use thiserror::Error;

use crate::domain::ExerciseFamily;

/// Errors that can occur when parsing a personal record spreadsheet.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("cannot read file: {0}")]
    CannotRead(String),

    #[error("invalid Excel format: {0}")]
    InvalidFormat(String),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("invalid date format in row {row}: {value}")]
    InvalidDate { row: usize, value: String },

    #[error("invalid weight value in row {row}: {value}")]
    InvalidWeight { row: usize, value: String },

    #[error("invalid repetitions value in row {row}: {value}")]
    InvalidReps { row: usize, value: String },

    #[error("unknown exercise in row {row}: {value}")]
    UnknownExercise { row: usize, value: String },
}

/// Input rejected before any formula is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("body weight must be at least {min}kg: {value}")]
    BodyWeightTooLow { value: f64, min: f64 },

    #[error("repetitions must be between {min} and {max}: {value}")]
    RepsOutOfRange { value: u32, min: u32, max: u32 },

    #[error("weight cannot be negative: {0}")]
    NegativeWeight(f64),

    #[error("maximum added weight for {family} is {cap}kg: {value}")]
    WeightAboveCap {
        family: ExerciseFamily,
        value: f64,
        cap: f64,
    },

    #[error("{0} must be a finite number")]
    NonFiniteInput(&'static str),
}

/// Errors raised by the personal record flow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// The profile has no usable body weight. Callers should send the user
    /// to configure it instead of reporting a generic failure.
    #[error("body weight is not configured; set it in the profile to calculate records")]
    BodyWeightNotConfigured,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl RecordError {
    /// Machine-readable action hint for the caller.
    pub fn action(&self) -> Option<&'static str> {
        match self {
            RecordError::BodyWeightNotConfigured => Some("configure_weight"),
            RecordError::Validation(_) => None,
        }
    }
}

/// Errors that can occur while loading a record history.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Record(#[from] RecordError),
}
