//! Error handling for OncoView
//!
//! Provides error types for the layers of the visualization core:
//! - Validation errors (clinical values and view parameters out of range)
//! - Visualization errors (calls that need an open session)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Validation error type
///
/// Raised when clinical input or a view parameter falls outside its
/// documented range. Values are never clamped silently: a clamped dose or
/// damage level would hide a data bug upstream.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A numeric field is outside its allowed range
    #[error("{entity}: {field} = {value} is outside {range}")]
    OutOfRange {
        /// Id of the offending entity (or the parameter owner)
        entity: String,
        /// Field name
        field: &'static str,
        /// The rejected value
        value: f64,
        /// Human readable range, e.g. "[0, 1]"
        range: &'static str,
    },

    /// A numeric field is NaN or infinite
    #[error("{entity}: {field} is not a finite number")]
    NotFinite {
        /// Id of the offending entity
        entity: String,
        /// Field name
        field: &'static str,
    },

    /// Two entities share an id
    #[error("Duplicate entity id: {id}")]
    DuplicateId {
        /// The repeated id
        id: String,
    },

    /// An id is empty
    #[error("Empty id for {kind}")]
    EmptyId {
        /// Kind of entity with the empty id
        kind: &'static str,
    },

    /// A tumor references a region that does not exist
    #[error("Tumor {tumor} references unknown region {region}")]
    UnknownRegion {
        /// The tumor id
        tumor: String,
        /// The missing region id
        region: String,
    },

    /// A tumor's centre lies outside the region it references
    #[error("Tumor {tumor} lies outside region {region}")]
    TumorOutsideRegion {
        /// The tumor id
        tumor: String,
        /// The referenced region id
        region: String,
    },

    /// A color string could not be parsed
    #[error("{entity}: invalid color '{value}'")]
    InvalidColor {
        /// Id of the offending entity
        entity: String,
        /// The rejected color string
        value: String,
    },

    /// Generic validation failure
    #[error("Invalid value: {message}")]
    Other {
        /// The error message
        message: String,
    },
}

impl ValidationError {
    /// Check that `value` is finite and inside `[min, max]`.
    pub fn check_range(
        entity: &str,
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
        range: &'static str,
    ) -> std::result::Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite {
                entity: entity.to_string(),
                field,
            });
        }
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                entity: entity.to_string(),
                field,
                value: value as f64,
                range,
            });
        }
        Ok(())
    }

    /// Check that `value` is finite and strictly positive.
    pub fn check_positive(
        entity: &str,
        field: &'static str,
        value: f32,
    ) -> std::result::Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite {
                entity: entity.to_string(),
                field,
            });
        }
        if value <= 0.0 {
            return Err(ValidationError::OutOfRange {
                entity: entity.to_string(),
                field,
                value: value as f64,
                range: "(0, inf)",
            });
        }
        Ok(())
    }
}

/// Visualization error type
///
/// Represents calls made against the visualization shell that cannot be
/// honoured. None of these leave the shell in a different state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisualizationError {
    /// The visualization is closed; the call needs an open session
    #[error("Visualization is not open")]
    NotOpen,

    /// The supplied value was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Main error type for OncoView
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Visualization error
    #[error(transparent)]
    Visualization(#[from] VisualizationError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a validation error, directly or wrapped
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::Visualization(VisualizationError::Validation(_))
        )
    }

    /// Check if this error was caused by a closed visualization
    pub fn is_not_open(&self) -> bool {
        matches!(self, Error::Visualization(VisualizationError::NotOpen))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
