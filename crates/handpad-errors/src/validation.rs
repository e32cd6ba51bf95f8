//! Validation errors for calibration tables and mapping configuration.

use core::fmt;

use crate::common::ErrorSeverity;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Value out of range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name
        field: String,
        /// The invalid value
        value: String,
        /// Minimum allowed value
        min: String,
        /// Maximum allowed value
        max: String,
    },

    /// Value is required but missing
    #[error("Required field '{0}' is missing")]
    Required(String),

    /// Axis swap table is not a permutation of X, Y and Z
    #[error("Axis swap for '{table}' is not a bijection over X, Y, Z: {mapping}")]
    InvalidAxisSwap {
        /// Table name
        table: String,
        /// Offending mapping, rendered
        mapping: String,
    },

    /// Sign vector component other than +1 or -1
    #[error("Sign vector for '{table}' has component {value} on axis {axis}, expected 1 or -1")]
    InvalidSign {
        /// Table name
        table: String,
        /// Axis name
        axis: char,
        /// Offending component
        value: String,
    },

    /// Value not unique
    #[error("Value for field '{field}' must be unique but '{value}' already exists")]
    NotUnique {
        /// Field name
        field: String,
        /// The duplicate value
        value: String,
    },

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }

    /// Create an out of range error for a numeric value.
    pub fn out_of_range<T: fmt::Debug>(field: impl Into<String>, value: T, min: T, max: T) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            value: format!("{value:?}"),
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }

    /// Create a required field error.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required(field.into())
    }

    /// Create an invalid axis swap error.
    pub fn invalid_axis_swap(table: impl Into<String>, mapping: impl Into<String>) -> Self {
        ValidationError::InvalidAxisSwap {
            table: table.into(),
            mapping: mapping.into(),
        }
    }

    /// Create an invalid sign component error.
    pub fn invalid_sign(table: impl Into<String>, axis: char, value: f32) -> Self {
        ValidationError::InvalidSign {
            table: table.into(),
            axis,
            value: format!("{value:?}"),
        }
    }

    /// Create a duplicate value error.
    pub fn not_unique(field: impl Into<String>, value: impl Into<String>) -> Self {
        ValidationError::NotUnique {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a constraint violation error.
    pub fn constraint(msg: impl Into<String>) -> Self {
        ValidationError::ConstraintViolation(msg.into())
    }
}
