//! Error types and handling
//!
//! This module provides the error types used throughout the agenda engine.
//! All errors implement the `AgendaErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Error Categories
//!
//! - **Configuration**: curriculum exhausted, unknown role referenced, invalid
//!   settings. These indicate a static data/config mismatch and abort the run.
//! - **Input**: a meeting that cannot be planned (no date header, bad values).
//! - **State**: a meeting plan driven out of order.
//! - **Persistence**: roster file read/write and (de)serialization failures.
//!
//! Unknown member names and unassigned roles are not errors: the roster
//! creates shadow entries and the session builder suppresses TBD rows.

use thiserror::Error;

/// Trait for agenda error extensions
///
/// This trait provides additional context for errors, including user-friendly
/// hints and recoverability information. All engine errors implement this trait.
pub trait AgendaErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors only affect the meeting being processed; a batch run
    /// may continue with the next meeting. Non-recoverable errors require the
    /// configuration or roster data to be fixed first.
    fn is_recoverable(&self) -> bool;
}

/// Main agenda error type
///
/// # Examples
///
/// ```
/// use sdk::errors::{AgendaError, AgendaErrorExt};
///
/// let error = AgendaError::CurriculumExhausted {
///     level: "Level 5".to_string(),
/// };
/// assert!(error.is_configuration_error());
/// assert!(!error.is_recoverable());
///
/// let input_error = AgendaError::MissingMeetingDate;
/// assert!(input_error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum AgendaError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Curriculum exhausted: no level follows '{level}'")]
    CurriculumExhausted { level: String },

    #[error("Unknown role referenced: {0}")]
    UnknownRole(String),

    // Meeting plan errors
    #[error("Invalid meeting plan state: expected {expected}, found {found}")]
    InvalidState {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Meeting has no date header")]
    MissingMeetingDate,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Roster persistence errors
    #[error("Roster error: {0}")]
    Roster(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgendaError {
    /// Whether this error signals a static configuration/data mismatch.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::CurriculumExhausted { .. } | Self::UnknownRole(_)
        )
    }
}

impl AgendaErrorExt for AgendaError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::CurriculumExhausted { .. } => {
                "Extend the curriculum tracks in config.toml or fix the member's level"
            }
            Self::UnknownRole(_) => "Declare the role under [[roles]] in config.toml",

            Self::InvalidState { .. } => "Meeting steps were run out of order",
            Self::MissingMeetingDate => "Add a date line such as '11/4 (English)' to the call-role",
            Self::InvalidInput(_) => "Check the call-role text for typos",

            Self::Roster(_) | Self::Serialization(_) => {
                "The roster file could not be read or written. Check its JSON"
            }

            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) | Self::CurriculumExhausted { .. } | Self::UnknownRole(_) => false,

            // All other errors only affect the current meeting
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_are_fatal() {
        let errors = [
            AgendaError::Config("bad".to_string()),
            AgendaError::CurriculumExhausted {
                level: "CC10".to_string(),
            },
            AgendaError::UnknownRole("Photographer".to_string()),
        ];
        for error in errors {
            assert!(error.is_configuration_error());
            assert!(!error.is_recoverable());
        }
    }

    #[test]
    fn test_display_messages() {
        let error = AgendaError::CurriculumExhausted {
            level: "Level 5".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Curriculum exhausted: no level follows 'Level 5'"
        );

        let error = AgendaError::InvalidState {
            expected: "info parsed",
            found: "sessions built",
        };
        assert!(error.to_string().contains("expected info parsed"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: AgendaError = io.into();
        assert!(matches!(error, AgendaError::Io(_)));
        assert!(error.is_recoverable());
        assert_eq!(error.user_hint(), "File system operation failed");
    }
}
