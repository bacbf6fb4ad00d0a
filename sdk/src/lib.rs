//! Agenda SDK
//!
//! Shared contracts for the agenda engine: the error taxonomy and the plain
//! data types exchanged between the roster, the session builder and the
//! renderers.

/// Error types and handling
pub mod errors;

/// Roster history and agenda row types
pub mod types;

// Re-export commonly used types
pub use errors::{AgendaError, AgendaErrorExt};
pub use types::{AgendaRow, CardThresholds, Language, RoleKind, RoleRecord, SpeechRecord, Track};
