//! Agenda Engine Library
//!
//! This library provides the agenda assembly engine: roster bookkeeping,
//! curriculum progression, timing cards and session layout.
//! It is used by both the `agenda` binary and integration tests.

/// Configuration management module
pub mod config;

/// Curriculum level sequences
pub mod curriculum;

/// Timing cards and displayed durations
pub mod timing;

/// Member roster and name resolution
pub mod roster;

/// Timed session builder
pub mod session;

/// Call-role parsing and meeting planning
pub mod meeting;

/// Agenda output formats
pub mod render;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
