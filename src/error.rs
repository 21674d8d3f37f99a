//! Error types for the quote service.

use uuid::Uuid;

/// User-facing text shown when a lead could not be stored.
pub const SUBMISSION_FAILURE_MESSAGE: &str =
    "Could not connect to server. Please try again or use WhatsApp.";

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by the quote wizard surface.
///
/// Guard failures are not errors: a blocked transition is reported as a
/// no-op by the state machine.
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Unknown project route: {0}")]
    UnknownRoute(String),

    #[error("Unknown budget range: {0}")]
    UnknownBudget(String),

    #[error("Unknown timeline: {0}")]
    UnknownTimeline(String),

    #[error("Unknown lead status: {0}")]
    UnknownLeadStatus(String),

    #[error("Quote session {0} not found")]
    SessionNotFound(Uuid),

    #[error("No route selected for quote session")]
    RouteNotSelected,
}

/// The single failure kind of a submission: the store rejected the insert
/// or could not be reached.
#[derive(Debug, thiserror::Error)]
#[error("Could not connect to server. Please try again or use WhatsApp.")]
pub struct SubmissionFailure {
    #[source]
    pub source: DatabaseError,
}

impl SubmissionFailure {
    /// The message surfaced to the visitor.
    pub fn user_message(&self) -> &'static str {
        SUBMISSION_FAILURE_MESSAGE
    }
}
