/// Domain errors shared by every crate.
///
/// Upstream-specific failures (missing credentials, HTTP status errors) live
/// in each client crate's own error type and wrap this one.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input rejected before any upstream call; the message is user-facing.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A state machine was asked to leave a terminal state or skip a step.
    #[error("Invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
