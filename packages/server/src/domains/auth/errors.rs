use thiserror::Error;

/// Why an inbound request was not let through
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No bearer credential presented")]
    MissingCredential,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing required role: {0}")]
    InsufficientRole(String),

    #[error("Signing key unavailable: {0}")]
    KeyUnavailable(String),
}
