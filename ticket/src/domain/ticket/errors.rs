use thiserror::Error;

/// Error type for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username is empty")]
    Empty,

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Top-level error type for all ticket-related operations
#[derive(Debug, Error)]
pub enum TicketError {
    /// The supplied ticket string is shorter than the mandatory prefix or
    /// does not carry it. Distinct from `NotFound` so callers can tell a
    /// malformed credential from one that was never issued.
    #[error("{0} is an invalid ticket format")]
    InvalidFormat(String),

    /// No ticket exists for the parsed key: never issued, or already removed.
    #[error("Missing ticket for {0}")]
    NotFound(String),

    /// A ticket was found but its deadline has passed. Distinct from
    /// `NotFound` so callers can distinguish "never had a session" from
    /// "session timed out".
    #[error("Ticket expired for {0}")]
    Expired(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    // Infrastructure errors
    #[error("Ticket store error: {0}")]
    Store(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for TicketError {
    fn from(err: anyhow::Error) -> Self {
        TicketError::Unknown(err.to_string())
    }
}
