use thiserror::Error;

/// Failure taxonomy for user-triggered actions and settlement.
///
/// Validation errors are raised before any remote traffic; remote effects are
/// fire-and-forget, so nothing here represents a server-side rejection (those
/// are simply never observed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No live channel to the remote database. Write actions fail fast and
    /// are never retried internally; reconnection is the channel's job.
    #[error("not connected to the game database")]
    NotConnected,

    /// Settlement attempted with zero guesses; the round stays unsettled.
    #[error("round has no guesses to settle")]
    NoEntries,

    /// The deployment does not expose this reducer (e.g. check-in not
    /// provisioned). A soft, display-only condition, not a bug.
    #[error("operation not available on this deployment: {0}")]
    Unsupported(&'static str),

    /// Participant address is neither `fid-<n>` nor a 40-hex-digit wallet.
    #[error("invalid participant address: {0}")]
    InvalidAddress(String),

    /// The outbound call queue was torn down mid-flight. Callers treat this
    /// the same as `NotConnected`.
    #[error("outbound channel closed")]
    ChannelClosed,

    /// Advisory client-side guard rejected the action (round closed, time
    /// expired, duplicate guess). The authoritative check lives server-side.
    #[error("{0}")]
    Rejected(&'static str),
}

/// Action boundary result: success flag plus user-facing message, never a
/// panic into rendering code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn failed(err: &GameError) -> Self {
        Self {
            success: false,
            message: Some(err.to_string()),
        }
    }
}

impl From<Result<(), GameError>> for ActionOutcome {
    fn from(res: Result<(), GameError>) -> Self {
        match res {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(&e),
        }
    }
}
