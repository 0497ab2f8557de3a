use thiserror::Error;

/// Everything that can go wrong while driving a live match. Each operation
/// either fully applies or returns one of these; there is no partial
/// application. `AllOut` and `OversExhausted` are advisory: they tell the
/// operator to switch innings or complete the match instead of scoring on.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("{0}")]
    InvalidStateTransition(String),

    #[error("invalid batsman: {0}")]
    InvalidBatsman(String),

    #[error("invalid bowler: {0}")]
    InvalidBowler(String),

    #[error("invalid team: {0}")]
    InvalidTeam(String),

    #[error("{0}")]
    EmptyRoster(String),

    #[error("batting side is all out")]
    AllOut,

    #[error("overs are exhausted for this innings")]
    OversExhausted,

    #[error("both batsmen and a striker must be set before this ball")]
    BatsmenNotSet,

    #[error("a bowler must be set for the current over")]
    BowlerNotSet,

    #[error("runs must be between 0 and 6, got {0}")]
    InvalidRuns(i32),

    #[error("stale ball sequence: server is at {server}, request carried {client}")]
    StaleSequence { server: i64, client: i64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl ScoringError {
    /// Whether the error is the caller's to fix (4xx) rather than ours.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ScoringError::Database(_))
    }
}
