pub mod engine;
pub mod error;

pub use engine::{BallApplied, LiveState, WicketApplied, BALLS_PER_OVER, MAX_WICKETS};
pub use error::ScoringError;
