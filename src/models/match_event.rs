use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BallEventType {
    Run,
    Wicket,
}

impl BallEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallEventType::Run => "run",
            BallEventType::Wicket => "wicket",
        }
    }
}

impl fmt::Display for BallEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only ball-by-ball ledger entry. `sequence` is the match-wide ball
/// counter; replaying events in sequence order reproduces the live totals.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BallEvent {
    pub id: Uuid,
    pub match_id: Uuid,
    pub sequence: i64,
    pub innings_number: i32,
    pub over_number: i32,
    pub ball_number: i32,
    pub event_type: BallEventType,
    pub runs: i32,
    pub striker_id: Uuid,
    pub non_striker_id: Option<Uuid>,
    pub bowler_id: Uuid,
    pub dismissed_player_id: Option<Uuid>,
    pub incoming_batsman_id: Option<Uuid>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
