use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Live scoring state, 1:1 with an in-progress match. The server-owned row is
/// the single source of truth; clients fetch it fresh rather than keeping
/// their own copy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchState {
    pub id: Uuid,
    pub match_id: Uuid,
    pub current_batting_team: Uuid,
    pub current_bowling_team: Uuid,
    pub innings_number: i32,
    pub current_over: i32,
    pub current_ball: i32,
    pub batsman1: Option<Uuid>,
    pub batsman2: Option<Uuid>,
    pub current_striker: Option<Uuid>,
    pub current_bowler: Option<Uuid>,
    pub total_balls_bowled: i64,
    pub target_runs: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the scoreboard endpoint returns: the raw state plus the innings
/// totals and tournament context the operator needs to drive the workflow.
#[derive(Debug, Serialize)]
pub struct MatchStateSnapshot {
    #[serde(flatten)]
    pub state: MatchState,
    pub batting_runs: i32,
    pub batting_wickets: i32,
    pub bowling_runs: i32,
    pub bowling_wickets: i32,
    pub overs_per_match: i32,
    pub match_status: crate::models::tournament_match::MatchStatus,
}
