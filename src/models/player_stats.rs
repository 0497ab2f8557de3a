use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per (match, player), created zeroed when the match starts and
/// mutated by every scoring event. Read-only once the match leaves
/// in_progress; rows of cancelled matches are excluded from all aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchPlayerStats {
    pub id: Uuid,
    pub match_id: Uuid,
    pub player_id: Uuid,
    pub team_id: Uuid,
    pub runs_scored: i32,
    pub balls_faced: i32,
    pub fours: i32,
    pub sixes: i32,
    pub wickets_taken: i32,
    pub balls_bowled: i32,
    pub runs_conceded: i32,
    pub is_out: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-match stats joined with the player name, plus derived rates.
#[derive(Debug, Serialize, FromRow)]
pub struct MatchPlayerStatsView {
    pub player_id: Uuid,
    pub username: String,
    pub team_id: Uuid,
    pub runs_scored: i32,
    pub balls_faced: i32,
    pub fours: i32,
    pub sixes: i32,
    pub wickets_taken: i32,
    pub balls_bowled: i32,
    pub runs_conceded: i32,
    pub is_out: bool,
    #[sqlx(default)]
    pub strike_rate: Option<f64>,
    #[sqlx(default)]
    pub economy: Option<f64>,
}

impl MatchPlayerStatsView {
    /// Fill in derived rates, guarding the zero-ball cases.
    pub fn with_rates(mut self) -> Self {
        self.strike_rate = strike_rate(self.runs_scored, self.balls_faced);
        self.economy = economy(self.runs_conceded, self.balls_bowled);
        self
    }
}

pub fn strike_rate(runs: i32, balls_faced: i32) -> Option<f64> {
    if balls_faced == 0 {
        None
    } else {
        Some(runs as f64 * 100.0 / balls_faced as f64)
    }
}

pub fn economy(runs_conceded: i32, balls_bowled: i32) -> Option<f64> {
    if balls_bowled == 0 {
        None
    } else {
        Some(runs_conceded as f64 * 6.0 / balls_bowled as f64)
    }
}

/// Career aggregates rolled up at match completion.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlayerCareerStats {
    pub player_id: Uuid,
    pub matches_played: i32,
    pub runs: i32,
    pub balls_faced: i32,
    pub wickets: i32,
    pub balls_bowled: i32,
    pub runs_conceded: i32,
    pub high_score: i32,
    pub updated_at: DateTime<Utc>,
}

/// A per-player award written at match completion (man of the match) or
/// tournament end (top scorer, highest wicket taker, tournament winner).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub player_id: Uuid,
    pub title: String,
    pub description: String,
    pub awarded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct LeaderboardEntry {
    pub player_id: Uuid,
    pub username: String,
    pub value: i64,
}

#[derive(Debug, Serialize)]
pub struct TournamentLeaderboard {
    pub top_scorer: Option<LeaderboardEntry>,
    pub most_wickets: Option<LeaderboardEntry>,
    pub most_man_of_the_match: Option<LeaderboardEntry>,
}
