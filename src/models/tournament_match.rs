use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled or played match between two tournament teams. Per-team
/// cumulative totals are written through the scoring workflow and double as
/// the final innings summaries once the match completes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TournamentMatch {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub team1_id: Uuid,
    pub team2_id: Uuid,
    pub match_number: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: MatchStatus,
    pub is_completed: bool,
    pub toss_won_by: Option<Uuid>,
    pub batting_first: Option<Uuid>,
    pub team1_runs: i32,
    pub team1_wickets: i32,
    pub team1_balls: i32,
    pub team2_runs: i32,
    pub team2_wickets: i32,
    pub team2_balls: i32,
    pub winner_team_id: Option<Uuid>,
    pub man_of_the_match: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TournamentMatch {
    pub fn involves(&self, team_id: Uuid) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }

    pub fn other_team(&self, team_id: Uuid) -> Uuid {
        if self.team1_id == team_id {
            self.team2_id
        } else {
            self.team1_id
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub tournament_id: Uuid,
    pub team1_id: Uuid,
    pub team2_id: Uuid,
    pub match_number: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StartMatchRequest {
    pub toss_won_by_team_id: Uuid,
    pub batting_first_team_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SetBatsmenRequest {
    pub batsman1_id: Uuid,
    pub batsman2_id: Uuid,
    pub current_striker_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SetBowlerRequest {
    pub bowler_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct AddScoreRequest {
    pub runs: i32,
    /// Client-held ball sequence; a stale value is rejected so a duplicate
    /// network retry cannot double-count.
    pub expected_sequence: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddWicketRequest {
    /// Required while the batting side still has batsmen to come; omitted on
    /// the tenth wicket.
    pub next_batsman_id: Option<Uuid>,
    pub expected_sequence: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteMatchRequest {
    pub man_of_the_match_player_id: Option<Uuid>,
}
