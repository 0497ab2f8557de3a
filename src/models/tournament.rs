use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    pub status: TournamentStatus,
    pub overs_per_match: i32,
    pub created_by: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TournamentTeam {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub team_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    pub overs_per_match: i32,
}

impl CreateTournamentRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Tournament name cannot be empty".to_string());
        }
        if self.overs_per_match < 1 || self.overs_per_match > 50 {
            return Err("overs_per_match must be between 1 and 50".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTournamentTeamRequest {
    pub team_id: Uuid,
}

/// End-of-tournament summary: winners and the achievements written for them.
#[derive(Debug, Serialize)]
pub struct TournamentEndResponse {
    pub tournament: Tournament,
    pub winning_team_id: Option<Uuid>,
    pub achievements_created: Vec<String>,
}
