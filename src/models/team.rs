use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: Uuid,
    pub team_name: String,
    pub team_color: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub joined_at: DateTime<Utc>,
}

/// One active roster entry, as consumed by batsman/bowler eligibility checks.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RosterMember {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub team_name: String,
    #[serde(default = "default_team_color")]
    pub team_color: String,
}

fn default_team_color() -> String {
    "#4169E1".to_string()
}

impl CreateTeamRequest {
    pub fn validate(&self) -> Result<(), String> {
        let name = self.team_name.trim();
        if name.is_empty() {
            return Err("Team name cannot be empty".to_string());
        }
        if name.len() > 100 {
            return Err("Team name must be 100 characters or fewer".to_string());
        }
        Ok(())
    }

    pub fn sanitized_name(&self) -> String {
        self.team_name.trim().to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTeamMemberRequest {
    pub user_id: Uuid,
}
