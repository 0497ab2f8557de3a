use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per (tournament, team), recomputed wholesale from completed
/// matches whenever a match completes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PointsTableEntry {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub team_id: Uuid,
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_lost: i32,
    pub matches_tied: i32,
    pub points: i32,
    pub net_run_rate: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct PointsTableRow {
    pub team_id: Uuid,
    pub team_name: String,
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_lost: i32,
    pub matches_tied: i32,
    pub points: i32,
    pub net_run_rate: f64,
}
