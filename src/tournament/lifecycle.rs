//! Tournament lifecycle: upcoming → ongoing → completed. The ongoing state
//! gates which matches may start; ending a tournament reads the final points
//! table and writes the season's achievements.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::tournament::{
    AddTournamentTeamRequest, CreateTournamentRequest, Tournament, TournamentEndResponse,
    TournamentStatus, TournamentTeam,
};
use crate::models::tournament_match::{CreateMatchRequest, MatchStatus, TournamentMatch};
use crate::models::user::UserRole;
use crate::scoring::ScoringError;
use crate::tournament::roster;

#[derive(Debug)]
pub struct TournamentService {
    pool: PgPool,
}

impl TournamentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_tournament(
        &self,
        created_by: Uuid,
        request: &CreateTournamentRequest,
    ) -> Result<Tournament, ScoringError> {
        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            INSERT INTO tournaments (
                id, name, status, overs_per_match, created_by, created_at, updated_at
            ) VALUES ($1, $2, 'upcoming', $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(request.overs_per_match)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!("Tournament '{}' created by {}", tournament.name, created_by);
        Ok(tournament)
    }

    /// Managers see the tournaments they created; admins and everyone else
    /// browsing see all of them.
    pub async fn list_tournaments(
        &self,
        role: UserRole,
        user_id: Uuid,
    ) -> Result<Vec<Tournament>, ScoringError> {
        let tournaments = if role == UserRole::Manager {
            sqlx::query_as::<_, Tournament>(
                "SELECT * FROM tournaments WHERE created_by = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Tournament>(
                "SELECT * FROM tournaments ORDER BY created_at DESC",
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(tournaments)
    }

    pub async fn get_tournament(&self, id: Uuid) -> Result<Tournament, ScoringError> {
        sqlx::query_as::<_, Tournament>("SELECT * FROM tournaments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ScoringError::NotFound("tournament".to_string()))
    }

    /// Teams can only be added while the tournament has not started.
    pub async fn add_team(
        &self,
        tournament_id: Uuid,
        request: &AddTournamentTeamRequest,
    ) -> Result<TournamentTeam, ScoringError> {
        let tournament = self.get_tournament(tournament_id).await?;
        if tournament.status != TournamentStatus::Upcoming {
            return Err(ScoringError::InvalidStateTransition(format!(
                "tournament is {}, teams can only be added while it is upcoming",
                tournament.status
            )));
        }
        let team_exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM teams WHERE id = $1")
                .bind(request.team_id)
                .fetch_optional(&self.pool)
                .await?;
        if team_exists.is_none() {
            return Err(ScoringError::NotFound("team".to_string()));
        }

        let inserted = sqlx::query_as::<_, TournamentTeam>(
            r#"
            INSERT INTO tournament_teams (id, tournament_id, team_id, registered_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (tournament_id, team_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tournament_id)
        .bind(request.team_id)
        .fetch_optional(&self.pool)
        .await?;
        inserted.ok_or_else(|| {
            ScoringError::InvalidTeam("team is already in this tournament".to_string())
        })
    }

    pub async fn start_tournament(&self, tournament_id: Uuid) -> Result<Tournament, ScoringError> {
        let tournament = self.get_tournament(tournament_id).await?;
        if tournament.status != TournamentStatus::Upcoming {
            return Err(ScoringError::InvalidStateTransition(format!(
                "tournament is {}, it can only be started from upcoming",
                tournament.status
            )));
        }
        let updated = sqlx::query_as::<_, Tournament>(
            r#"
            UPDATE tournaments SET
                status = 'ongoing',
                start_date = COALESCE(start_date, NOW()),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tournament_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!("Tournament '{}' is now ongoing", updated.name);
        Ok(updated)
    }

    /// End the tournament: status to completed and achievements for the top
    /// scorer, the highest wicket taker and every member of the winning
    /// team, read off the final points table.
    pub async fn end_tournament(
        &self,
        tournament_id: Uuid,
    ) -> Result<TournamentEndResponse, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let tournament = sqlx::query_as::<_, Tournament>(
            "SELECT * FROM tournaments WHERE id = $1 FOR UPDATE",
        )
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ScoringError::NotFound("tournament".to_string()))?;
        if tournament.status != TournamentStatus::Ongoing {
            return Err(ScoringError::InvalidStateTransition(format!(
                "tournament is {}, it must be ongoing to end",
                tournament.status
            )));
        }

        let mut achievements_created = Vec::new();

        let top_scorer: Option<(Uuid, String, i64)> = sqlx::query_as(
            r#"
            SELECT mps.player_id, u.username, SUM(mps.runs_scored) AS value
            FROM match_player_stats mps
            JOIN tournament_matches m ON m.id = mps.match_id
            JOIN users u ON u.id = mps.player_id
            WHERE m.tournament_id = $1 AND m.status = 'completed'
            GROUP BY mps.player_id, u.username
            ORDER BY value DESC
            LIMIT 1
            "#,
        )
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some((player_id, username, runs)) = top_scorer {
            if runs > 0 {
                insert_achievement(
                    &mut tx,
                    player_id,
                    format!("Top Scorer - {}", tournament.name),
                    format!("Highest run scorer in {}", tournament.name),
                )
                .await?;
                achievements_created.push(format!("Top Scorer: {}", username));
            }
        }

        let most_wickets: Option<(Uuid, String, i64)> = sqlx::query_as(
            r#"
            SELECT mps.player_id, u.username, SUM(mps.wickets_taken) AS value
            FROM match_player_stats mps
            JOIN tournament_matches m ON m.id = mps.match_id
            JOIN users u ON u.id = mps.player_id
            WHERE m.tournament_id = $1 AND m.status = 'completed'
            GROUP BY mps.player_id, u.username
            ORDER BY value DESC
            LIMIT 1
            "#,
        )
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some((player_id, username, wickets)) = most_wickets {
            if wickets > 0 {
                insert_achievement(
                    &mut tx,
                    player_id,
                    format!("Highest Wicket Taker - {}", tournament.name),
                    format!("Most wickets in {}", tournament.name),
                )
                .await?;
                achievements_created.push(format!("Highest Wicket Taker: {}", username));
            }
        }

        let winner: Option<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT tp.team_id, t.team_name
            FROM tournament_points tp
            JOIN teams t ON t.id = tp.team_id
            WHERE tp.tournament_id = $1 AND tp.matches_played > 0
            ORDER BY tp.points DESC, tp.net_run_rate DESC
            LIMIT 1
            "#,
        )
        .bind(tournament_id)
        .fetch_optional(&mut *tx)
        .await?;
        let winning_team_id = if let Some((team_id, team_name)) = &winner {
            for member in roster::get_active_roster(&mut tx, *team_id).await? {
                insert_achievement(
                    &mut tx,
                    member.user_id,
                    format!("Tournament Winner - {}", tournament.name),
                    format!("Won {} with {}", tournament.name, team_name),
                )
                .await?;
                achievements_created.push(format!("Winner: {}", member.username));
            }
            Some(*team_id)
        } else {
            None
        };

        let tournament = sqlx::query_as::<_, Tournament>(
            r#"
            UPDATE tournaments SET
                status = 'completed',
                end_date = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tournament_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(
            "Tournament '{}' ended with {} achievements",
            tournament.name,
            achievements_created.len()
        );
        Ok(TournamentEndResponse {
            tournament,
            winning_team_id,
            achievements_created,
        })
    }

    /// Create a scheduled match between two teams registered in the
    /// tournament.
    pub async fn create_match(
        &self,
        request: &CreateMatchRequest,
    ) -> Result<TournamentMatch, ScoringError> {
        let tournament = self.get_tournament(request.tournament_id).await?;
        if tournament.status == TournamentStatus::Completed {
            return Err(ScoringError::InvalidStateTransition(
                "tournament is completed, no more matches can be scheduled".to_string(),
            ));
        }
        if request.team1_id == request.team2_id {
            return Err(ScoringError::InvalidTeam(
                "a match needs two different teams".to_string(),
            ));
        }
        for team_id in [request.team1_id, request.team2_id] {
            let registered: Option<(Uuid,)> = sqlx::query_as(
                "SELECT id FROM tournament_teams WHERE tournament_id = $1 AND team_id = $2",
            )
            .bind(request.tournament_id)
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?;
            if registered.is_none() {
                return Err(ScoringError::InvalidTeam(format!(
                    "team {} is not registered in this tournament",
                    team_id
                )));
            }
        }

        let match_row = sqlx::query_as::<_, TournamentMatch>(
            r#"
            INSERT INTO tournament_matches (
                id, tournament_id, team1_id, team2_id, match_number,
                scheduled_at, location, status, is_completed,
                team1_runs, team1_wickets, team1_balls,
                team2_runs, team2_wickets, team2_balls,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, 0, 0, 0, 0, 0, 0, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.tournament_id)
        .bind(request.team1_id)
        .bind(request.team2_id)
        .bind(request.match_number)
        .bind(request.scheduled_at)
        .bind(request.location.as_deref())
        .bind(MatchStatus::Scheduled.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(match_row)
    }

    pub async fn list_matches(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<TournamentMatch>, ScoringError> {
        self.get_tournament(tournament_id).await?;
        let matches = sqlx::query_as::<_, TournamentMatch>(
            "SELECT * FROM tournament_matches WHERE tournament_id = $1 ORDER BY match_number",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(matches)
    }
}

async fn insert_achievement(
    conn: &mut PgConnection,
    player_id: Uuid,
    title: String,
    description: String,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO achievements (id, player_id, title, description, awarded_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (player_id, title) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(player_id)
    .bind(title)
    .bind(description)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
