//! Per-player aggregation: match stat rows, career rollups and the
//! tournament leaderboard. Pure aggregation over what the match workflow
//! wrote; derived rates are recomputed on read. Cancelled matches never
//! contribute.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::player_stats::{
    Achievement, LeaderboardEntry, MatchPlayerStatsView, PlayerCareerStats, TournamentLeaderboard,
};
use crate::scoring::ScoringError;

#[derive(Debug)]
pub struct StatsService {
    pool: PgPool,
}

impl StatsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stat rows for one match, best batting first.
    pub async fn get_match_player_stats(
        &self,
        match_id: Uuid,
    ) -> Result<Vec<MatchPlayerStatsView>, ScoringError> {
        let rows = sqlx::query_as::<_, MatchPlayerStatsView>(
            r#"
            SELECT mps.player_id, u.username, mps.team_id,
                   mps.runs_scored, mps.balls_faced, mps.fours, mps.sixes,
                   mps.wickets_taken, mps.balls_bowled, mps.runs_conceded, mps.is_out
            FROM match_player_stats mps
            JOIN users u ON u.id = mps.player_id
            WHERE mps.match_id = $1
            ORDER BY mps.runs_scored DESC, mps.wickets_taken DESC, u.username
            "#,
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MatchPlayerStatsView::with_rates).collect())
    }

    /// Tournament leaderboard: top run scorer, highest wicket taker and the
    /// most man-of-the-match awards, over completed matches only.
    pub async fn get_leaderboard(
        &self,
        tournament_id: Uuid,
    ) -> Result<TournamentLeaderboard, ScoringError> {
        let top_scorer = sqlx::query_as::<_, LeaderboardEntry>(
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
        .fetch_optional(&self.pool)
        .await?;

        let most_wickets = sqlx::query_as::<_, LeaderboardEntry>(
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
        .fetch_optional(&self.pool)
        .await?;

        let most_man_of_the_match = sqlx::query_as::<_, LeaderboardEntry>(
            r#"
            SELECT m.man_of_the_match AS player_id, u.username, COUNT(*) AS value
            FROM tournament_matches m
            JOIN users u ON u.id = m.man_of_the_match
            WHERE m.tournament_id = $1
              AND m.status = 'completed'
              AND m.man_of_the_match IS NOT NULL
            GROUP BY m.man_of_the_match, u.username
            ORDER BY value DESC
            LIMIT 1
            "#,
        )
        .bind(tournament_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(TournamentLeaderboard {
            top_scorer,
            most_wickets,
            most_man_of_the_match,
        })
    }

    /// Career aggregates for one player's dashboard.
    pub async fn get_career_stats(
        &self,
        player_id: Uuid,
    ) -> Result<Option<PlayerCareerStats>, ScoringError> {
        let row = sqlx::query_as::<_, PlayerCareerStats>(
            "SELECT * FROM player_career_stats WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Awards earned by one player, newest first.
    pub async fn get_achievements(
        &self,
        player_id: Uuid,
    ) -> Result<Vec<Achievement>, ScoringError> {
        let rows = sqlx::query_as::<_, Achievement>(
            "SELECT * FROM achievements WHERE player_id = $1 ORDER BY awarded_at DESC",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Fold a completed match's stat rows into every participant's career
    /// aggregates. Runs inside the completion transaction.
    pub async fn rollup_careers_in_tx(
        conn: &mut PgConnection,
        match_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO player_career_stats (
                player_id, matches_played, runs, balls_faced,
                wickets, balls_bowled, runs_conceded, high_score, updated_at
            )
            SELECT player_id, 1, runs_scored, balls_faced,
                   wickets_taken, balls_bowled, runs_conceded, runs_scored, NOW()
            FROM match_player_stats
            WHERE match_id = $1
            ON CONFLICT (player_id) DO UPDATE SET
                matches_played = player_career_stats.matches_played + 1,
                runs = player_career_stats.runs + EXCLUDED.runs,
                balls_faced = player_career_stats.balls_faced + EXCLUDED.balls_faced,
                wickets = player_career_stats.wickets + EXCLUDED.wickets,
                balls_bowled = player_career_stats.balls_bowled + EXCLUDED.balls_bowled,
                runs_conceded = player_career_stats.runs_conceded + EXCLUDED.runs_conceded,
                high_score = GREATEST(player_career_stats.high_score, EXCLUDED.high_score),
                updated_at = NOW()
            "#,
        )
        .bind(match_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
