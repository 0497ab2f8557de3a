//! Tournament standings. The table is never patched incrementally: every
//! completion replays the tournament's completed matches from scratch, which
//! keeps the table consistent even if an intermediate update was missed.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::config::settings::ScoringSettings;
use crate::models::points::PointsTableRow;
use crate::scoring::engine::decide_winner;
use crate::scoring::{ScoringError, MAX_WICKETS};

#[derive(Debug, Clone, Copy)]
pub struct PointsConfig {
    pub win: i32,
    pub tie: i32,
    pub loss: i32,
}

impl From<&ScoringSettings> for PointsConfig {
    fn from(s: &ScoringSettings) -> Self {
        Self {
            win: s.win_points,
            tie: s.tie_points,
            loss: s.loss_points,
        }
    }
}

/// Final innings summaries of one completed match, as needed for the table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompletedMatchResult {
    pub team1_id: Uuid,
    pub team2_id: Uuid,
    pub team1_runs: i32,
    pub team1_wickets: i32,
    pub team1_balls: i32,
    pub team2_runs: i32,
    pub team2_wickets: i32,
    pub team2_balls: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    pub team_id: Uuid,
    pub matches_played: i32,
    pub matches_won: i32,
    pub matches_lost: i32,
    pub matches_tied: i32,
    pub points: i32,
    pub net_run_rate: f64,
}

struct NrrAccumulator {
    runs_for: i32,
    overs_faced: f64,
    runs_against: i32,
    overs_bowled: f64,
}

/// Overs an innings counts for in net run rate. A side bowled out is charged
/// its full quota, per the standard NRR rule; otherwise the overs actually
/// faced.
fn nrr_overs(balls: i32, wickets: i32, overs_per_match: i32) -> f64 {
    if wickets >= MAX_WICKETS {
        overs_per_match as f64
    } else {
        balls as f64 / 6.0
    }
}

/// Recompute the full table for one tournament from its completed matches.
/// Teams with no completed match yet appear with zeroed records.
pub fn compute_table(
    team_ids: &[Uuid],
    matches: &[CompletedMatchResult],
    overs_per_match: i32,
    cfg: &PointsConfig,
) -> Vec<TeamRecord> {
    let mut records: Vec<TeamRecord> = team_ids
        .iter()
        .map(|&team_id| TeamRecord {
            team_id,
            matches_played: 0,
            matches_won: 0,
            matches_lost: 0,
            matches_tied: 0,
            points: 0,
            net_run_rate: 0.0,
        })
        .collect();
    let mut nrr: Vec<NrrAccumulator> = team_ids
        .iter()
        .map(|_| NrrAccumulator {
            runs_for: 0,
            overs_faced: 0.0,
            runs_against: 0,
            overs_bowled: 0.0,
        })
        .collect();

    let index_of = |team: Uuid| team_ids.iter().position(|&t| t == team);

    for m in matches {
        let winner = decide_winner(m.team1_id, m.team2_id, m.team1_runs, m.team2_runs);
        let sides = [
            (m.team1_id, m.team1_runs, m.team1_wickets, m.team1_balls,
             m.team2_runs, m.team2_wickets, m.team2_balls),
            (m.team2_id, m.team2_runs, m.team2_wickets, m.team2_balls,
             m.team1_runs, m.team1_wickets, m.team1_balls),
        ];
        for (team, runs_for, wkts_for, balls_for, runs_against, wkts_against, balls_against) in sides {
            let Some(i) = index_of(team) else { continue };
            records[i].matches_played += 1;
            match winner {
                Some(w) if w == team => {
                    records[i].matches_won += 1;
                    records[i].points += cfg.win;
                }
                Some(_) => {
                    records[i].matches_lost += 1;
                    records[i].points += cfg.loss;
                }
                None => {
                    records[i].matches_tied += 1;
                    records[i].points += cfg.tie;
                }
            }
            nrr[i].runs_for += runs_for;
            nrr[i].overs_faced += nrr_overs(balls_for, wkts_for, overs_per_match);
            nrr[i].runs_against += runs_against;
            nrr[i].overs_bowled += nrr_overs(balls_against, wkts_against, overs_per_match);
        }
    }

    for (record, acc) in records.iter_mut().zip(nrr.iter()) {
        let for_rate = if acc.overs_faced > 0.0 {
            acc.runs_for as f64 / acc.overs_faced
        } else {
            0.0
        };
        let against_rate = if acc.overs_bowled > 0.0 {
            acc.runs_against as f64 / acc.overs_bowled
        } else {
            0.0
        };
        record.net_run_rate = for_rate - against_rate;
    }

    // Standings order: points, then net run rate.
    records.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.net_run_rate.partial_cmp(&a.net_run_rate).unwrap_or(std::cmp::Ordering::Equal))
    });
    records
}

/// Service wrapper: loads a tournament's completed matches and rewrites its
/// `tournament_points` rows.
#[derive(Debug)]
pub struct PointsService {
    pool: PgPool,
}

impl PointsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Recompute inside an existing transaction (match completion).
    pub async fn recompute_in_tx(
        conn: &mut PgConnection,
        tournament_id: Uuid,
        overs_per_match: i32,
        cfg: &PointsConfig,
    ) -> Result<(), ScoringError> {
        let team_rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT team_id FROM tournament_points WHERE tournament_id = $1 ORDER BY team_id",
        )
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;
        let team_ids: Vec<Uuid> = team_rows.into_iter().map(|r| r.0).collect();

        let matches = sqlx::query_as::<_, CompletedMatchResult>(
            r#"
            SELECT team1_id, team2_id,
                   team1_runs, team1_wickets, team1_balls,
                   team2_runs, team2_wickets, team2_balls
            FROM tournament_matches
            WHERE tournament_id = $1 AND status = 'completed'
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;

        let table = compute_table(&team_ids, &matches, overs_per_match, cfg);
        let now = Utc::now();
        for record in &table {
            sqlx::query(
                r#"
                UPDATE tournament_points SET
                    matches_played = $3,
                    matches_won = $4,
                    matches_lost = $5,
                    matches_tied = $6,
                    points = $7,
                    net_run_rate = $8,
                    last_updated = $9
                WHERE tournament_id = $1 AND team_id = $2
                "#,
            )
            .bind(tournament_id)
            .bind(record.team_id)
            .bind(record.matches_played)
            .bind(record.matches_won)
            .bind(record.matches_lost)
            .bind(record.matches_tied)
            .bind(record.points)
            .bind(record.net_run_rate)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }
        tracing::info!(
            "Recomputed points table for tournament {} over {} completed matches",
            tournament_id,
            matches.len()
        );
        Ok(())
    }

    /// Standings for the read endpoint, ordered by points then net run rate.
    pub async fn get_points_table(
        &self,
        tournament_id: Uuid,
    ) -> Result<Vec<PointsTableRow>, ScoringError> {
        let rows = sqlx::query_as::<_, PointsTableRow>(
            r#"
            SELECT tp.team_id, t.team_name,
                   tp.matches_played, tp.matches_won, tp.matches_lost,
                   tp.matches_tied, tp.points, tp.net_run_rate
            FROM tournament_points tp
            JOIN teams t ON t.id = tp.team_id
            WHERE tp.tournament_id = $1
            ORDER BY tp.points DESC, tp.net_run_rate DESC
            "#,
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CFG: PointsConfig = PointsConfig { win: 2, tie: 1, loss: 0 };

    fn result(
        team1_id: Uuid,
        team2_id: Uuid,
        t1: (i32, i32, i32),
        t2: (i32, i32, i32),
    ) -> CompletedMatchResult {
        CompletedMatchResult {
            team1_id,
            team2_id,
            team1_runs: t1.0,
            team1_wickets: t1.1,
            team1_balls: t1.2,
            team2_runs: t2.0,
            team2_wickets: t2.1,
            team2_balls: t2.2,
        }
    }

    #[test]
    fn successful_chase_awards_win_to_chasing_team() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        // A 150/6 in 20 overs; B 151/4 in 18.3 overs.
        let matches = vec![result(a, b, (150, 6, 120), (151, 4, 111))];
        let table = compute_table(&[a, b], &matches, 20, &CFG);

        let b_rec = table.iter().find(|r| r.team_id == b).unwrap();
        let a_rec = table.iter().find(|r| r.team_id == a).unwrap();
        assert_eq!(b_rec.matches_won, 1);
        assert_eq!(b_rec.points, 2);
        assert_eq!(a_rec.matches_lost, 1);
        assert_eq!(a_rec.points, 0);
        // The chasing side scored faster; its rate differential is positive.
        assert!(b_rec.net_run_rate > 0.0);
        assert!(a_rec.net_run_rate < 0.0);
        // Winner tops the standings.
        assert_eq!(table[0].team_id, b);
    }

    #[test]
    fn equal_totals_are_a_tie_for_both_teams() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![result(a, b, (140, 8, 120), (140, 9, 120))];
        let table = compute_table(&[a, b], &matches, 20, &CFG);
        for record in &table {
            assert_eq!(record.matches_tied, 1);
            assert_eq!(record.matches_won, 0);
            assert_eq!(record.points, 1);
        }
    }

    #[test]
    fn all_out_innings_is_charged_full_overs_in_nrr() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        // B bowled out for 80 in 15 overs (90 balls); charged 20 overs.
        let matches = vec![result(a, b, (160, 4, 120), (80, 10, 90))];
        let table = compute_table(&[a, b], &matches, 20, &CFG);
        let b_rec = table.iter().find(|r| r.team_id == b).unwrap();
        // 80/20 - 160/20 = -4.0, not 80/15 - 160/20.
        assert!((b_rec.net_run_rate - (-4.0)).abs() < 1e-9);
        let a_rec = table.iter().find(|r| r.team_id == a).unwrap();
        assert!((a_rec.net_run_rate - 4.0).abs() < 1e-9);
    }

    #[test]
    fn standings_break_points_ties_on_net_run_rate() {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![
            // A beats B comfortably, C beats D narrowly: both on 2 points.
            result(a, b, (180, 2, 120), (100, 10, 100)),
            result(c, d, (140, 5, 120), (139, 6, 120)),
        ];
        let table = compute_table(&[a, b, c, d], &matches, 20, &CFG);
        assert_eq!(table[0].team_id, a);
        assert_eq!(table[1].team_id, c);
        assert_eq!(table[0].points, table[1].points);
        assert!(table[0].net_run_rate > table[1].net_run_rate);
    }

    #[test]
    fn teams_without_completed_matches_keep_zeroed_records() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let matches = vec![result(a, b, (120, 3, 120), (90, 10, 80))];
        let table = compute_table(&[a, b, c], &matches, 20, &CFG);
        let c_rec = table.iter().find(|r| r.team_id == c).unwrap();
        assert_eq!(c_rec.matches_played, 0);
        assert_eq!(c_rec.points, 0);
        assert_eq!(c_rec.net_run_rate, 0.0);
    }

    #[test]
    fn configured_point_values_are_respected() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let cfg = PointsConfig { win: 4, tie: 2, loss: 1 };
        let matches = vec![result(a, b, (150, 6, 120), (151, 4, 111))];
        let table = compute_table(&[a, b], &matches, 20, &cfg);
        let b_rec = table.iter().find(|r| r.team_id == b).unwrap();
        let a_rec = table.iter().find(|r| r.team_id == a).unwrap();
        assert_eq!(b_rec.points, 4);
        assert_eq!(a_rec.points, 1);
    }
}
