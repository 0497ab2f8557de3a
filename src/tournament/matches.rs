//! The live match workflow: start → set batsmen → set bowler → score/wicket
//! → switch innings → complete or cancel. Every mutating operation runs in
//! one transaction that locks the match row, applies a pure
//! [`LiveState`](crate::scoring::LiveState) transition, and persists all of
//! its effects, so concurrent submissions for the same match serialize and
//! an operation either fully applies or fully rejects.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::config::settings::ScoringSettings;
use crate::db::match_queries as queries;
use crate::models::match_event::{BallEvent, BallEventType};
use crate::models::match_state::{MatchState, MatchStateSnapshot};
use crate::models::tournament::{Tournament, TournamentStatus};
use crate::models::tournament_match::{
    AddScoreRequest, AddWicketRequest, CompleteMatchRequest, MatchStatus, SetBatsmenRequest,
    SetBowlerRequest, StartMatchRequest, TournamentMatch,
};
use crate::scoring::engine::decide_winner;
use crate::scoring::{LiveState, ScoringError};
use crate::tournament::points::{PointsConfig, PointsService};
use crate::tournament::roster;
use crate::tournament::stats::StatsService;

#[derive(Debug)]
pub struct MatchService {
    pool: PgPool,
    scoring: ScoringSettings,
}

impl MatchService {
    pub fn new(pool: PgPool, scoring: ScoringSettings) -> Self {
        Self { pool, scoring }
    }

    /// Start a scheduled match: record the toss, create the live state and
    /// zeroed per-player stat rows for both rosters. An empty roster does
    /// not block the start; batsman/bowler assignment will surface it.
    #[tracing::instrument(name = "Start match", skip(self, request))]
    pub async fn start_match(
        &self,
        match_id: Uuid,
        request: &StartMatchRequest,
    ) -> Result<MatchStateSnapshot, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let match_row = queries::get_match_for_update(&mut tx, match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound("match".to_string()))?;

        if match_row.status != MatchStatus::Scheduled {
            return Err(ScoringError::InvalidStateTransition(format!(
                "match is {}, only a scheduled match can be started",
                match_row.status
            )));
        }
        let tournament = get_tournament_in_tx(&mut tx, match_row.tournament_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound("tournament".to_string()))?;
        if tournament.status != TournamentStatus::Ongoing {
            return Err(ScoringError::InvalidStateTransition(format!(
                "tournament is {}, matches can only start while it is ongoing",
                tournament.status
            )));
        }
        for team_id in [request.toss_won_by_team_id, request.batting_first_team_id] {
            if !match_row.involves(team_id) {
                return Err(ScoringError::InvalidTeam(format!(
                    "team {} is not part of this match",
                    team_id
                )));
            }
        }

        let batting_team = request.batting_first_team_id;
        let bowling_team = match_row.other_team(batting_team);

        sqlx::query(
            r#"
            UPDATE tournament_matches SET
                status = 'in_progress',
                toss_won_by = $2,
                batting_first = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(match_id)
        .bind(request.toss_won_by_team_id)
        .bind(batting_team)
        .execute(&mut *tx)
        .await?;

        queries::insert_state(&mut tx, match_id, batting_team, bowling_team).await?;

        // Zeroed stat rows for every active roster member on both sides.
        for team_id in [match_row.team1_id, match_row.team2_id] {
            let members = roster::get_active_roster(&mut tx, team_id).await?;
            if members.is_empty() {
                tracing::warn!(
                    "Team {} has no active players; scoring will be blocked until its roster is populated",
                    team_id
                );
            }
            for member in &members {
                queries::insert_zeroed_player_stats(&mut tx, match_id, member.user_id, team_id)
                    .await?;
            }
            seed_points_row(&mut tx, match_row.tournament_id, team_id).await?;
        }

        tx.commit().await?;
        tracing::info!("Match {} started, {} batting first", match_id, batting_team);
        self.get_state(match_id).await
    }

    /// Assign the two batsmen for the current innings. Re-assignment before
    /// a ball is bowled corrects the selection; dismissed players are
    /// rejected.
    pub async fn set_batsmen(
        &self,
        match_id: Uuid,
        request: &SetBatsmenRequest,
    ) -> Result<MatchStateSnapshot, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let (match_row, state, tournament) = load_live_match(&mut tx, match_id).await?;
        let mut live = live_state_from(&match_row, &state, tournament.overs_per_match);

        let batting_roster = roster::get_roster_ids(&mut tx, state.current_batting_team).await?;
        let dismissed = roster::get_dismissed(&mut tx, match_id).await?;
        let striker = request.current_striker_id.unwrap_or(request.batsman1_id);
        live.set_batsmen(
            request.batsman1_id,
            request.batsman2_id,
            striker,
            &batting_roster,
            &dismissed,
        )?;

        // A player who joined the roster after the start still needs a row.
        for batsman in [request.batsman1_id, request.batsman2_id] {
            queries::insert_zeroed_player_stats(
                &mut tx,
                match_id,
                batsman,
                state.current_batting_team,
            )
            .await?;
        }

        queries::persist_state(
            &mut tx,
            match_id,
            state.current_batting_team,
            state.current_bowling_team,
            &live,
        )
        .await?;
        tx.commit().await?;
        self.get_state(match_id).await
    }

    /// Assign the bowler for the upcoming over. Required again after every
    /// over boundary; the previous bowler is never carried automatically.
    pub async fn set_bowler(
        &self,
        match_id: Uuid,
        request: &SetBowlerRequest,
    ) -> Result<MatchStateSnapshot, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let (match_row, state, tournament) = load_live_match(&mut tx, match_id).await?;
        let mut live = live_state_from(&match_row, &state, tournament.overs_per_match);

        let bowling_roster = roster::get_roster_ids(&mut tx, state.current_bowling_team).await?;
        live.set_bowler(request.bowler_id, &bowling_roster)?;

        queries::insert_zeroed_player_stats(
            &mut tx,
            match_id,
            request.bowler_id,
            state.current_bowling_team,
        )
        .await?;
        queries::persist_state(
            &mut tx,
            match_id,
            state.current_batting_team,
            state.current_bowling_team,
            &live,
        )
        .await?;
        tx.commit().await?;
        self.get_state(match_id).await
    }

    /// Score one delivery: team total, striker and bowler stats, ball/over
    /// progression, strike rotation and the ledger entry, all or nothing.
    #[tracing::instrument(name = "Add score", skip(self, request), fields(runs = %request.runs))]
    pub async fn add_score(
        &self,
        match_id: Uuid,
        request: &AddScoreRequest,
    ) -> Result<MatchStateSnapshot, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let (match_row, state, tournament) = load_live_match(&mut tx, match_id).await?;
        let mut live = live_state_from(&match_row, &state, tournament.overs_per_match);

        let applied = live.add_score(request.runs, request.expected_sequence)?;

        queries::persist_state(
            &mut tx,
            match_id,
            state.current_batting_team,
            state.current_bowling_team,
            &live,
        )
        .await?;
        queries::bump_match_totals(&mut tx, &match_row, state.current_batting_team, applied.runs, 0)
            .await?;
        queries::credit_striker(&mut tx, match_id, applied.striker, applied.runs).await?;
        queries::credit_bowler(&mut tx, match_id, applied.bowler, applied.runs, 0).await?;
        queries::append_ball_event(
            &mut tx,
            match_id,
            applied.sequence,
            applied.innings_number,
            applied.over_number,
            applied.ball_number,
            BallEventType::Run,
            applied.runs,
            applied.striker,
            Some(applied.non_striker),
            applied.bowler,
            None,
            None,
        )
        .await?;
        tx.commit().await?;
        self.get_state(match_id).await
    }

    /// Take a wicket: the striker is out, the bowler is credited, the
    /// incoming batsman starts at the non-striker's end, and the ball is
    /// consumed like a dot ball.
    #[tracing::instrument(name = "Add wicket", skip(self, request))]
    pub async fn add_wicket(
        &self,
        match_id: Uuid,
        request: &AddWicketRequest,
    ) -> Result<MatchStateSnapshot, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let (match_row, state, tournament) = load_live_match(&mut tx, match_id).await?;
        let mut live = live_state_from(&match_row, &state, tournament.overs_per_match);

        let batting_roster = roster::get_roster_ids(&mut tx, state.current_batting_team).await?;
        let dismissed = roster::get_dismissed(&mut tx, match_id).await?;
        let applied = live.add_wicket(
            request.next_batsman_id,
            &batting_roster,
            &dismissed,
            request.expected_sequence,
        )?;

        if let Some(incoming) = applied.incoming {
            queries::insert_zeroed_player_stats(
                &mut tx,
                match_id,
                incoming,
                state.current_batting_team,
            )
            .await?;
        }
        queries::persist_state(
            &mut tx,
            match_id,
            state.current_batting_team,
            state.current_bowling_team,
            &live,
        )
        .await?;
        queries::bump_match_totals(&mut tx, &match_row, state.current_batting_team, 0, 1).await?;
        queries::mark_batsman_out(&mut tx, match_id, applied.dismissed).await?;
        queries::credit_bowler(&mut tx, match_id, applied.bowler, 0, 1).await?;
        queries::append_ball_event(
            &mut tx,
            match_id,
            applied.sequence,
            applied.innings_number,
            applied.over_number,
            applied.ball_number,
            BallEventType::Wicket,
            0,
            applied.dismissed,
            Some(applied.surviving),
            applied.bowler,
            Some(applied.dismissed),
            applied.incoming,
        )
        .await?;
        tx.commit().await?;
        if applied.all_out {
            tracing::info!("Match {}: batting side is all out", match_id);
        }
        self.get_state(match_id).await
    }

    /// Swap the batting and bowling sides for the second innings. Whether
    /// the first innings is actually over is the operator's decision.
    #[tracing::instrument(name = "Switch innings", skip(self))]
    pub async fn switch_innings(&self, match_id: Uuid) -> Result<MatchStateSnapshot, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let (match_row, state, tournament) = load_live_match(&mut tx, match_id).await?;
        let mut live = live_state_from(&match_row, &state, tournament.overs_per_match);

        let target = live.switch_innings()?;
        queries::persist_state(
            &mut tx,
            match_id,
            state.current_bowling_team,
            state.current_batting_team,
            &live,
        )
        .await?;
        tx.commit().await?;
        tracing::info!(
            "Match {}: innings switched, target {} to chase",
            match_id,
            target
        );
        self.get_state(match_id).await
    }

    /// Complete the match: winner by final totals (equal totals tie),
    /// optional man of the match, career rollup for every participant, and a
    /// wholesale points table recompute for the tournament.
    #[tracing::instrument(name = "Complete match", skip(self, request))]
    pub async fn complete_match(
        &self,
        match_id: Uuid,
        request: &CompleteMatchRequest,
    ) -> Result<TournamentMatch, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let (match_row, state, tournament) = load_live_match(&mut tx, match_id).await?;
        let live = live_state_from(&match_row, &state, tournament.overs_per_match);
        live.ensure_completable()?;

        if let Some(mom) = request.man_of_the_match_player_id {
            let played: Option<(Uuid,)> = sqlx::query_as(
                "SELECT id FROM match_player_stats WHERE match_id = $1 AND player_id = $2",
            )
            .bind(match_id)
            .bind(mom)
            .fetch_optional(&mut *tx)
            .await?;
            if played.is_none() {
                return Err(ScoringError::NotFound(
                    "man of the match player".to_string(),
                ));
            }
        }

        let winner = decide_winner(
            match_row.team1_id,
            match_row.team2_id,
            match_row.team1_runs,
            match_row.team2_runs,
        );

        sqlx::query(
            r#"
            UPDATE tournament_matches SET
                status = 'completed',
                is_completed = true,
                winner_team_id = $2,
                man_of_the_match = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(match_id)
        .bind(winner)
        .bind(request.man_of_the_match_player_id)
        .execute(&mut *tx)
        .await?;

        StatsService::rollup_careers_in_tx(&mut tx, match_id).await?;

        if let Some(mom) = request.man_of_the_match_player_id {
            sqlx::query(
                r#"
                INSERT INTO achievements (id, player_id, title, description, awarded_at)
                VALUES ($1, $2, $3, $4, NOW())
                ON CONFLICT (player_id, title) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(mom)
            .bind(format!("Man of the Match - {}", tournament.name))
            .bind(format!(
                "Man of the Match in match {} of {}",
                match_row.match_number, tournament.name
            ))
            .execute(&mut *tx)
            .await?;
        }

        PointsService::recompute_in_tx(
            &mut tx,
            tournament.id,
            tournament.overs_per_match,
            &PointsConfig::from(&self.scoring),
        )
        .await?;

        tx.commit().await?;
        tracing::info!(
            "Match {} completed; winner: {}",
            match_id,
            winner.map(|w| w.to_string()).unwrap_or_else(|| "tie".to_string())
        );
        queries::get_match(&self.pool, match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound("match".to_string()))
    }

    /// Cancel an in-progress match. Terminal: its stat rows are excluded
    /// from every aggregate and the points table is untouched.
    #[tracing::instrument(name = "Cancel match", skip(self))]
    pub async fn cancel_match(&self, match_id: Uuid) -> Result<TournamentMatch, ScoringError> {
        let mut tx = self.pool.begin().await?;
        let match_row = queries::get_match_for_update(&mut tx, match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound("match".to_string()))?;
        if match_row.status != MatchStatus::InProgress {
            return Err(ScoringError::InvalidStateTransition(format!(
                "match is {}, only an in-progress match can be cancelled",
                match_row.status
            )));
        }
        queries::set_match_status(&mut tx, match_id, MatchStatus::Cancelled).await?;
        tx.commit().await?;
        tracing::info!("Match {} cancelled; no stats were recorded", match_id);
        queries::get_match(&self.pool, match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound("match".to_string()))
    }

    /// Current scoreboard snapshot. Readable in any state, including after
    /// completion or cancellation.
    pub async fn get_state(&self, match_id: Uuid) -> Result<MatchStateSnapshot, ScoringError> {
        let match_row = queries::get_match(&self.pool, match_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound("match".to_string()))?;
        let state = queries::get_state(&self.pool, match_id)
            .await?
            .ok_or_else(|| {
                ScoringError::InvalidStateTransition(
                    "match has not been started".to_string(),
                )
            })?;
        let tournament = get_tournament(&self.pool, match_row.tournament_id)
            .await?
            .ok_or_else(|| ScoringError::NotFound("tournament".to_string()))?;
        Ok(build_snapshot(&match_row, state, tournament.overs_per_match))
    }

    /// Ball-by-ball ledger, oldest first.
    pub async fn get_events(
        &self,
        match_id: Uuid,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<BallEvent>, i64), ScoringError> {
        if queries::get_match(&self.pool, match_id).await?.is_none() {
            return Err(ScoringError::NotFound("match".to_string()));
        }
        let offset = (page - 1) * limit;
        let events = queries::get_ball_events(&self.pool, match_id, limit, offset).await?;
        let total = queries::count_ball_events(&self.pool, match_id).await?;
        Ok((events, total))
    }
}

/// Lock and load the match, its live state and its tournament for a mutating
/// scoring operation. Rejects matches that are not in progress.
async fn load_live_match(
    conn: &mut PgConnection,
    match_id: Uuid,
) -> Result<(TournamentMatch, MatchState, Tournament), ScoringError> {
    let match_row = queries::get_match_for_update(conn, match_id)
        .await?
        .ok_or_else(|| ScoringError::NotFound("match".to_string()))?;
    if match_row.status != MatchStatus::InProgress {
        return Err(ScoringError::InvalidStateTransition(format!(
            "match is {}, not in progress",
            match_row.status
        )));
    }
    let state = queries::get_state_for_update(conn, match_id)
        .await?
        .ok_or_else(|| ScoringError::InvalidStateTransition(
            "match has not been started".to_string(),
        ))?;
    let tournament = get_tournament_in_tx(conn, match_row.tournament_id)
        .await?
        .ok_or_else(|| ScoringError::NotFound("tournament".to_string()))?;
    Ok((match_row, state, tournament))
}

fn live_state_from(
    match_row: &TournamentMatch,
    state: &MatchState,
    overs_per_match: i32,
) -> LiveState {
    let batting_is_team1 = state.current_batting_team == match_row.team1_id;
    LiveState {
        innings_number: state.innings_number,
        current_over: state.current_over,
        current_ball: state.current_ball,
        batsman1: state.batsman1,
        batsman2: state.batsman2,
        current_striker: state.current_striker,
        current_bowler: state.current_bowler,
        batting_runs: if batting_is_team1 {
            match_row.team1_runs
        } else {
            match_row.team2_runs
        },
        batting_wickets: if batting_is_team1 {
            match_row.team1_wickets
        } else {
            match_row.team2_wickets
        },
        total_balls_bowled: state.total_balls_bowled,
        target_runs: state.target_runs,
        overs_per_match,
    }
}

fn build_snapshot(
    match_row: &TournamentMatch,
    state: MatchState,
    overs_per_match: i32,
) -> MatchStateSnapshot {
    let batting_is_team1 = state.current_batting_team == match_row.team1_id;
    let (batting_runs, batting_wickets, bowling_runs, bowling_wickets) = if batting_is_team1 {
        (
            match_row.team1_runs,
            match_row.team1_wickets,
            match_row.team2_runs,
            match_row.team2_wickets,
        )
    } else {
        (
            match_row.team2_runs,
            match_row.team2_wickets,
            match_row.team1_runs,
            match_row.team1_wickets,
        )
    };
    MatchStateSnapshot {
        state,
        batting_runs,
        batting_wickets,
        bowling_runs,
        bowling_wickets,
        overs_per_match,
        match_status: match_row.status,
    }
}

async fn get_tournament(pool: &PgPool, id: Uuid) -> Result<Option<Tournament>, sqlx::Error> {
    sqlx::query_as::<_, Tournament>("SELECT * FROM tournaments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

async fn get_tournament_in_tx(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Tournament>, sqlx::Error> {
    sqlx::query_as::<_, Tournament>("SELECT * FROM tournaments WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

async fn seed_points_row(
    conn: &mut PgConnection,
    tournament_id: Uuid,
    team_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tournament_points (
            id, tournament_id, team_id,
            matches_played, matches_won, matches_lost, matches_tied,
            points, net_run_rate, last_updated
        ) VALUES ($1, $2, $3, 0, 0, 0, 0, 0, 0, NOW())
        ON CONFLICT (tournament_id, team_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(tournament_id)
    .bind(team_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
