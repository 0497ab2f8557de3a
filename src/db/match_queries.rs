//! Row access for the live scoring path. Mutations run on a transaction
//! connection so one match's scoring operations serialize on the
//! `FOR UPDATE` row locks taken here.

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::match_event::{BallEvent, BallEventType};
use crate::models::match_state::MatchState;
use crate::models::tournament_match::{MatchStatus, TournamentMatch};
use crate::scoring::LiveState;

pub async fn get_match(pool: &PgPool, match_id: Uuid) -> Result<Option<TournamentMatch>, sqlx::Error> {
    sqlx::query_as::<_, TournamentMatch>(
        "SELECT * FROM tournament_matches WHERE id = $1"
    )
    .bind(match_id)
    .fetch_optional(pool)
    .await
}

/// Lock the match row for the duration of the transaction. Every mutating
/// scoring operation goes through this, so concurrent submissions for the
/// same match queue up instead of interleaving.
pub async fn get_match_for_update(
    conn: &mut PgConnection,
    match_id: Uuid,
) -> Result<Option<TournamentMatch>, sqlx::Error> {
    sqlx::query_as::<_, TournamentMatch>(
        "SELECT * FROM tournament_matches WHERE id = $1 FOR UPDATE"
    )
    .bind(match_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn get_state(pool: &PgPool, match_id: Uuid) -> Result<Option<MatchState>, sqlx::Error> {
    sqlx::query_as::<_, MatchState>(
        "SELECT * FROM match_states WHERE match_id = $1"
    )
    .bind(match_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_state_for_update(
    conn: &mut PgConnection,
    match_id: Uuid,
) -> Result<Option<MatchState>, sqlx::Error> {
    sqlx::query_as::<_, MatchState>(
        "SELECT * FROM match_states WHERE match_id = $1 FOR UPDATE"
    )
    .bind(match_id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_state(
    conn: &mut PgConnection,
    match_id: Uuid,
    batting_team: Uuid,
    bowling_team: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO match_states (
            id, match_id, current_batting_team, current_bowling_team,
            innings_number, current_over, current_ball, total_balls_bowled,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, 1, 0, 0, 0, $5, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(match_id)
    .bind(batting_team)
    .bind(bowling_team)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Write the engine state back to the row. Team assignment only changes on
/// the innings switch, so it is passed explicitly.
pub async fn persist_state(
    conn: &mut PgConnection,
    match_id: Uuid,
    batting_team: Uuid,
    bowling_team: Uuid,
    live: &LiveState,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE match_states SET
            current_batting_team = $2,
            current_bowling_team = $3,
            innings_number = $4,
            current_over = $5,
            current_ball = $6,
            batsman1 = $7,
            batsman2 = $8,
            current_striker = $9,
            current_bowler = $10,
            total_balls_bowled = $11,
            target_runs = $12,
            updated_at = $13
        WHERE match_id = $1
        "#,
    )
    .bind(match_id)
    .bind(batting_team)
    .bind(bowling_team)
    .bind(live.innings_number)
    .bind(live.current_over)
    .bind(live.current_ball)
    .bind(live.batsman1)
    .bind(live.batsman2)
    .bind(live.current_striker)
    .bind(live.current_bowler)
    .bind(live.total_balls_bowled)
    .bind(live.target_runs)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Add one ball's outcome to the batting side's match totals.
pub async fn bump_match_totals(
    conn: &mut PgConnection,
    match_row: &TournamentMatch,
    batting_team: Uuid,
    runs: i32,
    wickets: i32,
) -> Result<(), sqlx::Error> {
    let sql = if batting_team == match_row.team1_id {
        r#"
        UPDATE tournament_matches SET
            team1_runs = team1_runs + $2,
            team1_wickets = team1_wickets + $3,
            team1_balls = team1_balls + 1,
            updated_at = NOW()
        WHERE id = $1
        "#
    } else {
        r#"
        UPDATE tournament_matches SET
            team2_runs = team2_runs + $2,
            team2_wickets = team2_wickets + $3,
            team2_balls = team2_balls + 1,
            updated_at = NOW()
        WHERE id = $1
        "#
    };
    sqlx::query(sql)
        .bind(match_row.id)
        .bind(runs)
        .bind(wickets)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn set_match_status(
    conn: &mut PgConnection,
    match_id: Uuid,
    status: MatchStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE tournament_matches SET status = $2, updated_at = NOW() WHERE id = $1"
    )
    .bind(match_id)
    .bind(status.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn insert_zeroed_player_stats(
    conn: &mut PgConnection,
    match_id: Uuid,
    player_id: Uuid,
    team_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO match_player_stats (
            id, match_id, player_id, team_id,
            runs_scored, balls_faced, fours, sixes,
            wickets_taken, balls_bowled, runs_conceded, is_out,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, 0, 0, 0, 0, 0, 0, 0, false, $5, $5)
        ON CONFLICT (match_id, player_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(match_id)
    .bind(player_id)
    .bind(team_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn credit_striker(
    conn: &mut PgConnection,
    match_id: Uuid,
    player_id: Uuid,
    runs: i32,
) -> Result<(), sqlx::Error> {
    let fours = if runs == 4 { 1 } else { 0 };
    let sixes = if runs == 6 { 1 } else { 0 };
    sqlx::query(
        r#"
        UPDATE match_player_stats SET
            runs_scored = runs_scored + $3,
            balls_faced = balls_faced + 1,
            fours = fours + $4,
            sixes = sixes + $5,
            updated_at = NOW()
        WHERE match_id = $1 AND player_id = $2
        "#,
    )
    .bind(match_id)
    .bind(player_id)
    .bind(runs)
    .bind(fours)
    .bind(sixes)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn credit_bowler(
    conn: &mut PgConnection,
    match_id: Uuid,
    player_id: Uuid,
    runs_conceded: i32,
    wickets: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE match_player_stats SET
            balls_bowled = balls_bowled + 1,
            runs_conceded = runs_conceded + $3,
            wickets_taken = wickets_taken + $4,
            updated_at = NOW()
        WHERE match_id = $1 AND player_id = $2
        "#,
    )
    .bind(match_id)
    .bind(player_id)
    .bind(runs_conceded)
    .bind(wickets)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn mark_batsman_out(
    conn: &mut PgConnection,
    match_id: Uuid,
    player_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE match_player_stats SET
            balls_faced = balls_faced + 1,
            is_out = true,
            updated_at = NOW()
        WHERE match_id = $1 AND player_id = $2
        "#,
    )
    .bind(match_id)
    .bind(player_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn append_ball_event(
    conn: &mut PgConnection,
    match_id: Uuid,
    sequence: i64,
    innings_number: i32,
    over_number: i32,
    ball_number: i32,
    event_type: BallEventType,
    runs: i32,
    striker: Uuid,
    non_striker: Option<Uuid>,
    bowler: Uuid,
    dismissed: Option<Uuid>,
    incoming: Option<Uuid>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO match_events (
            id, match_id, sequence, innings_number, over_number, ball_number,
            event_type, runs, striker_id, non_striker_id, bowler_id,
            dismissed_player_id, incoming_batsman_id, occurred_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(match_id)
    .bind(sequence)
    .bind(innings_number)
    .bind(over_number)
    .bind(ball_number)
    .bind(event_type.as_str())
    .bind(runs)
    .bind(striker)
    .bind(non_striker)
    .bind(bowler)
    .bind(dismissed)
    .bind(incoming)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn get_ball_events(
    pool: &PgPool,
    match_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<BallEvent>, sqlx::Error> {
    sqlx::query_as::<_, BallEvent>(
        r#"
        SELECT * FROM match_events
        WHERE match_id = $1
        ORDER BY sequence ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(match_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_ball_events(pool: &PgPool, match_id: Uuid) -> Result<i64, sqlx::Error> {
    let count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM match_events WHERE match_id = $1"
    )
    .bind(match_id)
    .fetch_one(pool)
    .await?;
    Ok(count.0)
}
