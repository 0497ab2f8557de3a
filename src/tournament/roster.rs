use std::collections::HashSet;

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::team::RosterMember;

/// Active roster of a team: the players eligible as batsmen or bowlers.
pub async fn get_active_roster(
    conn: &mut PgConnection,
    team_id: Uuid,
) -> Result<Vec<RosterMember>, sqlx::Error> {
    sqlx::query_as::<_, RosterMember>(
        r#"
        SELECT u.id AS user_id, u.username
        FROM team_members tm
        JOIN users u ON u.id = tm.user_id
        WHERE tm.team_id = $1 AND tm.status = 'active'
        ORDER BY u.username
        "#,
    )
    .bind(team_id)
    .fetch_all(&mut *conn)
    .await
}

pub async fn get_roster_ids(
    conn: &mut PgConnection,
    team_id: Uuid,
) -> Result<HashSet<Uuid>, sqlx::Error> {
    let members = get_active_roster(conn, team_id).await?;
    Ok(members.into_iter().map(|m| m.user_id).collect())
}

/// Players already dismissed in this match; they cannot bat again.
pub async fn get_dismissed(
    conn: &mut PgConnection,
    match_id: Uuid,
) -> Result<HashSet<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT player_id FROM match_player_stats WHERE match_id = $1 AND is_out = true",
    )
    .bind(match_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}
