use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::auth::Claims;
use crate::models::team::{AddTeamMemberRequest, CreateTeamRequest, RosterMember, Team};

/// Create a team. The roster starts empty; players are added one by one.
#[tracing::instrument(
    name = "Create team",
    skip(team_request, pool, claims),
    fields(
        team_name = %team_request.team_name,
        user = %claims.username
    )
)]
pub async fn create_team(
    team_request: web::Json<CreateTeamRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;

    if let Err(validation_error) = team_request.validate() {
        tracing::warn!("Team creation validation failed: {}", validation_error);
        return Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": validation_error
        })));
    }

    let owner_id = match claims.user_id() {
        Some(id) => id,
        None => {
            tracing::error!("Invalid user ID in claims");
            return Ok(HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": "Invalid user ID"
            })));
        }
    };

    let team_name = team_request.sanitized_name();
    match sqlx::query_as::<_, (Uuid,)>(
        "SELECT id FROM teams WHERE LOWER(team_name) = LOWER($1)",
    )
    .bind(&team_name)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(json!({
                "success": false,
                "message": "Team name already taken"
            })));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!("Database error checking team name: {}", e);
            return Ok(HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to check team name availability"
            })));
        }
    }

    let team = sqlx::query_as::<_, Team>(
        r#"
        INSERT INTO teams (id, team_name, team_color, owner_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&team_name)
    .bind(&team_request.team_color)
    .bind(owner_id)
    .bind(Utc::now())
    .fetch_one(pool.get_ref())
    .await;

    match team {
        Ok(team) => {
            tracing::info!("Team '{}' created by {}", team.team_name, claims.username);
            Ok(HttpResponse::Created().json(json!({
                "success": true,
                "data": team
            })))
        }
        Err(e) => {
            tracing::error!("Failed to create team: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to create team"
            })))
        }
    }
}

/// Add a player to a team's active roster.
pub async fn add_team_member(
    path: web::Path<Uuid>,
    request: web::Json<AddTeamMemberRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let team_id = path.into_inner();

    let team: Option<(Uuid,)> = match sqlx::query_as("SELECT id FROM teams WHERE id = $1")
        .bind(team_id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(team) => team,
        Err(e) => {
            tracing::error!("Database error looking up team {}: {}", team_id, e);
            return Ok(HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to look up team"
            })));
        }
    };
    if team.is_none() {
        return Ok(HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "Team not found"
        })));
    }

    let user: Option<(Uuid,)> = match sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(request.user_id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Database error looking up user {}: {}", request.user_id, e);
            return Ok(HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to look up user"
            })));
        }
    };
    if user.is_none() {
        return Ok(HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "User not found"
        })));
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO team_members (id, team_id, user_id, status, joined_at)
        VALUES ($1, $2, $3, 'active', NOW())
        ON CONFLICT (team_id, user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(team_id)
    .bind(request.user_id)
    .execute(pool.get_ref())
    .await;

    match inserted {
        Ok(result) if result.rows_affected() == 0 => {
            Ok(HttpResponse::Conflict().json(json!({
                "success": false,
                "message": "User is already on this team"
            })))
        }
        Ok(_) => {
            tracing::info!("User {} added to team {}", request.user_id, team_id);
            Ok(HttpResponse::Created().json(json!({
                "success": true,
                "message": "Player added to roster"
            })))
        }
        Err(e) => {
            tracing::error!("Failed to add team member: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to add team member"
            })))
        }
    }
}

/// Active roster of a team.
pub async fn get_team_members(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let team_id = path.into_inner();
    let members = sqlx::query_as::<_, RosterMember>(
        r#"
        SELECT u.id AS user_id, u.username
        FROM team_members tm
        JOIN users u ON u.id = tm.user_id
        WHERE tm.team_id = $1 AND tm.status = 'active'
        ORDER BY u.username
        "#,
    )
    .bind(team_id)
    .fetch_all(pool.get_ref())
    .await;

    match members {
        Ok(members) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "total_count": members.len(),
            "data": members
        }))),
        Err(e) => {
            tracing::error!("Failed to get team members for {}: {}", team_id, e);
            Ok(HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to get team members"
            })))
        }
    }
}
