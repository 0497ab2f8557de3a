// src/routes/team.rs
use actix_web::{get, post, web, HttpResponse, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::handlers::team_handler;
use crate::middleware::auth::Claims;
use crate::models::team::{AddTeamMemberRequest, CreateTeamRequest};

/// Create a new team
#[post("")]
async fn create_team(
    team_request: web::Json<CreateTeamRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    team_handler::create_team(team_request, pool, claims).await
}

/// Add a player to a team's roster
#[post("/{team_id}/members")]
async fn add_team_member(
    path: web::Path<Uuid>,
    request: web::Json<AddTeamMemberRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    team_handler::add_team_member(path, request, pool, claims).await
}

/// Get a team's active roster
#[get("/{team_id}/members")]
async fn get_team_members(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    team_handler::get_team_members(path, pool).await
}
