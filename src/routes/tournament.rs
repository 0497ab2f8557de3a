// src/routes/tournament.rs
use actix_web::{get, post, web, HttpResponse, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::handlers::tournament::{stats_handler, tournament_handler};
use crate::middleware::auth::Claims;
use crate::models::tournament::{AddTournamentTeamRequest, CreateTournamentRequest};

/// Create a tournament (manager/admin only)
#[post("")]
async fn create_tournament(
    request: web::Json<CreateTournamentRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    tournament_handler::create_tournament(request, pool, claims).await
}

/// List tournaments (managers see their own)
#[get("")]
async fn list_tournaments(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    tournament_handler::list_tournaments(pool, claims).await
}

/// Register a team in a tournament
#[post("/{tournament_id}/add-team")]
async fn add_team(
    path: web::Path<Uuid>,
    request: web::Json<AddTournamentTeamRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    tournament_handler::add_team(path, request, pool, claims).await
}

/// Start a tournament: upcoming -> ongoing
#[post("/{tournament_id}/start")]
async fn start_tournament(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    tournament_handler::start_tournament(path, pool, claims).await
}

/// End a tournament: ongoing -> completed, awards achievements
#[post("/{tournament_id}/end")]
async fn end_tournament(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    tournament_handler::end_tournament(path, pool, claims).await
}

/// List a tournament's matches
#[get("/{tournament_id}/matches")]
async fn list_matches(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    tournament_handler::list_matches(path, pool).await
}

/// Tournament standings
#[get("/{tournament_id}/points-table")]
async fn get_points_table(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    stats_handler::get_points_table(path, pool).await
}

/// Tournament leaderboard (top scorer, most wickets, most MoM awards)
#[get("/{tournament_id}/leaderboard")]
async fn get_leaderboard(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    stats_handler::get_leaderboard(path, pool).await
}
