// src/routes/matches.rs
use actix_web::{get, post, web, HttpResponse, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::settings::ScoringSettings;
use crate::handlers::tournament::{match_handler, scoring_handler, stats_handler};
use crate::middleware::auth::Claims;
use crate::models::match_event::EventsQuery;
use crate::models::tournament_match::{
    AddScoreRequest, AddWicketRequest, CompleteMatchRequest, CreateMatchRequest,
    SetBatsmenRequest, SetBowlerRequest, StartMatchRequest,
};

/// Schedule a new match between two tournament teams
#[post("")]
async fn create_match(
    request: web::Json<CreateMatchRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::create_match(request, pool, claims).await
}

/// Start a scheduled match: record the toss, create live state and stat rows
#[post("/{match_id}/start")]
async fn start_match(
    path: web::Path<Uuid>,
    request: web::Json<StartMatchRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::start_match(path, request, pool, scoring, claims).await
}

/// Set the two batsmen and the striker for the current innings
#[post("/{match_id}/set-batsmen")]
async fn set_batsmen(
    path: web::Path<Uuid>,
    request: web::Json<SetBatsmenRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    scoring_handler::set_batsmen(path, request, pool, scoring, claims).await
}

/// Set the bowler for the upcoming over
#[post("/{match_id}/set-bowler")]
async fn set_bowler(
    path: web::Path<Uuid>,
    request: web::Json<SetBowlerRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    scoring_handler::set_bowler(path, request, pool, scoring, claims).await
}

/// Score one delivery (0-6 runs)
#[post("/{match_id}/score")]
async fn add_score(
    path: web::Path<Uuid>,
    request: web::Json<AddScoreRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    scoring_handler::add_score(path, request, pool, scoring, claims).await
}

/// Take a wicket and bring in the next batsman
#[post("/{match_id}/wicket")]
async fn add_wicket(
    path: web::Path<Uuid>,
    request: web::Json<AddWicketRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    scoring_handler::add_wicket(path, request, pool, scoring, claims).await
}

/// Swap batting and bowling sides for the second innings
#[post("/{match_id}/switch-innings")]
async fn switch_innings(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    scoring_handler::switch_innings(path, pool, scoring, claims).await
}

/// Complete the match: winner, man of the match, career and points rollups
#[post("/{match_id}/complete")]
async fn complete_match(
    path: web::Path<Uuid>,
    request: web::Json<CompleteMatchRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::complete_match(path, request, pool, scoring, claims).await
}

/// Cancel an in-progress match; no stats are recorded
#[post("/{match_id}/cancel")]
async fn cancel_match(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    match_handler::cancel_match(path, pool, scoring, claims).await
}

/// Current scoreboard snapshot
#[get("/{match_id}/state")]
async fn get_match_state(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
) -> Result<HttpResponse> {
    match_handler::get_match_state(path, pool, scoring).await
}

/// Per-player stats for a match
#[get("/{match_id}/player-stats")]
async fn get_match_player_stats(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    stats_handler::get_match_player_stats(path, pool).await
}

/// Ball-by-ball ledger
#[get("/{match_id}/events")]
async fn get_match_events(
    path: web::Path<Uuid>,
    query: web::Query<EventsQuery>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
) -> Result<HttpResponse> {
    scoring_handler::get_match_events(path, query, pool, scoring).await
}
