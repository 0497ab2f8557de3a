use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::settings::ScoringSettings;
use crate::handlers::tournament::error_response;
use crate::middleware::auth::Claims;
use crate::models::tournament_match::{
    CompleteMatchRequest, CreateMatchRequest, StartMatchRequest,
};
use crate::tournament::{MatchService, TournamentService};

pub async fn create_match(
    request: web::Json<CreateMatchRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let service = TournamentService::new(pool.get_ref().clone());
    match service.create_match(&request).await {
        Ok(match_row) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": match_row
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn start_match(
    path: web::Path<Uuid>,
    request: web::Json<StartMatchRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.start_match(match_id, &request).await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Match started",
            "data": snapshot
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn complete_match(
    path: web::Path<Uuid>,
    request: web::Json<CompleteMatchRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.complete_match(match_id, &request).await {
        Ok(match_row) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Match completed",
            "data": match_row
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn cancel_match(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.cancel_match(match_id).await {
        Ok(match_row) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Match cancelled, no stats were recorded",
            "data": match_row
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_match_state(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.get_state(match_id).await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": snapshot
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
