use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::handlers::tournament::error_response;
use crate::middleware::auth::Claims;
use crate::models::tournament::{AddTournamentTeamRequest, CreateTournamentRequest};
use crate::tournament::TournamentService;

#[tracing::instrument(
    name = "Create tournament",
    skip(request, pool, claims),
    fields(
        tournament_name = %request.name,
        user = %claims.username
    )
)]
pub async fn create_tournament(
    request: web::Json<CreateTournamentRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    if let Err(validation_error) = request.validate() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": validation_error
        })));
    }
    let created_by = match claims.user_id() {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": "Invalid user ID"
            })));
        }
    };

    let service = TournamentService::new(pool.get_ref().clone());
    match service.create_tournament(created_by, &request).await {
        Ok(tournament) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": tournament
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_tournaments(
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    let user_id = claims.user_id().unwrap_or_else(Uuid::nil);
    let service = TournamentService::new(pool.get_ref().clone());
    match service.list_tournaments(claims.role, user_id).await {
        Ok(tournaments) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "total_count": tournaments.len(),
            "data": tournaments
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn add_team(
    path: web::Path<Uuid>,
    request: web::Json<AddTournamentTeamRequest>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let tournament_id = path.into_inner();
    let service = TournamentService::new(pool.get_ref().clone());
    match service.add_team(tournament_id, &request).await {
        Ok(entry) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": entry
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn start_tournament(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let tournament_id = path.into_inner();
    let service = TournamentService::new(pool.get_ref().clone());
    match service.start_tournament(tournament_id).await {
        Ok(tournament) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tournament
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn end_tournament(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let tournament_id = path.into_inner();
    let service = TournamentService::new(pool.get_ref().clone());
    match service.end_tournament(tournament_id).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn list_matches(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let tournament_id = path.into_inner();
    let service = TournamentService::new(pool.get_ref().clone());
    match service.list_matches(tournament_id).await {
        Ok(matches) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "total_count": matches.len(),
            "data": matches
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
