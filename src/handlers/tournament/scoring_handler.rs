//! The ball-by-ball operator endpoints. Thin request/response glue: every
//! rule lives in the scoring engine, every write in the match service.

use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::settings::ScoringSettings;
use crate::handlers::tournament::error_response;
use crate::middleware::auth::Claims;
use crate::models::match_event::EventsQuery;
use crate::models::tournament_match::{
    AddScoreRequest, AddWicketRequest, SetBatsmenRequest, SetBowlerRequest,
};
use crate::tournament::MatchService;

pub async fn set_batsmen(
    path: web::Path<Uuid>,
    request: web::Json<SetBatsmenRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.set_batsmen(match_id, &request).await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": snapshot
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn set_bowler(
    path: web::Path<Uuid>,
    request: web::Json<SetBowlerRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.set_bowler(match_id, &request).await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": snapshot
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn add_score(
    path: web::Path<Uuid>,
    request: web::Json<AddScoreRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.add_score(match_id, &request).await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": snapshot
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn add_wicket(
    path: web::Path<Uuid>,
    request: web::Json<AddWicketRequest>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.add_wicket(match_id, &request).await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": snapshot
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn switch_innings(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse> {
    claims.require_manager()?;
    let match_id = path.into_inner();
    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.switch_innings(match_id).await {
        Ok(snapshot) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Innings switched",
            "data": snapshot
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Ball-by-ball ledger for audit and replay, oldest first.
pub async fn get_match_events(
    path: web::Path<Uuid>,
    query: web::Query<EventsQuery>,
    pool: web::Data<PgPool>,
    scoring: web::Data<ScoringSettings>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(30).clamp(1, 100);

    let service = MatchService::new(pool.get_ref().clone(), scoring.get_ref().clone());
    match service.get_events(match_id, page, limit).await {
        Ok((events, total_count)) => {
            let total_pages = (total_count + limit - 1) / limit;
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": events,
                "pagination": {
                    "page": page,
                    "limit": limit,
                    "total_count": total_count,
                    "total_pages": total_pages,
                    "has_next": page < total_pages,
                    "has_prev": page > 1
                }
            })))
        }
        Err(e) => Ok(error_response(&e)),
    }
}
