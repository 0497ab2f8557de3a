use actix_web::{web, HttpResponse, Result};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::handlers::tournament::error_response;
use crate::models::player_stats::{economy, strike_rate};
use crate::tournament::{PointsService, StatsService};

pub async fn get_points_table(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let tournament_id = path.into_inner();
    let service = PointsService::new(pool.get_ref().clone());
    match service.get_points_table(tournament_id).await {
        Ok(table) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": table
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_leaderboard(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let tournament_id = path.into_inner();
    let service = StatsService::new(pool.get_ref().clone());
    match service.get_leaderboard(tournament_id).await {
        Ok(leaderboard) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": leaderboard
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_match_player_stats(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let match_id = path.into_inner();
    let service = StatsService::new(pool.get_ref().clone());
    match service.get_match_player_stats(match_id).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "total_count": stats.len(),
            "data": stats
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// Career aggregates with derived rates for a player dashboard.
pub async fn get_career_stats(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let player_id = path.into_inner();
    let service = StatsService::new(pool.get_ref().clone());
    match service.get_career_stats(player_id).await {
        Ok(Some(career)) => {
            let batting_average = if career.matches_played > 0 {
                Some(career.runs as f64 / career.matches_played as f64)
            } else {
                None
            };
            let career_strike_rate = strike_rate(career.runs, career.balls_faced);
            let career_economy = economy(career.runs_conceded, career.balls_bowled);
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": {
                    "career": career,
                    "strike_rate": career_strike_rate,
                    "economy": career_economy,
                    "batting_average": batting_average
                }
            })))
        }
        Ok(None) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": null,
            "message": "No completed matches yet"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn get_achievements(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let player_id = path.into_inner();
    let service = StatsService::new(pool.get_ref().clone());
    match service.get_achievements(player_id).await {
        Ok(achievements) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "total_count": achievements.len(),
            "data": achievements
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}
