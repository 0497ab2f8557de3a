// src/routes/players.rs
use actix_web::{get, web, HttpResponse, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::handlers::tournament::stats_handler;

/// Career aggregates for a player dashboard
#[get("/{player_id}/career-stats")]
async fn get_career_stats(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    stats_handler::get_career_stats(path, pool).await
}

/// Awards earned by a player
#[get("/{player_id}/achievements")]
async fn get_achievements(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    stats_handler::get_achievements(path, pool).await
}
