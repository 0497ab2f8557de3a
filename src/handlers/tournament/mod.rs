pub mod match_handler;
pub mod scoring_handler;
pub mod stats_handler;
pub mod tournament_handler;

use actix_web::HttpResponse;
use serde_json::json;

use crate::scoring::ScoringError;

/// Map a scoring-domain error onto the wire. Client mistakes come back with
/// the human-readable reason; database failures are logged and masked.
pub(crate) fn error_response(err: &ScoringError) -> HttpResponse {
    match err {
        ScoringError::NotFound(_) => HttpResponse::NotFound().json(json!({
            "success": false,
            "message": err.to_string()
        })),
        ScoringError::StaleSequence { .. } => HttpResponse::Conflict().json(json!({
            "success": false,
            "message": err.to_string()
        })),
        ScoringError::Database(e) => {
            tracing::error!("Database error: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Internal server error"
            }))
        }
        _ => HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": err.to_string()
        })),
    }
}
