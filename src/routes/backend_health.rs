use actix_web::{get, HttpResponse};
use serde_json::json;

#[get("/backend_health")]
async fn backend_health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok"
    }))
}
