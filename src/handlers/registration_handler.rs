use actix_web::{web, HttpResponse};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{RegistrationRequest, UserRole, UserStatus};
use crate::utils::password::hash_password;

#[tracing::instrument(
    name = "Adding a new user",
    // Don't show arguments
    skip(user_form, pool),
    fields(
        username = %user_form.username,
        email = %user_form
    )
)]
pub async fn register_user(
    user_form: web::Json<RegistrationRequest>,
    pool: web::Data<PgPool>,
) -> HttpResponse {
    match insert_user(&user_form, &pool).await {
        Ok(user_id) => HttpResponse::Ok().json(json!({
            "success": true,
            "user_id": user_id
        })),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return HttpResponse::Conflict().json(json!({
                        "success": false,
                        "message": "Username or email already taken"
                    }));
                }
            }
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub async fn insert_user(
    user_form: &web::Json<RegistrationRequest>,
    pool: &PgPool,
) -> Result<Uuid, sqlx::Error> {
    let user_id = Uuid::new_v4();
    let role = user_form.role.unwrap_or(UserRole::Player);

    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, email, role, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(user_id)
    .bind(&user_form.username)
    .bind(hash_password(user_form.password.expose_secret()))
    .bind(&user_form.email)
    .bind(role.as_str())
    .bind(UserStatus::Active.as_str())
    .bind(Utc::now())
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to execute user insert query: {:?}", e);
        e
    })?;

    Ok(user_id)
}
