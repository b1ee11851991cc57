use axum::{Router, routing::post, Json, extract::State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::store;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub pin: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub created: bool,
}

pub fn routes(pool: PgPool) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(pool)
}

// Find-or-create with a per-device convenience PIN. Not real access control.
async fn login(
    State(pool): State<PgPool>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Username must not be blank".into()));
    }

    let existing = store::find_user(&pool, username).await.map_err(|e| {
        tracing::error!("❌ DB error in login: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "DB error".into())
    })?;

    if let Some(user) = existing {
        if user.pin.is_some() && user.pin != body.pin {
            return Err((StatusCode::UNAUTHORIZED, "Wrong PIN".into()));
        }
        return Ok(Json(LoginResponse {
            user_id: user.id,
            username: user.username,
            created: false,
        }));
    }

    let user = store::create_user(&pool, username, body.pin.as_deref())
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                tracing::error!("❌ Failed to create user: {}", db_err.message());
            } else {
                tracing::error!("❌ Unknown DB error: {}", e);
            }
            (StatusCode::UNPROCESSABLE_ENTITY, "Could not create user".into())
        })?;

    tracing::info!("👤 New user {}", user.username);

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        created: true,
    }))
}
