use axum::{
    Router,
    routing::{get, post},
    extract::{State, Query},
    Json,
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Entry;
use crate::store;

#[derive(Deserialize)]
pub struct NewEntry {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub entry: Entry,
}

#[derive(Deserialize)]
pub struct DeleteEntryRequest {
    pub user_id: String,
    pub date: String,
}

#[derive(Deserialize)]
struct UserQuery {
    user_id: Uuid,
}

pub fn routes(pool: PgPool) -> Router {
    Router::new()
        .route("/entry", post(save_entry).delete(delete_entry)) // upsert by date
        .route("/entries", get(list_entries).delete(delete_all_entries))
        .route("/entries/export", get(export_entries))
        .with_state(pool)
}

async fn save_entry(
    State(pool): State<PgPool>,
    Json(body): Json<NewEntry>,
) -> Result<StatusCode, StatusCode> {
    store::save_entry(&pool, body.user_id, &body.entry)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                tracing::error!("❌ DB upsert failed: {}", db_err.message());

                if let Some(code) = db_err.code() {
                    tracing::info!("ℹ️ SQLSTATE code: {}", code);
                }

                if let Some(constraint) = db_err.constraint() {
                    tracing::info!("🔒 Constraint violated: {}", constraint);
                }
            } else {
                tracing::error!("❌ Unknown DB error: {}", e);
            }

            StatusCode::UNPROCESSABLE_ENTITY
        })?;

    Ok(StatusCode::CREATED)
}

async fn delete_entry(
    State(pool): State<PgPool>,
    Json(payload): Json<DeleteEntryRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user_id = match Uuid::parse_str(&payload.user_id) {
        Ok(uuid) => uuid,
        Err(_) => return Err((StatusCode::BAD_REQUEST, "Invalid user_id UUID".into())),
    };

    let entry_date = match NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => return Err((StatusCode::BAD_REQUEST, "Invalid date format (expected YYYY-MM-DD)".into())),
    };

    let result = store::delete_entry(&pool, user_id, entry_date).await;

    match result {
        Ok(n) if n > 0 => Ok(StatusCode::NO_CONTENT),
        Ok(_) => Err((StatusCode::NOT_FOUND, "No entry found".into())),
        Err(e) => {
            eprintln!("❌ DB error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "DB error".into()))
        }
    }
}

async fn list_entries(
    State(pool): State<PgPool>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Entry>>, StatusCode> {
    let entries = store::load_entries(&pool, query.user_id).await.map_err(|e| {
        tracing::error!("❌ Failed to fetch entries: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(entries))
}

// Full history as pretty JSON, for the client's export button.
async fn export_entries(
    State(pool): State<PgPool>,
    Query(query): Query<UserQuery>,
) -> Result<String, StatusCode> {
    let entries = store::load_entries(&pool, query.user_id).await.map_err(|e| {
        tracing::error!("❌ Failed to fetch entries for export: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    serde_json::to_string_pretty(&entries).map_err(|e| {
        tracing::error!("❌ Export serialization failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn delete_all_entries(
    State(pool): State<PgPool>,
    Query(query): Query<UserQuery>,
) -> Result<StatusCode, StatusCode> {
    let removed = store::delete_all_entries(&pool, query.user_id)
        .await
        .map_err(|e| {
            tracing::error!("❌ Failed to delete entries: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    tracing::info!("🧹 Removed {} entries for {}", removed, query.user_id);
    Ok(StatusCode::NO_CONTENT)
}
