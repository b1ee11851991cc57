use axum::{extract::{State, Query}, Json, Router, routing::get};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CalendarDay, CalendarMonth};
use crate::{stats, store};

#[derive(Deserialize)]
pub struct CalendarQuery {
    user_id: Uuid,
    year: i32,
    month: u32,
}

pub fn routes(pool: PgPool) -> Router {
    Router::new()
        .route("/calendar", get(get_calendar))
        .with_state(pool)
}

// One status tag per day of the requested month, for grid rendering.
async fn get_calendar(
    State(pool): State<PgPool>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarMonth>, (StatusCode, String)> {
    let Some(days) = month_days(query.year, query.month) else {
        return Err((StatusCode::BAD_REQUEST, "Invalid year/month".into()));
    };

    let entries = store::load_entries(&pool, query.user_id).await.map_err(|e| {
        tracing::error!("❌ DB error in get_calendar: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "DB error".into())
    })?;

    let by_date = stats::entries_by_date(&entries);
    let days = days
        .into_iter()
        .map(|date| CalendarDay {
            date,
            status: stats::classify_day(date, &by_date),
        })
        .collect();

    Ok(Json(CalendarMonth {
        year: query.year,
        month: query.month,
        days,
    }))
}

fn month_days(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    Some(first.iter_days().take_while(|day| *day < next_month).collect())
}
