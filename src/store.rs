use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ContextFactors, Entry, OvulationSigns, PeriodStatus};

/// User record as stored. The PIN never leaves this layer.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub pin: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    entry_date: NaiveDate,
    period_status: Option<String>,
    flow: Option<String>,
    clots: Option<String>,
    symptoms: Vec<String>,
    notes: Option<String>,
    ovulation: Option<Json<OvulationSigns>>,
    context: Option<Json<ContextFactors>>,
}

impl From<EntryRow> for Entry {
    fn from(row: EntryRow) -> Self {
        Entry {
            date: row.entry_date,
            period_status: row.period_status.as_deref().and_then(PeriodStatus::parse),
            flow: row.flow,
            clots: row.clots,
            symptoms: row.symptoms,
            notes: row.notes,
            ovulation: row.ovulation.map(|j| j.0).unwrap_or_default(),
            context: row.context.map(|j| j.0).unwrap_or_default(),
        }
    }
}

pub async fn find_user(pool: &PgPool, username: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(
        "SELECT id, username, pin, created_at FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    pin: Option<&str>,
) -> Result<UserRecord, sqlx::Error> {
    sqlx::query_as::<_, UserRecord>(
        "INSERT INTO users (username, pin) VALUES ($1, $2) RETURNING id, username, pin, created_at",
    )
    .bind(username)
    .bind(pin)
    .fetch_one(pool)
    .await
}

pub async fn load_entries(pool: &PgPool, user_id: Uuid) -> Result<Vec<Entry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EntryRow>(
        "SELECT entry_date, period_status, flow, clots, symptoms, notes, ovulation, context
         FROM entries
         WHERE user_id = $1
         ORDER BY entry_date ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Entry::from).collect())
}

/// Upsert keyed by (user, date): saving the same day twice overwrites.
pub async fn save_entry(pool: &PgPool, user_id: Uuid, entry: &Entry) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO entries
             (user_id, entry_date, period_status, flow, clots, symptoms, notes, ovulation, context)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (user_id, entry_date) DO UPDATE SET
             period_status = EXCLUDED.period_status,
             flow = EXCLUDED.flow,
             clots = EXCLUDED.clots,
             symptoms = EXCLUDED.symptoms,
             notes = EXCLUDED.notes,
             ovulation = EXCLUDED.ovulation,
             context = EXCLUDED.context,
             updated_at = now()",
    )
    .bind(user_id)
    .bind(entry.date)
    .bind(entry.period_status.map(|s| s.as_str()))
    .bind(&entry.flow)
    .bind(&entry.clots)
    .bind(&entry.symptoms)
    .bind(&entry.notes)
    .bind(Json(&entry.ovulation))
    .bind(Json(&entry.context))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_entry(
    pool: &PgPool,
    user_id: Uuid,
    entry_date: NaiveDate,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM entries WHERE user_id = $1 AND entry_date = $2")
        .bind(user_id)
        .bind(entry_date)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_all_entries(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM entries WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    #[ignore = "needs a running Postgres via DATABASE_URL"]
    async fn entries_round_trip_with_last_write_wins() {
        let pool = test_pool().await;
        let user = create_user(&pool, &format!("roundtrip-{}", Uuid::new_v4()), None)
            .await
            .unwrap();

        let mut first = Entry::new(date("2024-01-01"));
        first.period_status = Some(PeriodStatus::Start);
        first.notes = Some("morning".into());
        save_entry(&pool, user.id, &first).await.unwrap();

        // same date again: overwrites instead of duplicating
        let mut second = first.clone();
        second.notes = Some("evening".into());
        second.symptoms = vec!["cramps".into()];
        save_entry(&pool, user.id, &second).await.unwrap();

        let loaded = load_entries(&pool, user.id).await.unwrap();
        assert_eq!(loaded, vec![second]);

        assert_eq!(delete_entry(&pool, user.id, date("2024-01-01")).await.unwrap(), 1);
        assert!(load_entries(&pool, user.id).await.unwrap().is_empty());
    }
}
