use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CycleOverview, CycleRow, Entry, SummaryStats, TodayPosition};
use crate::{stats, store};

#[derive(Deserialize)]
pub struct SummaryQuery {
    user_id: Uuid,
}

pub fn routes(pool: PgPool) -> Router {
    Router::new()
        .route("/summary", get(get_summary))
        .with_state(pool)
}

async fn get_summary(
    State(pool): State<PgPool>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<CycleOverview>, StatusCode> {
    let entries = store::load_entries(&pool, query.user_id).await.map_err(|e| {
        tracing::error!("❌ DB error in get_summary: {:?}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let today = chrono::Utc::now().naive_utc().date();

    Ok(Json(build_overview(&entries, today)))
}

/// Derives the whole dashboard payload from a user's entries. Missing data
/// comes back as `None` fields; the client renders placeholders.
pub fn build_overview(entries: &[Entry], today: NaiveDate) -> CycleOverview {
    let samples = stats::derive_cycle_samples(entries);
    let average_cycle = stats::average(&samples);
    let deviation = stats::std_deviation(&samples);

    let period_lengths: Vec<u32> = stats::derive_period_segments(entries)
        .iter()
        .map(|segment| segment.length_days as u32)
        .collect();

    let starts = stats::start_dates(entries);
    let last_start = starts.last().copied();
    let prediction = stats::predict_next(last_start, average_cycle);

    let today_position = last_start.map(|anchor| TodayPosition {
        cycle_day: stats::cycle_day(today, anchor),
        in_fertile_window: prediction
            .map(|p| (p.fertile_window_start..=p.fertile_window_end).contains(&today))
            .unwrap_or(false),
        period_expected_in_days: prediction.map(|p| (p.next_period_start - today).num_days()),
    });

    let cycles = samples
        .iter()
        .enumerate()
        .map(|(i, &length)| CycleRow {
            cycle_number: (i + 1) as i32,
            start_date: starts[i],
            cycle_length: length as i32,
        })
        .collect();

    CycleOverview {
        stats: SummaryStats {
            average_cycle_length: average_cycle,
            std_deviation: deviation,
            regularity: stats::classify_irregularity(deviation),
            average_period_length: stats::average(&period_lengths),
        },
        prediction,
        today: today_position,
        cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodStatus, Regularity};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(s: &str, status: Option<PeriodStatus>) -> Entry {
        let mut e = Entry::new(date(s));
        e.period_status = status;
        e
    }

    #[test]
    fn empty_history_renders_placeholders() {
        let overview = build_overview(&[], date("2024-03-01"));

        assert_eq!(overview.stats.average_cycle_length, None);
        assert_eq!(overview.stats.std_deviation, None);
        assert_eq!(overview.stats.regularity, Regularity::Stable);
        assert_eq!(overview.stats.average_period_length, None);
        assert_eq!(overview.prediction, None);
        assert_eq!(overview.today, None);
        assert!(overview.cycles.is_empty());
    }

    #[test]
    fn single_start_anchors_today_but_not_prediction() {
        let entries = vec![entry("2024-02-24", Some(PeriodStatus::Start))];
        let overview = build_overview(&entries, date("2024-03-01"));

        assert_eq!(overview.prediction, None);
        let today = overview.today.unwrap();
        assert_eq!(today.cycle_day, 7);
        assert!(!today.in_fertile_window);
        assert_eq!(today.period_expected_in_days, None);
    }

    #[test]
    fn full_history_builds_stats_prediction_and_cycle_rows() {
        let entries = vec![
            entry("2024-01-01", Some(PeriodStatus::Start)),
            entry("2024-01-02", Some(PeriodStatus::Bleeding)),
            entry("2024-01-03", Some(PeriodStatus::End)),
            entry("2024-01-29", Some(PeriodStatus::Start)),
            entry("2024-01-30", Some(PeriodStatus::End)),
            entry("2024-02-24", Some(PeriodStatus::Start)),
        ];
        let overview = build_overview(&entries, date("2024-03-01"));

        assert_eq!(overview.stats.average_cycle_length, Some(27.0));
        assert_eq!(overview.stats.regularity, Regularity::Stable);
        assert_eq!(overview.stats.average_period_length, Some(2.0));

        let prediction = overview.prediction.unwrap();
        assert_eq!(prediction.next_period_start, date("2024-03-22"));
        assert_eq!(prediction.next_ovulation, date("2024-03-08"));

        let today = overview.today.unwrap();
        assert_eq!(today.cycle_day, 7);
        assert_eq!(today.period_expected_in_days, Some(21));
        assert!(!today.in_fertile_window);

        assert_eq!(overview.cycles.len(), 2);
        assert_eq!(overview.cycles[0].cycle_number, 1);
        assert_eq!(overview.cycles[0].start_date, date("2024-01-01"));
        assert_eq!(overview.cycles[0].cycle_length, 28);
        assert_eq!(overview.cycles[1].cycle_length, 26);
    }

    #[test]
    fn today_inside_the_projected_fertile_window() {
        let entries = vec![
            entry("2024-01-01", Some(PeriodStatus::Start)),
            entry("2024-01-29", Some(PeriodStatus::Start)),
        ];
        // next start 2024-02-26, window 2024-02-08..2024-02-14
        let overview = build_overview(&entries, date("2024-02-10"));
        assert!(overview.today.unwrap().in_fertile_window);
    }

    #[test]
    fn irregular_history_is_flagged() {
        let entries = vec![
            entry("2024-01-01", Some(PeriodStatus::Start)),
            entry("2024-01-21", Some(PeriodStatus::Start)),
            entry("2024-02-25", Some(PeriodStatus::Start)),
        ];
        let overview = build_overview(&entries, date("2024-03-01"));

        assert_eq!(overview.stats.average_cycle_length, Some(27.5));
        let sd = overview.stats.std_deviation.unwrap();
        assert!((sd - 10.606601717798213).abs() < 1e-9);
        assert_eq!(overview.stats.regularity, Regularity::Irregular);
    }
}
