use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::models::{DayStatus, Entry, PeriodSegment, PeriodStatus, Prediction, Regularity};

/// Cycles whose lengths vary by more than this are flagged irregular.
pub const IRREGULARITY_THRESHOLD_DAYS: f64 = 4.0;

/// Ovulation is estimated this many days before the next period start.
pub const LUTEAL_PHASE_DAYS: i64 = 14;

const FERTILE_WINDOW_OPEN_DAYS: i64 = 18;
const FERTILE_WINDOW_CLOSE_DAYS: i64 = 12;

/// Distinct period-start dates, ascending.
pub fn start_dates(entries: &[Entry]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = entries
        .iter()
        .filter(|e| e.period_status == Some(PeriodStatus::Start))
        .map(|e| e.date)
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

/// Day-differences between consecutive period starts. Empty when fewer than
/// two starts are logged; every sample is at least 1.
pub fn derive_cycle_samples(entries: &[Entry]) -> Vec<u32> {
    start_dates(entries)
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days() as u32)
        .collect()
}

pub fn average(samples: &[u32]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let total: u64 = samples.iter().map(|&s| u64::from(s)).sum();
    Some(total as f64 / samples.len() as f64)
}

/// Sample standard deviation (Bessel's correction). Needs two samples.
pub fn std_deviation(samples: &[u32]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let mean = average(samples)?;
    let variance = samples
        .iter()
        .map(|&s| {
            let delta = f64::from(s) - mean;
            delta * delta
        })
        .sum::<f64>()
        / (samples.len() - 1) as f64;
    Some(variance.sqrt())
}

pub fn classify_irregularity(std_dev: Option<f64>) -> Regularity {
    match std_dev {
        Some(sd) if sd > IRREGULARITY_THRESHOLD_DAYS => Regularity::Irregular,
        _ => Regularity::Stable,
    }
}

/// Projects the next period start and the dates derived from it. `None`
/// until there is an anchor start date and an average to project with.
pub fn predict_next(
    last_start: Option<NaiveDate>,
    average_cycle: Option<f64>,
) -> Option<Prediction> {
    let last_start = last_start?;
    let average_cycle = average_cycle?;

    let next_period_start = last_start + Duration::days(average_cycle.round() as i64);
    Some(Prediction {
        next_period_start,
        next_ovulation: next_period_start - Duration::days(LUTEAL_PHASE_DAYS),
        fertile_window_start: next_period_start - Duration::days(FERTILE_WINDOW_OPEN_DAYS),
        fertile_window_end: next_period_start - Duration::days(FERTILE_WINDOW_CLOSE_DAYS),
    })
}

/// 1-based day of the current cycle, never below 1.
pub fn cycle_day(today: NaiveDate, last_start: NaiveDate) -> i64 {
    ((today - last_start).num_days() + 1).max(1)
}

pub fn entries_by_date(entries: &[Entry]) -> BTreeMap<NaiveDate, Entry> {
    let mut by_date = BTreeMap::new();
    for entry in entries {
        by_date.insert(entry.date, entry.clone()); // last write wins
    }
    by_date
}

pub fn classify_day(date: NaiveDate, by_date: &BTreeMap<NaiveDate, Entry>) -> DayStatus {
    match by_date.get(&date).and_then(|e| e.period_status) {
        Some(PeriodStatus::Start) => DayStatus::Start,
        Some(PeriodStatus::Bleeding) => DayStatus::Bleeding,
        Some(PeriodStatus::End) => DayStatus::End,
        None => DayStatus::NoEntry,
    }
}

/// Groups consecutive logged period days into segments.
pub fn derive_period_segments(entries: &[Entry]) -> Vec<PeriodSegment> {
    let mut dates: Vec<NaiveDate> = entries
        .iter()
        .filter(|e| e.period_status.is_some())
        .map(|e| e.date)
        .collect();
    dates.sort();
    dates.dedup();

    let mut segments: Vec<PeriodSegment> = vec![];
    let mut current: Vec<NaiveDate> = vec![];

    for (i, date) in dates.iter().enumerate() {
        let is_start = i == 0;
        let prev_date = if i == 0 { None } else { dates.get(i - 1) };
        let gap = prev_date.map(|d| (*date - *d).num_days());

        if is_start || gap == Some(1) {
            current.push(*date);
        } else {
            if !current.is_empty() {
                segments.push(segment_from_run(&current));
                current.clear();
            }
            current.push(*date);
        }
    }

    if !current.is_empty() {
        segments.push(segment_from_run(&current));
    }

    segments
}

fn segment_from_run(run: &[NaiveDate]) -> PeriodSegment {
    let start_date = run[0];
    let end_date = run[run.len() - 1];
    PeriodSegment {
        start_date,
        end_date,
        length_days: (end_date - start_date).num_days() + 1,
    }
}
