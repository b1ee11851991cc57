use serde::{ Serialize, Deserialize };
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    Start,
    Bleeding,
    End,
}

impl PeriodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodStatus::Start => "start",
            PeriodStatus::Bleeding => "bleeding",
            PeriodStatus::End => "end",
        }
    }

    // Unknown strings from storage are dropped, not fatal.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "start" => Some(PeriodStatus::Start),
            "bleeding" => Some(PeriodStatus::Bleeding),
            "end" => Some(PeriodStatus::End),
            _ => None,
        }
    }
}

/// Display tag for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    Start,
    Bleeding,
    End,
    NoEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regularity {
    Stable,
    Irregular,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OvulationSigns {
    #[serde(default)]
    pub estimated: Option<NaiveDate>,
    #[serde(default)]
    pub mucus: Option<String>,
    #[serde(default)]
    pub libido: Option<String>,
    #[serde(default)]
    pub energy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextFactors {
    #[serde(default)]
    pub stress: Option<String>,
    #[serde(default)]
    pub sleep: Option<String>,
    #[serde(default)]
    pub exercise: Option<String>,
    #[serde(default)]
    pub illness: Option<String>,
    #[serde(default)]
    pub travel: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default)]
    pub meds: Option<String>,
}

/// One logged day. At most one per (user, date); later saves overwrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub date: NaiveDate,
    #[serde(default)]
    pub period_status: Option<PeriodStatus>,
    #[serde(default)]
    pub flow: Option<String>,
    #[serde(default)]
    pub clots: Option<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ovulation: OvulationSigns,
    #[serde(default)]
    pub context: ContextFactors,
}

impl Entry {
    pub fn new(date: NaiveDate) -> Self {
        Entry {
            date,
            period_status: None,
            flow: None,
            clots: None,
            symptoms: Vec::new(),
            notes: None,
            ovulation: OvulationSigns::default(),
            context: ContextFactors::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub average_cycle_length: Option<f64>,
    pub std_deviation: Option<f64>,
    pub regularity: Regularity,
    pub average_period_length: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub next_period_start: NaiveDate,
    pub next_ovulation: NaiveDate,
    pub fertile_window_start: NaiveDate,
    pub fertile_window_end: NaiveDate,
}

/// Run of consecutive logged period days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodSegment {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub length_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TodayPosition {
    pub cycle_day: i64,
    pub in_fertile_window: bool,
    pub period_expected_in_days: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleRow {
    pub cycle_number: i32,
    pub start_date: NaiveDate,
    pub cycle_length: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOverview {
    pub stats: SummaryStats,
    pub prediction: Option<Prediction>,
    pub today: Option<TodayPosition>,
    pub cycles: Vec<CycleRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: DayStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_deserializes_with_missing_optional_fields() {
        // records written before the observational fields existed
        let old_blob = r#"{"date":"2024-03-01","period_status":"start"}"#;
        let entry: Entry = serde_json::from_str(old_blob).unwrap();

        assert_eq!(entry.period_status, Some(PeriodStatus::Start));
        assert!(entry.symptoms.is_empty());
        assert_eq!(entry.ovulation, OvulationSigns::default());
        assert_eq!(entry.context, ContextFactors::default());
    }

    #[test]
    fn period_status_round_trips_through_storage_text() {
        for status in [PeriodStatus::Start, PeriodStatus::Bleeding, PeriodStatus::End] {
            assert_eq!(PeriodStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PeriodStatus::parse("spotting"), None);
    }

    #[test]
    fn day_status_serializes_as_display_tags() {
        assert_eq!(serde_json::to_string(&DayStatus::NoEntry).unwrap(), "\"no-entry\"");
        assert_eq!(serde_json::to_string(&DayStatus::Start).unwrap(), "\"start\"");
    }
}
