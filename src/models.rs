use crate::calendar::YearMonth;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutineId(pub String);

impl RoutineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoutineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PractitionerId(pub String);

impl PractitionerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingType {
    #[default]
    Boolean,
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceType {
    Daily,
    Weekdays,
    Weekends,
    SpecificDays,
    NthDayOfMonth,
    #[serde(rename = "TIMES_PER_WEEK_1")]
    TimesPerWeek1,
    #[serde(rename = "TIMES_PER_WEEK_3")]
    TimesPerWeek3,
    #[serde(rename = "TIMES_PER_WEEK_4")]
    TimesPerWeek4,
    #[serde(rename = "TIMES_PER_WEEK_5")]
    TimesPerWeek5,
    #[serde(rename = "TIMES_PER_WEEK_6")]
    TimesPerWeek6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutineStatus {
    Active,
    Paused,
    Completed,
    Abandoned,
    Archived,
}

fn default_target_days() -> u32 {
    91
}

/// Server projection of one routine. Replaced wholesale on every reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineSummary {
    pub id: RoutineId,
    pub habit_name: String,
    #[serde(default)]
    pub tracking_type: TrackingType,
    #[serde(default)]
    pub numeric_unit: Option<String>,
    pub recurrence_type: RecurrenceType,
    #[serde(default)]
    pub specific_days: Option<Vec<String>>,
    #[serde(default)]
    pub nth_day: Option<String>,
    #[serde(default)]
    pub nth_week: Option<u32>,
    #[serde(default = "default_target_days")]
    pub target_days: u32,
    #[serde(default)]
    pub total_completions: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default)]
    pub has_used_strike: bool,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub status: Option<RoutineStatus>,
    #[serde(default)]
    pub last_completion_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineCounts {
    pub active: u32,
    pub total: u32,
    pub completed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakCounts {
    pub current_longest: u32,
    pub all_time_longest: u32,
    pub total_completions: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    #[serde(rename = "last7Days")]
    pub last_7_days: u32,
    #[serde(rename = "last30Days")]
    pub last_30_days: u32,
    pub total_days_practiced: u32,
}

/// Aggregates computed server-side for the statistics cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    #[serde(default)]
    pub routines: RoutineCounts,
    #[serde(default)]
    pub streaks: StreakCounts,
    #[serde(default)]
    pub activity: ActivityCounts,
    #[serde(default)]
    pub overall_completion_rate: f64,
    #[serde(default)]
    pub consistency_score: Option<String>,
}

/// Optional payload attached to a completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPayload {
    pub value: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMutationRequest {
    pub routine_id: RoutineId,
    pub date: NaiveDate,
    pub value: Option<i64>,
    pub notes: Option<String>,
}

/// One dated entry inside a routine's month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthStats {
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub completed_days: u32,
    #[serde(default)]
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarData {
    pub routine_id: RoutineId,
    pub year_month: YearMonth,
    #[serde(default)]
    pub entries: Vec<CalendarEntry>,
    #[serde(default)]
    pub scheduled_days: Vec<NaiveDate>,
    #[serde(default)]
    pub stats: MonthStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_summary_accepts_backend_shape() {
        let json = serde_json::json!({
            "id": "r-1",
            "habitId": "h-1",
            "habitName": "Read",
            "practitionerId": "p-1",
            "recurrenceType": "TIMES_PER_WEEK_3",
            "specificDays": null,
            "targetDays": 91,
            "startDate": "2024-01-01",
            "status": "ACTIVE",
            "currentStreak": 4,
            "longestStreak": 9,
            "totalCompletions": 45,
            "hasUsedStrike": true,
            "lastCompletionDate": "2024-02-29"
        });

        let routine: RoutineSummary = serde_json::from_value(json).unwrap();
        assert_eq!(routine.id.as_str(), "r-1");
        assert_eq!(routine.tracking_type, TrackingType::Boolean);
        assert_eq!(routine.recurrence_type, RecurrenceType::TimesPerWeek3);
        assert_eq!(routine.total_completions, 45);
        assert!(routine.has_used_strike);
    }

    #[test]
    fn statistics_use_backend_field_names() {
        let stats: StatisticsSummary = serde_json::from_value(serde_json::json!({
            "practitionerId": "p-1",
            "routines": { "active": 2, "total": 3, "completed": 1 },
            "streaks": { "currentLongest": 4, "allTimeLongest": 12, "totalCompletions": 50 },
            "activity": { "last7Days": 6, "last30Days": 20, "totalDaysPracticed": 40 },
            "overallCompletionRate": 87.5,
            "consistencyScore": "A-"
        }))
        .unwrap();
        assert_eq!(stats.routines.active, 2);
        assert_eq!(stats.streaks.all_time_longest, 12);
        assert_eq!(stats.activity.last_7_days, 6);
        assert_eq!(stats.consistency_score.as_deref(), Some("A-"));
    }

    #[test]
    fn calendar_data_uses_backend_field_names() {
        let data: CalendarData = serde_json::from_value(serde_json::json!({
            "routineId": "r-1",
            "yearMonth": "2024-02",
            "entries": [
                { "date": "2024-02-29", "completed": true, "value": null, "notes": "leap" }
            ],
            "scheduledDays": ["2024-02-28", "2024-02-29"],
            "stats": { "totalDays": 29, "completedDays": 1, "completionRate": 50.0 }
        }))
        .unwrap();
        assert_eq!(data.year_month.to_string(), "2024-02");
        assert_eq!(data.entries[0].notes.as_deref(), Some("leap"));
        assert_eq!(data.scheduled_days.len(), 2);
        assert_eq!(data.stats.total_days, 29);

        let bad = serde_json::from_value::<CalendarData>(serde_json::json!({
            "routineId": "r-1",
            "yearMonth": "2024-02-01"
        }));
        assert!(bad.is_err());
    }
}
