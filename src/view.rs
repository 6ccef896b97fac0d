use crate::models::{RecurrenceType, RoutineId, RoutineSummary, StatisticsSummary, TrackingType};
use crate::mutator::ControlHint;
use crate::reconciler::{ListSnapshot, ListStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTone {
    Confirmation,
    Error,
}

/// Inline message shown next to the control that triggered a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub date: NaiveDate,
    pub tone: FeedbackTone,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlState {
    MarkComplete,
    Done,
    MarkedDone,
    AlreadyDone,
    Unmarked,
}

impl ControlState {
    fn resolve(completed: bool, hint: Option<ControlHint>) -> Self {
        match hint {
            Some(ControlHint::MarkedDone) => ControlState::MarkedDone,
            Some(ControlHint::AlreadyDone) => ControlState::AlreadyDone,
            Some(ControlHint::Unmarked) => ControlState::Unmarked,
            None if completed => ControlState::Done,
            None => ControlState::MarkComplete,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlState::MarkComplete | ControlState::Unmarked => "✓ Mark Complete",
            ControlState::Done => "✓ Done!",
            ControlState::MarkedDone => "✓ Marked! Well done!",
            ControlState::AlreadyDone => "✓ Already done",
        }
    }

    pub fn shows_done(self) -> bool {
        matches!(
            self,
            ControlState::Done | ControlState::MarkedDone | ControlState::AlreadyDone
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutineView {
    pub id: RoutineId,
    pub habit_name: String,
    pub tracking_type: TrackingType,
    pub numeric_unit: Option<String>,
    pub recurrence: String,
    pub target_days: u32,
    pub total_completions: u32,
    pub progress_percent: u32,
    pub days_remaining: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub strike_used: bool,
    /// Straight from the completion index.
    pub completed: bool,
    pub control: ControlState,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatCards {
    pub active_routines: u32,
    pub completed_routines: u32,
    pub longest_streak: u32,
    pub total_completions: u32,
    pub completion_rate: String,
    pub consistency_score: String,
}

impl StatCards {
    fn from_summary(stats: &StatisticsSummary) -> Self {
        Self {
            active_routines: stats.routines.active,
            completed_routines: stats.routines.completed,
            longest_streak: stats.streaks.all_time_longest,
            total_completions: stats.streaks.total_completions,
            completion_rate: format!("{:.0}%", stats.overall_completion_rate),
            consistency_score: stats
                .consistency_score
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub date: NaiveDate,
    pub date_label: String,
    pub is_today: bool,
    pub days_ago: u32,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub loaded: bool,
    pub status: ListStatus,
    pub banner: Option<String>,
    pub stats: Option<StatCards>,
    pub routines: Vec<RoutineView>,
}

impl DashboardView {
    pub fn build(
        snapshot: &ListSnapshot,
        hints: &HashMap<RoutineId, ControlHint>,
        feedback: &HashMap<RoutineId, Feedback>,
    ) -> Self {
        let window = &snapshot.window;
        let date = window.current();
        let routines = snapshot
            .routines
            .iter()
            .map(|routine| {
                let completed = snapshot.is_completed(&routine.id);
                RoutineView {
                    id: routine.id.clone(),
                    habit_name: routine.habit_name.clone(),
                    tracking_type: routine.tracking_type,
                    numeric_unit: routine.numeric_unit.clone(),
                    recurrence: recurrence_label(routine),
                    target_days: routine.target_days,
                    total_completions: routine.total_completions,
                    progress_percent: progress_percent(routine.total_completions, routine.target_days),
                    days_remaining: days_remaining(routine.total_completions, routine.target_days),
                    current_streak: routine.current_streak,
                    longest_streak: routine.longest_streak,
                    strike_used: routine.has_used_strike,
                    completed,
                    control: ControlState::resolve(completed, hints.get(&routine.id).copied()),
                    feedback: feedback
                        .get(&routine.id)
                        .filter(|feedback| feedback.date == date)
                        .cloned(),
                }
            })
            .collect();

        Self {
            date,
            date_label: date_label(window.days_ago()),
            is_today: window.is_today(),
            days_ago: window.days_ago(),
            can_go_back: window.can_go_back(),
            can_go_forward: window.can_go_forward(),
            loaded: snapshot.loaded,
            banner: banner(&snapshot.status, snapshot.loaded),
            status: snapshot.status.clone(),
            stats: snapshot.statistics.as_ref().map(StatCards::from_summary),
            routines,
        }
    }
}

/// Share of the target reached, rounded to a whole percent and capped at 100.
pub fn progress_percent(total_completions: u32, target_days: u32) -> u32 {
    if target_days == 0 {
        return 100;
    }
    let percent = (f64::from(total_completions) / f64::from(target_days) * 100.0).round();
    percent.min(100.0) as u32
}

pub fn days_remaining(total_completions: u32, target_days: u32) -> u32 {
    target_days.saturating_sub(total_completions)
}

pub fn date_label(days_ago: u32) -> String {
    match days_ago {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n => format!("{n} days ago"),
    }
}

pub fn recurrence_label(routine: &RoutineSummary) -> String {
    match routine.recurrence_type {
        RecurrenceType::Daily => "Every day".to_string(),
        RecurrenceType::Weekdays => "Monday - Friday".to_string(),
        RecurrenceType::Weekends => "Saturday - Sunday".to_string(),
        RecurrenceType::SpecificDays => match routine.specific_days.as_deref() {
            Some(days) if !days.is_empty() => days.join(", "),
            _ => "Custom schedule".to_string(),
        },
        RecurrenceType::NthDayOfMonth => match (&routine.nth_day, routine.nth_week) {
            (Some(day), Some(week)) => format!("{} {} of the month", ordinal(week), title_case(day)),
            _ => "Monthly".to_string(),
        },
        RecurrenceType::TimesPerWeek1 => "Once a week".to_string(),
        RecurrenceType::TimesPerWeek3 => "3 times per week".to_string(),
        RecurrenceType::TimesPerWeek4 => "4 times per week".to_string(),
        RecurrenceType::TimesPerWeek5 => "5 times per week".to_string(),
        RecurrenceType::TimesPerWeek6 => "6 times per week".to_string(),
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn banner(status: &ListStatus, loaded: bool) -> Option<String> {
    match status {
        ListStatus::Loading | ListStatus::Ready => None,
        ListStatus::ReloadFailed { message } if loaded => {
            Some(format!("Couldn't refresh your routines ({message}). Showing the last known list."))
        }
        ListStatus::ReloadFailed { message } => Some(format!("Couldn't load your routines: {message}")),
        ListStatus::CompletionsUnknown { message } => Some(format!(
            "Couldn't check which routines are done for this day ({message})."
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_window::DateWindow;
    use std::collections::BTreeSet;

    fn routine(id: &str, recurrence_type: RecurrenceType) -> RoutineSummary {
        RoutineSummary {
            id: RoutineId::new(id),
            habit_name: "Meditate".to_string(),
            tracking_type: TrackingType::Boolean,
            numeric_unit: None,
            recurrence_type,
            specific_days: None,
            nth_day: None,
            nth_week: None,
            target_days: 91,
            total_completions: 45,
            current_streak: 3,
            longest_streak: 10,
            has_used_strike: false,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            status: None,
            last_completion_date: None,
        }
    }

    #[test]
    fn progress_for_45_of_91() {
        assert_eq!(progress_percent(45, 91), 49);
        assert_eq!(days_remaining(45, 91), 46);
    }

    #[test]
    fn progress_is_capped() {
        assert_eq!(progress_percent(120, 91), 100);
        assert_eq!(days_remaining(120, 91), 0);
        assert_eq!(progress_percent(0, 0), 100);
    }

    #[test]
    fn recurrence_labels() {
        assert_eq!(recurrence_label(&routine("a", RecurrenceType::Weekdays)), "Monday - Friday");
        assert_eq!(recurrence_label(&routine("a", RecurrenceType::SpecificDays)), "Custom schedule");

        let mut monthly = routine("a", RecurrenceType::NthDayOfMonth);
        monthly.nth_day = Some("MONDAY".to_string());
        monthly.nth_week = Some(2);
        assert_eq!(recurrence_label(&monthly), "2nd Monday of the month");
    }

    #[test]
    fn completion_comes_from_snapshot_and_hint_only_changes_control() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let snapshot = ListSnapshot {
            window: DateWindow::open(today),
            routines: vec![routine("a", RecurrenceType::Daily), routine("b", RecurrenceType::Daily)],
            statistics: None,
            completed: BTreeSet::from([RoutineId::new("a")]),
            loaded: true,
            status: ListStatus::Ready,
        };
        let hints = HashMap::from([(RoutineId::new("b"), ControlHint::MarkedDone)]);

        let view = DashboardView::build(&snapshot, &hints, &HashMap::new());
        assert_eq!(view.date_label, "Today");
        assert!(view.routines[0].completed);
        assert_eq!(view.routines[0].control, ControlState::Done);
        assert!(!view.routines[1].completed);
        assert_eq!(view.routines[1].control, ControlState::MarkedDone);
        assert!(view.banner.is_none());
    }

    #[test]
    fn initial_failure_is_blank_with_message() {
        let snapshot = ListSnapshot {
            window: DateWindow::open(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            routines: Vec::new(),
            statistics: None,
            completed: BTreeSet::new(),
            loaded: false,
            status: ListStatus::ReloadFailed {
                message: "Network error: refused".to_string(),
            },
        };
        let view = DashboardView::build(&snapshot, &HashMap::new(), &HashMap::new());
        assert!(view.routines.is_empty());
        assert!(view.banner.unwrap().starts_with("Couldn't load your routines"));
    }
}
