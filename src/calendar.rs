use crate::models::{CalendarData, CalendarEntry, MonthStats, RoutineId, RoutineSummary};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid month {0:?}, expected YYYY-MM")]
pub struct InvalidYearMonth(String);

/// A calendar month, written `YYYY-MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - chrono::Duration::days(i64::from(date.day0())),
        }
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn days(self) -> u32 {
        (28..=31)
            .rev()
            .find(|day| self.first.with_day(*day).is_some())
            .unwrap_or(28)
    }

    pub fn dates(self) -> impl Iterator<Item = NaiveDate> {
        (1..=self.days()).filter_map(move |day| self.first.with_day(day))
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    pub fn previous(self) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(1))
            .and_then(Self::bounded)
    }

    pub fn next(self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(Self::bounded)
    }

    fn bounded(first: NaiveDate) -> Option<Self> {
        (1..=9999).contains(&first.year()).then_some(Self { first })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

impl FromStr for YearMonth {
    type Err = InvalidYearMonth;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
            .ok()
            .and_then(Self::bounded)
            .ok_or_else(|| InvalidYearMonth(raw.to_string()))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = InvalidYearMonth;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<YearMonth> for String {
    fn from(month: YearMonth) -> Self {
        month.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    Completed,
    Scheduled,
    Unscheduled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub state: DayState,
    pub is_today: bool,
    pub value: Option<i64>,
    pub notes: Option<String>,
}

/// One routine's month, laid out as Sunday-first weeks of seven cells.
/// `None` cells pad the first and last week.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub routine_id: RoutineId,
    pub habit_name: String,
    pub month: YearMonth,
    pub title: String,
    pub previous: Option<YearMonth>,
    pub next: Option<YearMonth>,
    pub weeks: Vec<Vec<Option<CalendarDay>>>,
    pub stats: MonthStats,
    pub completion_rate: String,
}

impl CalendarView {
    pub fn build(routine: &RoutineSummary, data: &CalendarData, today: NaiveDate) -> Self {
        let month = data.year_month;
        let entries: HashMap<NaiveDate, &CalendarEntry> = data
            .entries
            .iter()
            .filter(|entry| month.contains(entry.date))
            .map(|entry| (entry.date, entry))
            .collect();
        let scheduled: HashSet<NaiveDate> = data.scheduled_days.iter().copied().collect();

        let leading = month.first_day().weekday().num_days_from_sunday() as usize;
        let mut cells: Vec<Option<CalendarDay>> = vec![None; leading];
        for date in month.dates() {
            let entry = entries.get(&date);
            let state = match entry {
                Some(entry) if entry.completed => DayState::Completed,
                _ if scheduled.contains(&date) => DayState::Scheduled,
                _ => DayState::Unscheduled,
            };
            cells.push(Some(CalendarDay {
                date,
                day: date.day(),
                state,
                is_today: date == today,
                value: entry.and_then(|entry| entry.value),
                notes: entry.and_then(|entry| entry.notes.clone()),
            }));
        }
        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        Self {
            routine_id: routine.id.clone(),
            habit_name: routine.habit_name.clone(),
            month,
            title: month.first_day().format("%B %Y").to_string(),
            previous: month.previous(),
            next: month.next(),
            weeks: cells.chunks(7).map(<[_]>::to_vec).collect(),
            stats: data.stats.clone(),
            completion_rate: format!("{:.1}%", data.stats.completion_rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecurrenceType, TrackingType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(raw: &str) -> YearMonth {
        raw.parse().unwrap()
    }

    fn routine() -> RoutineSummary {
        RoutineSummary {
            id: RoutineId::new("r-read"),
            habit_name: "Read".to_string(),
            tracking_type: TrackingType::Boolean,
            numeric_unit: None,
            recurrence_type: RecurrenceType::Daily,
            specific_days: None,
            nth_day: None,
            nth_week: None,
            target_days: 91,
            total_completions: 10,
            current_streak: 2,
            longest_streak: 4,
            has_used_strike: false,
            start_date: date(2024, 2, 20),
            status: None,
            last_completion_date: None,
        }
    }

    #[test]
    fn parses_and_formats_months() {
        assert_eq!(month("2024-03").to_string(), "2024-03");
        assert_eq!(month("2024-3").first_day(), date(2024, 3, 1));
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("2024-03-05".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
        assert_eq!(YearMonth::of(date(2024, 3, 17)), month("2024-03"));
    }

    #[test]
    fn month_lengths_follow_the_calendar() {
        assert_eq!(month("2024-02").days(), 29);
        assert_eq!(month("2023-02").days(), 28);
        assert_eq!(month("2024-04").days(), 30);
        assert_eq!(month("2024-12").days(), 31);
        assert_eq!(month("2024-01").previous(), Some(month("2023-12")));
        assert_eq!(month("2024-12").next(), Some(month("2025-01")));
        assert_eq!(month("9999-12").next(), None);
    }

    #[test]
    fn grid_starts_on_sunday_and_marks_days() {
        let data = CalendarData {
            routine_id: RoutineId::new("r-read"),
            year_month: month("2024-03"),
            entries: vec![
                CalendarEntry {
                    date: date(2024, 3, 1),
                    completed: true,
                    value: None,
                    notes: Some("chapter 3".to_string()),
                },
                CalendarEntry {
                    date: date(2024, 2, 29),
                    completed: true,
                    value: None,
                    notes: None,
                },
            ],
            scheduled_days: month("2024-03").dates().collect(),
            stats: MonthStats {
                total_days: 31,
                completed_days: 1,
                completion_rate: 3.2258,
            },
        };

        let view = CalendarView::build(&routine(), &data, date(2024, 3, 2));
        assert_eq!(view.title, "March 2024");
        assert_eq!(view.completion_rate, "3.2%");
        // 2024-03-01 is a Friday: five blanks, 31 days, padded to six weeks.
        assert_eq!(view.weeks.len(), 6);
        assert!(view.weeks.iter().all(|week| week.len() == 7));
        assert!(view.weeks[0][..5].iter().all(Option::is_none));

        let first = view.weeks[0][5].as_ref().unwrap();
        assert_eq!(first.day, 1);
        assert_eq!(first.state, DayState::Completed);
        assert_eq!(first.notes.as_deref(), Some("chapter 3"));

        let second = view.weeks[0][6].as_ref().unwrap();
        assert_eq!(second.state, DayState::Scheduled);
        assert!(second.is_today);

        let days: Vec<&CalendarDay> = view.weeks.iter().flatten().flatten().collect();
        assert_eq!(days.len(), 31);
        assert_eq!(
            days.iter().filter(|day| day.state == DayState::Completed).count(),
            1
        );
    }

    #[test]
    fn unscheduled_days_outside_the_routine() {
        let data = CalendarData {
            routine_id: RoutineId::new("r-read"),
            year_month: month("2024-02"),
            entries: Vec::new(),
            scheduled_days: (20..=29).map(|day| date(2024, 2, day)).collect(),
            stats: MonthStats::default(),
        };
        let view = CalendarView::build(&routine(), &data, date(2024, 3, 2));
        let days: Vec<&CalendarDay> = view.weeks.iter().flatten().flatten().collect();
        assert_eq!(days[0].state, DayState::Unscheduled);
        assert_eq!(days[19].state, DayState::Scheduled);
        assert!(days.iter().all(|day| !day.is_today));
    }
}
