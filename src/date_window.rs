use chrono::{Duration, Local, NaiveDate};

/// How far back the dashboard lets a practitioner backfill completions.
pub const MAX_DAYS_BACK: i64 = 5;

/// The calendar day being viewed, bounded to `[today - MAX_DAYS_BACK, today]`.
///
/// Dates are `NaiveDate`: plain local calendar days with no time-of-day or
/// offset, so stepping never drifts across midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    today: NaiveDate,
    selected: NaiveDate,
}

impl DateWindow {
    pub fn open_today() -> Self {
        Self::open(Local::now().date_naive())
    }

    pub fn open(today: NaiveDate) -> Self {
        Self {
            today,
            selected: today,
        }
    }

    pub fn current(&self) -> NaiveDate {
        self.selected
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn floor(&self) -> NaiveDate {
        self.today - Duration::days(MAX_DAYS_BACK)
    }

    pub fn go_back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.selected -= Duration::days(1);
        true
    }

    pub fn go_forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.selected += Duration::days(1);
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.selected > self.floor()
    }

    pub fn can_go_forward(&self) -> bool {
        self.selected < self.today
    }

    pub fn is_today(&self) -> bool {
        self.selected == self.today
    }

    pub fn days_ago(&self) -> u32 {
        (self.today - self.selected).num_days().max(0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn every_day_in_window_is_reachable() {
        for target in 0..=MAX_DAYS_BACK {
            let mut window = DateWindow::open(today());
            for _ in 0..target {
                assert!(window.go_back());
            }
            assert_eq!(window.current(), today() - Duration::days(target));
            assert_eq!(window.days_ago() as i64, target);

            for _ in 0..target {
                assert!(window.go_forward());
            }
            assert!(window.is_today());
        }
    }

    #[test]
    fn floor_and_ceiling_are_inclusive_and_sticky() {
        let mut window = DateWindow::open(today());
        assert!(!window.go_forward());
        assert_eq!(window.current(), today());

        while window.go_back() {}
        assert_eq!(window.current(), NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
        assert!(!window.go_back());
        assert_eq!(window.current(), window.floor());
        assert_eq!(window.days_ago(), 5);
    }

    #[test]
    fn stepping_crosses_month_and_leap_day() {
        let mut window = DateWindow::open(today());
        assert!(window.go_back());
        assert_eq!(window.current(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(!window.is_today());
    }
}
