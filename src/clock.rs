//! Reference clock for relative date keywords.
//!
//! `now`, `today`, `tomorrow`, `today-3` and `this year` need a point of
//! reference. The clock is an immutable value handed to each parser (and
//! to the schema, which hands it to the parsers it builds), so concurrent
//! evaluations stay deterministic; only `Clock::default()` at the outer
//! boundary reads the real system clock.

use chrono::{NaiveDate, NaiveDateTime, Utc};

/// The reference time used when parsing relative date keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    now: NaiveDateTime,
    today: Option<NaiveDate>,
    this_year: Option<i32>,
}

impl Clock {
    /// A clock fixed at the given instant. `today` and `this year` derive
    /// from it unless overridden.
    pub fn fixed(now: NaiveDateTime) -> Self {
        Self {
            now,
            today: None,
            this_year: None,
        }
    }

    /// Override the date `today` resolves to.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Override the year `this year` (and a year-less `mm/dd`) resolves to.
    pub fn with_this_year(mut self, year: i32) -> Self {
        self.this_year = Some(year);
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| self.now.date())
    }

    pub fn this_year(&self) -> i32 {
        use chrono::Datelike;
        self.this_year.unwrap_or_else(|| self.now.year())
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::fixed(Utc::now().naive_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn feb_4_2006() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2006, 2, 4)
            .unwrap()
            .and_hms_opt(0, 30, 15)
            .unwrap()
    }

    #[test]
    fn test_derived_today_and_year() {
        let clock = Clock::fixed(feb_4_2006());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2006, 2, 4).unwrap());
        assert_eq!(clock.this_year(), 2006);
    }

    #[test]
    fn test_overrides() {
        let clock = Clock::fixed(feb_4_2006())
            .with_today(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())
            .with_this_year(2038);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(1999, 12, 31).unwrap());
        assert_eq!(clock.this_year(), 2038);
        assert_eq!(clock.now(), feb_4_2006());
    }
}
