//! Partial-precision date/time literals.
//!
//! A user who types `2006` against a datetime column means "anywhere in
//! 2006", not midnight on January 1st. A literal therefore remembers how
//! precise it was (`Precision`), and the parser widens it into a
//! half-open interval `[literal, literal.plus_one())`.
//!
//! `plus_one` advances by exactly one unit at the literal's own precision
//! with proper calendar carry: `12/2006` rolls to January 2007,
//! `12/31/2006` to New Year's Day, `21:00:59` to `21:01:00`.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// How much of a date/time the user actually wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Precision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// A date/time literal carrying components only up to its precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimePartial {
    pub precision: Precision,
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
}

impl DateTimePartial {
    pub fn year(year: i32) -> Self {
        Self {
            precision: Precision::Year,
            year,
            month: None,
            day: None,
            hour: None,
            minute: None,
            second: None,
        }
    }

    pub fn month(year: i32, month: u32) -> QueryResult<Self> {
        let mut dt = Self::year(year);
        dt.precision = Precision::Month;
        dt.month = Some(month);
        dt.validated()
    }

    pub fn day(year: i32, month: u32, day: u32) -> QueryResult<Self> {
        let mut dt = Self::year(year);
        dt.precision = Precision::Day;
        dt.month = Some(month);
        dt.day = Some(day);
        dt.validated()
    }

    pub fn hour(year: i32, month: u32, day: u32, hour: u32) -> QueryResult<Self> {
        let mut dt = Self::day(year, month, day)?;
        dt.precision = Precision::Hour;
        dt.hour = Some(hour);
        dt.validated()
    }

    pub fn minute(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> QueryResult<Self> {
        let mut dt = Self::hour(year, month, day, hour)?;
        dt.precision = Precision::Minute;
        dt.minute = Some(minute);
        dt.validated()
    }

    pub fn second(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> QueryResult<Self> {
        let mut dt = Self::minute(year, month, day, hour, minute)?;
        dt.precision = Precision::Second;
        dt.second = Some(second);
        dt.validated()
    }

    /// A day-precision literal for a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            precision: Precision::Day,
            year: date.year(),
            month: Some(date.month()),
            day: Some(date.day()),
            hour: None,
            minute: None,
            second: None,
        }
    }

    /// A second-precision literal for an instant.
    pub fn from_datetime(t: NaiveDateTime) -> Self {
        Self {
            precision: Precision::Second,
            year: t.year(),
            month: Some(t.month()),
            day: Some(t.day()),
            hour: Some(t.hour()),
            minute: Some(t.minute()),
            second: Some(t.second()),
        }
    }

    fn validated(self) -> QueryResult<Self> {
        let invalid = || {
            QueryError::syntax(format!(
                "invalid calendar date {}",
                self.to_sql_string()
            ))
        };

        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
            .ok_or_else(invalid)?;
        if self.hour.unwrap_or(0) > 23
            || self.minute.unwrap_or(0) > 59
            || self.second.unwrap_or(0) > 59
        {
            return Err(invalid());
        }
        Ok(self)
    }

    /// The literal one unit later at its own precision, with calendar
    /// carry across month, year and leap-day boundaries.
    pub fn plus_one(&self) -> QueryResult<Self> {
        let overflow = || QueryError::syntax("date out of range");

        match self.precision {
            Precision::Year => Ok(Self {
                year: self.year + 1,
                ..*self
            }),
            Precision::Month => {
                let (mut year, mut month) = (self.year, self.month.unwrap_or(1) + 1);
                if month > 12 {
                    month = 1;
                    year += 1;
                }
                Ok(Self {
                    year,
                    month: Some(month),
                    ..*self
                })
            }
            Precision::Day => {
                let next = self
                    .to_naive()
                    .date()
                    .checked_add_signed(Duration::days(1))
                    .ok_or_else(overflow)?;
                Ok(Self::from_date(next))
            }
            Precision::Hour => self.advanced(Duration::hours(1), Precision::Hour),
            Precision::Minute => self.advanced(Duration::minutes(1), Precision::Minute),
            Precision::Second => self.advanced(Duration::seconds(1), Precision::Second),
        }
    }

    fn advanced(&self, by: Duration, precision: Precision) -> QueryResult<Self> {
        let next = self
            .to_naive()
            .checked_add_signed(by)
            .ok_or_else(|| QueryError::syntax("date out of range"))?;
        let mut dt = Self::from_datetime(next);
        dt.precision = precision;
        if precision < Precision::Second {
            dt.second = None;
        }
        if precision < Precision::Minute {
            dt.minute = None;
        }
        Ok(dt)
    }

    /// The instant at the start of the interval this literal denotes.
    /// Unset components default to January / the 1st / midnight.
    pub fn to_naive(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
            .unwrap_or_default()
            .and_hms_opt(
                self.hour.unwrap_or(0),
                self.minute.unwrap_or(0),
                self.second.unwrap_or(0),
            )
            .unwrap_or_default()
    }

    /// Fixed-width `YYYY-MM-DD HH:MM:SS` form for SQL.
    pub fn to_sql_string(&self) -> String {
        format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year,
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
        )
    }
}
