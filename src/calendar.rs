//! Holiday and weekend lookup for a date range.
//!
//! The aggregation engine never consults the calendar. It is merged in by the
//! report layer, which needs a continuous day axis rather than only the dates
//! that carry time entries.

use crate::error::{HarvestReportError, Result};
use crate::schema::{HolidayDefinition, ReportConfig};
use crate::utils::{days_in_range, is_weekend};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub trait HolidayCalendar {
    fn region(&self) -> &str;

    fn holiday_name(&self, date: NaiveDate) -> Option<&str>;

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
}

/// A static public-holiday list for one region.
#[derive(Debug, Clone, Default)]
pub struct FixedHolidayCalendar {
    region: String,
    holidays: BTreeMap<NaiveDate, String>,
    years: Option<(i32, i32)>,
}

impl FixedHolidayCalendar {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            holidays: BTreeMap::new(),
            years: None,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        let mut calendar = Self::new(config.holiday_region.clone())
            .with_holidays(config.holidays.iter().cloned());

        if let Some((first, last)) = config.holiday_years {
            calendar = calendar.with_years(first, last)?;
        }

        Ok(calendar)
    }

    pub fn with_holidays<I>(mut self, holidays: I) -> Self
    where
        I: IntoIterator<Item = HolidayDefinition>,
    {
        for holiday in holidays {
            self.holidays.insert(holiday.date, holiday.name);
        }
        self
    }

    /// Restricts the calendar to an inclusive span of years.
    pub fn with_years(mut self, first: i32, last: i32) -> Result<Self> {
        if first > last {
            return Err(HarvestReportError::InvalidDateRange {
                start: first.to_string(),
                end: last.to_string(),
            });
        }
        self.years = Some((first, last));
        Ok(self)
    }

    /// Whether the holiday list is known to cover `date`. Calendars without a
    /// year span cover everything.
    pub fn covers(&self, date: NaiveDate) -> bool {
        match self.years {
            Some((first, last)) => (first..=last).contains(&date.year()),
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }
}

impl HolidayCalendar for FixedHolidayCalendar {
    fn region(&self) -> &str {
        &self.region
    }

    fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        if !self.covers(date) {
            return None;
        }
        self.holidays.get(&date).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_holiday: bool,
    pub is_weekend: bool,
    pub holiday_name: Option<String>,
}

/// One row per calendar day from `start` to `end` inclusive, no gaps.
pub fn annotate(calendar: &dyn HolidayCalendar, start: NaiveDate, end: NaiveDate) -> Vec<CalendarDay> {
    days_in_range(start, end)
        .into_iter()
        .map(|date| {
            let holiday_name = calendar.holiday_name(date).map(str::to_string);
            CalendarDay {
                date,
                is_holiday: holiday_name.is_some(),
                is_weekend: is_weekend(date),
                holiday_name,
            }
        })
        .collect()
}
