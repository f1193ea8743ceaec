use chrono::{Datelike, Days, NaiveDate};

use crate::errors::CoreError;
use crate::models::calendar::CalendarDay;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Builds month grids for the calendar view.
///
/// Weeks start on Monday (ISO numbering, Monday = 1 .. Sunday = 7).
pub struct CalendarService;

impl CalendarService {
    pub fn new() -> Self {
        Self
    }

    /// Dates covering `month`, left-padded with the previous month's trailing
    /// days so the first entry is a Monday.
    ///
    /// Returns exactly `padding + days_in_month` entries: the final week is
    /// not filled out.
    pub fn month_grid(&self, year: i32, month: u32) -> Result<Vec<CalendarDay>, CoreError> {
        let first = Self::first_of_month(year, month)?;
        let days = Self::days_in_month(year, month)?;
        let padding = first.weekday().number_from_monday() - 1;

        let start = first
            .checked_sub_days(Days::new(u64::from(padding)))
            .ok_or_else(|| {
                CoreError::ValidationError(format!("Month {year}-{month:02} is out of range"))
            })?;

        let grid = start
            .iter_days()
            .take((padding + days) as usize)
            .map(|date| CalendarDay {
                date,
                in_current_month: date.month() == month && date.year() == year,
            })
            .collect();

        Ok(grid)
    }

    /// Split a grid into rows of seven. The last row may be shorter.
    pub fn weeks(grid: &[CalendarDay]) -> Vec<&[CalendarDay]> {
        grid.chunks(7).collect()
    }

    pub fn days_in_month(year: i32, month: u32) -> Result<u32, CoreError> {
        let first = Self::first_of_month(year, month)?;
        let (next_year, next_month) = Self::next_month(year, month);
        let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(|| {
            CoreError::ValidationError(format!("Month {year}-{month:02} is out of range"))
        })?;
        Ok((next_first - first).num_days() as u32)
    }

    /// English month name for a 1-based month ("January" .. "December").
    pub fn month_name(month: u32) -> Result<&'static str, CoreError> {
        month
            .checked_sub(1)
            .and_then(|idx| MONTH_NAMES.get(idx as usize))
            .copied()
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "Invalid month {month}: must be between 1 and 12"
                ))
            })
    }

    /// (year, month) before the given one, wrapping across years.
    pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
        if month <= 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        }
    }

    /// (year, month) after the given one, wrapping across years.
    pub fn next_month(year: i32, month: u32) -> (i32, u32) {
        if month >= 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        }
    }

    fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::ValidationError(format!(
                "Invalid month {month}: must be between 1 and 12"
            )));
        }
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CoreError::ValidationError(format!("Month {year}-{month:02} is out of range"))
        })
    }
}

impl Default for CalendarService {
    fn default() -> Self {
        Self::new()
    }
}
