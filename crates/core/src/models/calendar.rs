use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One cell of a month grid.
///
/// Padding cells belong to the previous month; they exist only to align the
/// first day under its weekday column and never count towards statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_current_month: bool,
}
