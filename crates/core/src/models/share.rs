use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

/// Period covered by a share card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Timeframe::Daily),
            "weekly" => Ok(Timeframe::Weekly),
            "monthly" => Ok(Timeframe::Monthly),
            other => Err(CoreError::ValidationError(format!(
                "Unknown timeframe '{other}': expected daily, weekly or monthly"
            ))),
        }
    }
}

/// What the share card should summarize. Pure renderer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfiguration {
    pub timeframe: Timeframe,
    /// 1-based month shown on monthly cards and used in the file name
    pub month: u32,
    pub year: i32,
}

impl ShareConfiguration {
    pub fn new(timeframe: Timeframe, month: u32, year: i32) -> Result<Self, CoreError> {
        if !(1..=12).contains(&month) {
            return Err(CoreError::ValidationError(format!(
                "Invalid month {month}: must be between 1 and 12"
            )));
        }
        Ok(Self {
            timeframe,
            month,
            year,
        })
    }
}
