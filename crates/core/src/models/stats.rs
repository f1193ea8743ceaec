use serde::{Deserialize, Serialize};

use super::share::Timeframe;

/// Date-range filter applied before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsWindow {
    /// Only the evaluation day itself
    Daily,
    /// The trailing seven days, today included
    Weekly,
    /// A calendar month (month is 1-based)
    Monthly { month: u32, year: i32 },
    /// Every record in the journal
    All,
}

impl StatsWindow {
    /// Window matching a share timeframe; `month`/`year` only matter for monthly.
    pub fn for_timeframe(timeframe: Timeframe, month: u32, year: i32) -> Self {
        match timeframe {
            Timeframe::Daily => StatsWindow::Daily,
            Timeframe::Weekly => StatsWindow::Weekly,
            Timeframe::Monthly => StatsWindow::Monthly { month, year },
        }
    }
}

/// Aggregate statistics over one window of the journal.
///
/// Derived data: recomputed from the store on every request, never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Sum of P&L over the window
    pub total: f64,

    /// Days with non-zero P&L
    pub traded_days: usize,

    /// Days with positive P&L
    pub wins: usize,

    /// Days with negative P&L
    pub losses: usize,

    /// wins / traded_days × 100, one decimal; 0 when nothing was traded
    pub win_rate: f64,

    /// Longest run of winning days (zero days hold the run)
    pub max_win_streak: usize,

    /// P&L over the trailing seven days, whatever the window
    pub weekly_profit: f64,
}
