use chrono::{Days, NaiveDate};

use crate::models::journal::TradeStore;
use crate::models::record::TradeRecord;
use crate::models::stats::{StatsSnapshot, StatsWindow};

/// Length of the trailing window used for weekly figures, today included.
pub const WEEKLY_WINDOW_DAYS: u64 = 7;

/// Computes journal statistics: totals, win rate, streaks.
///
/// Pure functions of the store and the evaluation day. No I/O, no caching.
pub struct StatsService;

impl StatsService {
    pub fn new() -> Self {
        Self
    }

    /// First day of the trailing weekly window ending at `today`.
    pub fn week_start(today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(WEEKLY_WINDOW_DAYS - 1))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Records inside `window`, oldest first.
    pub fn filter<'a>(
        &self,
        store: &'a TradeStore,
        window: StatsWindow,
        today: NaiveDate,
    ) -> &'a [TradeRecord] {
        match window {
            StatsWindow::Daily => store.records_in_range(today, today),
            StatsWindow::Weekly => store.records_in_range(Self::week_start(today), today),
            StatsWindow::Monthly { month, year } => store.records_in_month(year, month),
            StatsWindow::All => store.records(),
        }
    }

    /// Full statistics for one window.
    ///
    /// `weekly_profit` is always the trailing-seven-day total, independent
    /// of `window`.
    pub fn snapshot(
        &self,
        store: &TradeStore,
        window: StatsWindow,
        today: NaiveDate,
    ) -> StatsSnapshot {
        let records = self.filter(store, window, today);

        let total = Self::sum(records);
        let traded_days = records.iter().filter(|r| r.is_traded()).count();
        let wins = records.iter().filter(|r| r.is_win()).count();
        let losses = records.iter().filter(|r| r.is_loss()).count();

        StatsSnapshot {
            total,
            traded_days,
            wins,
            losses,
            win_rate: Self::win_rate(wins, traded_days),
            max_win_streak: Self::max_win_streak(records),
            weekly_profit: self.weekly_profit(store, today),
        }
    }

    /// Total P&L over the trailing seven days ending at `today`.
    pub fn weekly_profit(&self, store: &TradeStore, today: NaiveDate) -> f64 {
        Self::sum(self.filter(store, StatsWindow::Weekly, today))
    }

    /// Total P&L for a calendar month.
    pub fn monthly_total(&self, store: &TradeStore, year: i32, month: u32) -> f64 {
        Self::sum(store.records_in_month(year, month))
    }

    /// P&L recorded for a single day, 0 when nothing was recorded.
    pub fn daily_pnl(&self, store: &TradeStore, date: NaiveDate) -> f64 {
        store.get(date).map(|r| r.pnl).unwrap_or(0.0)
    }

    /// Percentage of traded days that were wins, rounded to one decimal.
    pub fn win_rate(wins: usize, traded_days: usize) -> f64 {
        if traded_days == 0 {
            return 0.0;
        }
        let rate = wins as f64 / traded_days as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }

    /// Longest run of winning days, scanning in date order.
    ///
    /// A loss resets the run; a zero day neither extends nor breaks it, so
    /// "no trade" is distinguished from "losing trade".
    pub fn max_win_streak(records: &[TradeRecord]) -> usize {
        Self::streaks(records).0
    }

    /// Run of winning days still open at the end of the window.
    pub fn current_win_streak(
        &self,
        store: &TradeStore,
        window: StatsWindow,
        today: NaiveDate,
    ) -> usize {
        Self::streaks(self.filter(store, window, today)).1
    }

    /// Most profitable day in the window, if any day was a win.
    pub fn best_day<'a>(
        &self,
        store: &'a TradeStore,
        window: StatsWindow,
        today: NaiveDate,
    ) -> Option<&'a TradeRecord> {
        self.filter(store, window, today)
            .iter()
            .filter(|r| r.is_win())
            .max_by(|a, b| a.pnl.total_cmp(&b.pnl))
    }

    /// Worst losing day in the window, if any day was a loss.
    pub fn worst_day<'a>(
        &self,
        store: &'a TradeStore,
        window: StatsWindow,
        today: NaiveDate,
    ) -> Option<&'a TradeRecord> {
        self.filter(store, window, today)
            .iter()
            .filter(|r| r.is_loss())
            .min_by(|a, b| a.pnl.total_cmp(&b.pnl))
    }

    /// Round to whole cents, mapping negative zero to zero.
    /// Every aggregate passes through here (0.3 - 0.1 - 0.2 must total 0).
    pub fn round_cents(value: f64) -> f64 {
        let rounded = (value * 100.0).round() / 100.0;
        if rounded == 0.0 {
            0.0
        } else {
            rounded
        }
    }

    fn sum(records: &[TradeRecord]) -> f64 {
        Self::round_cents(records.iter().map(|r| r.pnl).sum())
    }

    /// (max, final) streak over the records in ascending date order.
    fn streaks(records: &[TradeRecord]) -> (usize, usize) {
        let mut ordered: Vec<&TradeRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.date);

        let mut current = 0;
        let mut max = 0;
        for record in ordered {
            if record.is_win() {
                current += 1;
                max = max.max(current);
            } else if record.is_loss() {
                current = 0;
            }
        }
        (max, current)
    }
}

impl Default for StatsService {
    fn default() -> Self {
        Self::new()
    }
}
