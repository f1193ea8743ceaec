use chrono::{Datelike, NaiveDate, Weekday};

use crate::errors::CoreError;
use crate::models::journal::TradeStore;
use crate::models::record::{TradeRecord, TradeUpdate};

/// P&L cycle used for seeded sample days.
const SAMPLE_PNL: [f64; 7] = [250.0, -120.0, 480.0, 0.0, -75.5, 1320.0, 95.25];

/// Applies journal edits with validation.
///
/// Pure business logic: mutates the in-memory store only. Persistence is the
/// caller's job.
pub struct JournalService;

impl JournalService {
    pub fn new() -> Self {
        Self
    }

    /// Insert or update the record for `date`.
    pub fn upsert(
        &self,
        store: &mut TradeStore,
        date: NaiveDate,
        pnl: f64,
        update: &TradeUpdate,
    ) -> Result<(), CoreError> {
        self.validate(pnl, update)?;
        store.upsert(date, pnl, update);
        Ok(())
    }

    /// Upsert every record, all-or-nothing: if any record fails validation
    /// the store is left untouched.
    pub fn upsert_all(
        &self,
        store: &mut TradeStore,
        records: &[TradeRecord],
    ) -> Result<usize, CoreError> {
        for record in records {
            self.validate(record.pnl, &Self::update_of(record))
                .map_err(|e| match e {
                    CoreError::ValidationError(msg) => {
                        CoreError::ValidationError(format!("{}: {msg}", record.date))
                    }
                    other => other,
                })?;
        }
        for record in records {
            store.upsert(record.date, record.pnl, &Self::update_of(record));
        }
        Ok(records.len())
    }

    /// Synthetic weekday records for the month of `today`, up to `today`.
    /// Used to seed an empty journal when the host asks for sample data.
    pub fn sample_records(&self, today: NaiveDate) -> Vec<TradeRecord> {
        let Some(first) = today.with_day(1) else {
            return Vec::new();
        };

        first
            .iter_days()
            .take_while(|d| *d <= today)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .enumerate()
            .map(|(i, date)| TradeRecord::new(date, SAMPLE_PNL[i % SAMPLE_PNL.len()]))
            .collect()
    }

    fn update_of(record: &TradeRecord) -> TradeUpdate {
        TradeUpdate {
            entry: record.entry,
            stop_loss: record.stop_loss,
            take_profit: record.take_profit,
        }
    }

    /// P&L and levels must be finite: NaN and infinities cannot be persisted.
    fn validate(&self, pnl: f64, update: &TradeUpdate) -> Result<(), CoreError> {
        if !pnl.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "P&L must be a finite number, got {pnl}"
            )));
        }
        if !update.is_finite() {
            return Err(CoreError::ValidationError(
                "Entry, stop-loss and take-profit must be finite numbers".into(),
            ));
        }
        Ok(())
    }
}

impl Default for JournalService {
    fn default() -> Self {
        Self::new()
    }
}
