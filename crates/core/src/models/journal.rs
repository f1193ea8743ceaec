use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::record::{TradeRecord, TradeUpdate};

/// In-memory collection of trade records, one per date.
///
/// Serializes as a plain JSON array of records, which is exactly the
/// persisted blob format. Records are kept sorted by date so lookups and
/// upserts are binary searches and range queries are contiguous slices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeStore {
    records: Vec<TradeRecord>,
}

impl TradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records in any order.
    /// Later records win when the same date appears more than once.
    pub fn from_records(records: Vec<TradeRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert_record(record);
        }
        store
    }

    /// Insert or update the record for `date`.
    /// Optional levels not supplied in `update` keep their previous values.
    pub fn upsert(&mut self, date: NaiveDate, pnl: f64, update: &TradeUpdate) {
        match self.records.binary_search_by_key(&date, |r| r.date) {
            Ok(idx) => self.records[idx].apply(pnl, update),
            Err(idx) => {
                let mut record = TradeRecord::new(date, pnl);
                record.apply(pnl, update);
                self.records.insert(idx, record);
            }
        }
    }

    /// Insert a whole record, replacing any existing record for its date.
    pub fn insert_record(&mut self, record: TradeRecord) {
        match self.records.binary_search_by_key(&record.date, |r| r.date) {
            Ok(idx) => self.records[idx] = record,
            Err(idx) => self.records.insert(idx, record),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&TradeRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|idx| &self.records[idx])
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<TradeRecord> {
        self.records
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|idx| self.records.remove(idx))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records dated within `from..=to`, oldest first.
    pub fn records_in_range(&self, from: NaiveDate, to: NaiveDate) -> &[TradeRecord] {
        if from > to {
            return &[];
        }
        let start = self.records.partition_point(|r| r.date < from);
        let end = self.records.partition_point(|r| r.date <= to);
        &self.records[start..end]
    }

    /// Records whose date falls in the given month, oldest first.
    pub fn records_in_month(&self, year: i32, month: u32) -> &[TradeRecord] {
        let start = self
            .records
            .partition_point(|r| (r.date.year(), r.date.month()) < (year, month));
        let end = self
            .records
            .partition_point(|r| (r.date.year(), r.date.month()) <= (year, month));
        &self.records[start..end]
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }
}
