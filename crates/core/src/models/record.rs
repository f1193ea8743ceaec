use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single day's entry in the trading journal.
///
/// The date is the record's identity: a journal never holds two records
/// for the same day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    /// Trading day (serialized as "YYYY-MM-DD")
    pub date: NaiveDate,

    /// Realized profit/loss for the day, signed
    pub pnl: f64,

    /// Entry price of the day's trade, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<f64>,

    /// Stop-loss level, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,

    /// Take-profit level, if recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
}

impl TradeRecord {
    pub fn new(date: NaiveDate, pnl: f64) -> Self {
        Self {
            date,
            pnl,
            entry: None,
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Overwrite `pnl` and whichever optional fields the update supplies.
    pub fn apply(&mut self, pnl: f64, update: &TradeUpdate) {
        self.pnl = pnl;
        if let Some(entry) = update.entry {
            self.entry = Some(entry);
        }
        if let Some(stop_loss) = update.stop_loss {
            self.stop_loss = Some(stop_loss);
        }
        if let Some(take_profit) = update.take_profit {
            self.take_profit = Some(take_profit);
        }
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }

    /// A day counts as traded when its P&L is non-zero.
    pub fn is_traded(&self) -> bool {
        self.pnl != 0.0
    }
}

/// Optional trade levels supplied alongside a P&L upsert.
/// `None` means "not supplied": the stored value is left as it was.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TradeUpdate {
    pub entry: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl TradeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: f64) -> Self {
        self.entry = Some(entry);
        self
    }

    pub fn stop_loss(mut self, stop_loss: f64) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    pub fn take_profit(mut self, take_profit: f64) -> Self {
        self.take_profit = Some(take_profit);
        self
    }

    fn values(&self) -> [Option<f64>; 3] {
        [self.entry, self.stop_loss, self.take_profit]
    }

    /// True when every supplied level is a finite number.
    pub fn is_finite(&self) -> bool {
        self.values().iter().flatten().all(|v| v.is_finite())
    }
}
