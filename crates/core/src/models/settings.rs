use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Key under which the journal is persisted by default.
pub const DEFAULT_STORAGE_KEY: &str = "trading-journal-data";

/// Upper bound on the share card scale (4× is already 5452×3052 px).
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 4.0;

/// What a journal with nothing persisted starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyStatePolicy {
    /// Start with no records
    #[default]
    Empty,
    /// Seed a few synthetic days so the calendar is not blank on first run
    SeedSampleData,
}

/// Host-supplied configuration for a journal instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalSettings {
    /// Persistence key holding the serialized records
    pub storage_key: String,

    /// Currency symbol used when formatting P&L (e.g., "₱", "$")
    pub currency_symbol: String,

    /// Behaviour when no persisted data exists
    pub empty_state: EmptyStatePolicy,

    /// Scale applied to the share card's logical size
    pub device_pixel_ratio: f32,
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency_symbol: "₱".to_string(),
            empty_state: EmptyStatePolicy::Empty,
            device_pixel_ratio: 1.0,
        }
    }
}

impl JournalSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.storage_key.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Storage key must not be empty".into(),
            ));
        }
        if !self.device_pixel_ratio.is_finite()
            || self.device_pixel_ratio <= 0.0
            || self.device_pixel_ratio > MAX_DEVICE_PIXEL_RATIO
        {
            return Err(CoreError::ValidationError(format!(
                "Device pixel ratio must be in (0, {MAX_DEVICE_PIXEL_RATIO}], got {}",
                self.device_pixel_ratio
            )));
        }
        Ok(())
    }
}
