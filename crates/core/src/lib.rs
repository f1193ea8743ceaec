pub mod errors;
pub mod models;
pub mod render;
pub mod services;
pub mod storage;

use std::sync::Arc;

use chrono::NaiveDate;
use models::{
    calendar::CalendarDay,
    journal::TradeStore,
    record::{TradeRecord, TradeUpdate},
    settings::{EmptyStatePolicy, JournalSettings},
    share::ShareConfiguration,
    stats::{StatsSnapshot, StatsWindow},
};
use render::{
    export::{BlobRegistry, DownloadSink, HandleId, ImageHandle, ShareSession},
    share_card::ShareCardRenderer,
    surface::SurfaceProvider,
};
use services::{
    calendar_service::CalendarService, journal_service::JournalService,
    stats_service::StatsService,
};
use storage::{manager::StorageManager, memory::MemoryStore, traits::KeyValueStore};
use tracing::info;

use errors::CoreError;

/// Main entry point for the Trading Journal core library.
/// Holds the record store, its persistence backend and the services that
/// operate on it.
#[must_use]
pub struct TradingJournal {
    store: TradeStore,
    settings: JournalSettings,
    backend: Box<dyn KeyValueStore>,
    journal_service: JournalService,
    stats_service: StatsService,
    calendar_service: CalendarService,
}

impl std::fmt::Debug for TradingJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingJournal")
            .field("records", &self.store.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl TradingJournal {
    /// Open the journal persisted in `backend`, hydrating it once.
    /// Absent or corrupt data yields an empty journal (seeded with sample
    /// days when the settings ask for it).
    pub fn open(
        backend: impl KeyValueStore + 'static,
        settings: JournalSettings,
    ) -> Result<Self, CoreError> {
        Self::open_at(backend, settings, today())
    }

    /// Same as [`Self::open`], with an explicit "today" for sample seeding.
    pub fn open_at(
        backend: impl KeyValueStore + 'static,
        settings: JournalSettings,
        today: NaiveDate,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let backend: Box<dyn KeyValueStore> = Box::new(backend);
        let store = StorageManager::hydrate(backend.as_ref(), &settings.storage_key);

        let mut journal = Self {
            store,
            settings,
            backend,
            journal_service: JournalService::new(),
            stats_service: StatsService::new(),
            calendar_service: CalendarService::new(),
        };

        if journal.store.is_empty() && journal.settings.empty_state == EmptyStatePolicy::SeedSampleData
        {
            let samples = journal.journal_service.sample_records(today);
            let seeded = journal
                .journal_service
                .upsert_all(&mut journal.store, &samples)?;
            info!(records = seeded, "Seeded empty journal with sample data");
            journal.persist();
        }

        Ok(journal)
    }

    /// A journal that lives only in memory, with default settings.
    pub fn in_memory() -> Self {
        Self {
            store: TradeStore::new(),
            settings: JournalSettings::default(),
            backend: Box::new(MemoryStore::new()),
            journal_service: JournalService::new(),
            stats_service: StatsService::new(),
            calendar_service: CalendarService::new(),
        }
    }

    // ── Records ─────────────────────────────────────────────────────

    /// Record the P&L for a day, or update it.
    /// Levels left `None` in `update` keep their previous values.
    pub fn upsert(
        &mut self,
        date: NaiveDate,
        pnl: f64,
        update: TradeUpdate,
    ) -> Result<(), CoreError> {
        self.journal_service
            .upsert(&mut self.store, date, pnl, &update)?;
        self.persist();
        Ok(())
    }

    /// Get the record for a day.
    #[must_use]
    pub fn get(&self, date: NaiveDate) -> Option<&TradeRecord> {
        self.store.get(date)
    }

    /// Delete a day's record. Returns the removed record, if there was one.
    pub fn remove(&mut self, date: NaiveDate) -> Option<TradeRecord> {
        let removed = self.store.remove(date);
        if removed.is_some() {
            self.persist();
        }
        removed
    }

    /// Remove every record and the persisted state.
    pub fn clear(&mut self) {
        self.store.clear();
        self.persist();
        info!("Journal cleared");
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[TradeRecord] {
        self.store.records()
    }

    /// Records within `from..=to`, oldest first.
    #[must_use]
    pub fn records_in_range(&self, from: NaiveDate, to: NaiveDate) -> &[TradeRecord] {
        self.store.records_in_range(from, to)
    }

    /// Records of one calendar month, oldest first.
    #[must_use]
    pub fn records_in_month(&self, year: i32, month: u32) -> &[TradeRecord] {
        self.store.records_in_month(year, month)
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    // ── Statistics ──────────────────────────────────────────────────

    /// Statistics for a window, evaluated as of today.
    #[must_use]
    pub fn stats(&self, window: StatsWindow) -> StatsSnapshot {
        self.stats_at(window, today())
    }

    /// Statistics for a window, evaluated as of `today`.
    #[must_use]
    pub fn stats_at(&self, window: StatsWindow, today: NaiveDate) -> StatsSnapshot {
        self.stats_service.snapshot(&self.store, window, today)
    }

    /// P&L recorded for a day (0 when nothing is recorded).
    #[must_use]
    pub fn daily_pnl(&self, date: NaiveDate) -> f64 {
        self.stats_service.daily_pnl(&self.store, date)
    }

    /// Total P&L for a calendar month.
    #[must_use]
    pub fn monthly_total(&self, year: i32, month: u32) -> f64 {
        self.stats_service.monthly_total(&self.store, year, month)
    }

    /// Winning run still open at the end of the window.
    #[must_use]
    pub fn current_win_streak_at(&self, window: StatsWindow, today: NaiveDate) -> usize {
        self.stats_service
            .current_win_streak(&self.store, window, today)
    }

    #[must_use]
    pub fn best_day_at(&self, window: StatsWindow, today: NaiveDate) -> Option<&TradeRecord> {
        self.stats_service.best_day(&self.store, window, today)
    }

    #[must_use]
    pub fn worst_day_at(&self, window: StatsWindow, today: NaiveDate) -> Option<&TradeRecord> {
        self.stats_service.worst_day(&self.store, window, today)
    }

    // ── Calendar ────────────────────────────────────────────────────

    /// Monday-aligned grid for a month. See [`CalendarService::month_grid`].
    pub fn month_grid(&self, year: i32, month: u32) -> Result<Vec<CalendarDay>, CoreError> {
        self.calendar_service.month_grid(year, month)
    }

    // ── Share Card ──────────────────────────────────────────────────

    /// Render the share card as PNG bytes, evaluated as of `today`.
    /// `background` is an optional PNG drawn behind the card.
    pub async fn render_share_card_at(
        &self,
        provider: &dyn SurfaceProvider,
        config: &ShareConfiguration,
        background: Option<&[u8]>,
        today: NaiveDate,
    ) -> Result<Vec<u8>, CoreError> {
        let window = StatsWindow::for_timeframe(config.timeframe, config.month, config.year);
        let snapshot = self.stats_at(window, today);
        self.renderer(background)
            .render(
                provider,
                self.settings.device_pixel_ratio,
                &snapshot,
                config,
                today,
            )
            .await
    }

    pub async fn render_share_card(
        &self,
        provider: &dyn SurfaceProvider,
        config: &ShareConfiguration,
        background: Option<&[u8]>,
    ) -> Result<Vec<u8>, CoreError> {
        self.render_share_card_at(provider, config, background, today())
            .await
    }

    /// Render the card and attach it to `session` as its preview.
    ///
    /// Returns `None` when the session was closed (through any clone of it)
    /// while rendering; the image is then discarded. Dropping the returned
    /// future cancels the render without touching the session.
    pub async fn preview_share_card_at(
        &self,
        provider: &dyn SurfaceProvider,
        config: &ShareConfiguration,
        background: Option<&[u8]>,
        session: &ShareSession,
        today: NaiveDate,
    ) -> Result<Option<HandleId>, CoreError> {
        let png = self
            .render_share_card_at(provider, config, background, today)
            .await?;
        session.attach_preview(png)
    }

    /// Render the card and hand it to `sink` as a file download.
    /// The temporary handle is released on every path. Returns the file name.
    pub async fn download_share_card_at(
        &self,
        provider: &dyn SurfaceProvider,
        config: &ShareConfiguration,
        background: Option<&[u8]>,
        registry: Arc<dyn BlobRegistry>,
        sink: &dyn DownloadSink,
        today: NaiveDate,
    ) -> Result<String, CoreError> {
        let file_name = ShareCardRenderer::file_name(config)?;
        let png = self
            .render_share_card_at(provider, config, background, today)
            .await?;

        let handle = ImageHandle::acquire(registry, png.clone())?;
        let result = sink.trigger_download(&handle, &png, &file_name);
        handle.release();
        result?;

        info!(file_name = %file_name, "Share card downloaded");
        Ok(file_name)
    }

    pub async fn download_share_card(
        &self,
        provider: &dyn SurfaceProvider,
        config: &ShareConfiguration,
        background: Option<&[u8]>,
        registry: Arc<dyn BlobRegistry>,
        sink: &dyn DownloadSink,
    ) -> Result<String, CoreError> {
        self.download_share_card_at(provider, config, background, registry, sink, today())
            .await
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &JournalSettings {
        &self.settings
    }

    /// Change the currency symbol used on share cards.
    pub fn set_currency_symbol(&mut self, symbol: impl Into<String>) -> Result<(), CoreError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Currency symbol must not be empty".into(),
            ));
        }
        self.settings.currency_symbol = symbol;
        Ok(())
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all records as a pretty-printed JSON array.
    pub fn export_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.store)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize records to JSON: {e}")))
    }

    /// Export all records as CSV.
    /// Columns: date, pnl, entry, stop_loss, take_profit (blank when unset)
    #[must_use]
    pub fn export_csv(&self) -> String {
        let mut csv = String::from("date,pnl,entry,stop_loss,take_profit\n");
        let opt = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
        for record in self.store.records() {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                record.date,
                record.pnl,
                opt(record.entry),
                opt(record.stop_loss),
                opt(record.take_profit),
            ));
        }
        csv
    }

    /// Import records from a JSON array, upserting each one.
    /// All-or-nothing: an invalid record aborts the whole import.
    /// Returns the number of records imported.
    pub fn import_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let records: Vec<TradeRecord> = serde_json::from_str(json)?;
        let count = self
            .journal_service
            .upsert_all(&mut self.store, &records)?;
        self.persist();
        Ok(count)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn renderer(&self, background: Option<&[u8]>) -> ShareCardRenderer {
        let renderer = ShareCardRenderer::new(self.settings.currency_symbol.clone());
        match background {
            Some(bytes) => renderer.with_background(bytes.to_vec()),
            None => renderer,
        }
    }

    /// Best-effort write-through; failures are logged by the storage manager.
    fn persist(&self) {
        StorageManager::persist(self.backend.as_ref(), &self.settings.storage_key, &self.store);
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
