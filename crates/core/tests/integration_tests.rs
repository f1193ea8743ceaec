// ═══════════════════════════════════════════════════════════════════
// Integration Tests: TradingJournal facade end to end
// ═══════════════════════════════════════════════════════════════════

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use proptest::prelude::*;
use trading_journal_core::errors::CoreError;
use trading_journal_core::models::record::TradeUpdate;
use trading_journal_core::models::settings::{EmptyStatePolicy, JournalSettings};
use trading_journal_core::models::share::{ShareConfiguration, Timeframe};
use trading_journal_core::models::stats::StatsWindow;
use trading_journal_core::render::export::{
    DownloadSink, ImageHandle, MemoryBlobRegistry, ShareSession,
};
use trading_journal_core::render::surface::{Paint, Rect, Surface, SurfaceProvider, TextStyle};
use trading_journal_core::storage::file::FileStore;
use trading_journal_core::storage::memory::MemoryStore;
use trading_journal_core::storage::traits::KeyValueStore;
use trading_journal_core::TradingJournal;

const KEY: &str = "trading-journal-data";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Test doubles
// ═══════════════════════════════════════════════════════════════════

/// Backend that can be switched into a failing mode mid-test.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: std::sync::atomic::AtomicBool,
    writes: AtomicUsize,
}

impl KeyValueStore for FlakyStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), CoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("quota exceeded".into()));
        }
        self.inner.save(key, bytes)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::Storage("quota exceeded".into()));
        }
        self.inner.remove(key)
    }
}

/// Surface that draws nothing and encodes a fixed payload.
struct BlankSurface;

#[async_trait]
impl Surface for BlankSurface {
    fn width(&self) -> f32 {
        1363.0
    }
    fn height(&self) -> f32 {
        763.0
    }
    fn fill_rect(&mut self, _: Rect, _: &Paint) -> Result<(), CoreError> {
        Ok(())
    }
    fn fill_rounded_rect(&mut self, _: Rect, _: f32, _: &Paint) -> Result<(), CoreError> {
        Ok(())
    }
    fn draw_image(&mut self, _: &[u8], _: Rect) -> Result<(), CoreError> {
        Ok(())
    }
    fn fill_text(&mut self, _: &str, _: f32, _: f32, _: &TextStyle) -> Result<(), CoreError> {
        Ok(())
    }
    async fn encode_png(&self) -> Result<Vec<u8>, CoreError> {
        Ok(b"\x89PNG blank".to_vec())
    }
}

struct BlankProvider {
    scales: Mutex<Vec<f32>>,
}

impl BlankProvider {
    fn new() -> Self {
        Self {
            scales: Mutex::new(Vec::new()),
        }
    }
}

impl SurfaceProvider for BlankProvider {
    fn create_surface(&self, _: u32, _: u32, scale: f32) -> Option<Box<dyn Surface>> {
        self.scales.lock().unwrap().push(scale);
        Some(Box::new(BlankSurface))
    }
}

/// Provider whose surface closes a share session while encoding, the way
/// a user dismissing the dialog mid-render would.
struct ClosingProvider {
    session: ShareSession,
}

struct ClosingSurface {
    session: ShareSession,
}

#[async_trait]
impl Surface for ClosingSurface {
    fn width(&self) -> f32 {
        1363.0
    }
    fn height(&self) -> f32 {
        763.0
    }
    fn fill_rect(&mut self, _: Rect, _: &Paint) -> Result<(), CoreError> {
        Ok(())
    }
    fn fill_rounded_rect(&mut self, _: Rect, _: f32, _: &Paint) -> Result<(), CoreError> {
        Ok(())
    }
    fn draw_image(&mut self, _: &[u8], _: Rect) -> Result<(), CoreError> {
        Ok(())
    }
    fn fill_text(&mut self, _: &str, _: f32, _: f32, _: &TextStyle) -> Result<(), CoreError> {
        Ok(())
    }
    async fn encode_png(&self) -> Result<Vec<u8>, CoreError> {
        self.session.close();
        Ok(b"\x89PNG late".to_vec())
    }
}

impl SurfaceProvider for ClosingProvider {
    fn create_surface(&self, _: u32, _: u32, _: f32) -> Option<Box<dyn Surface>> {
        Some(Box::new(ClosingSurface {
            session: self.session.clone(),
        }))
    }
}

struct NoSurfaceProvider;

impl SurfaceProvider for NoSurfaceProvider {
    fn create_surface(&self, _: u32, _: u32, _: f32) -> Option<Box<dyn Surface>> {
        None
    }
}

#[derive(Default)]
struct RecordingSink {
    downloads: Mutex<Vec<(u64, String, usize)>>,
    fail: bool,
}

impl DownloadSink for RecordingSink {
    fn trigger_download(
        &self,
        handle: &ImageHandle,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<(), CoreError> {
        if self.fail {
            return Err(CoreError::Storage("download blocked".into()));
        }
        self.downloads
            .lock()
            .unwrap()
            .push((handle.id(), file_name.to_string(), bytes.len()));
        Ok(())
    }
}

fn january_journal() -> TradingJournal {
    let mut journal = TradingJournal::in_memory();
    journal.upsert(d(2024, 1, 5), 100.0, TradeUpdate::new()).unwrap();
    journal.upsert(d(2024, 1, 6), -50.0, TradeUpdate::new()).unwrap();
    journal.upsert(d(2024, 1, 7), 0.0, TradeUpdate::new()).unwrap();
    journal
}

// ═══════════════════════════════════════════════════════════════════
// Records & persistence
// ═══════════════════════════════════════════════════════════════════

mod records {
    use super::*;

    #[test]
    fn upsert_get_latest_values() {
        let mut journal = TradingJournal::in_memory();
        let day = d(2024, 1, 5);
        journal
            .upsert(day, 10.0, TradeUpdate::new().entry(1.0).stop_loss(0.9))
            .unwrap();
        journal
            .upsert(day, 20.0, TradeUpdate::new().take_profit(1.5))
            .unwrap();

        let r = journal.get(day).unwrap();
        assert_eq!(r.pnl, 20.0);
        assert_eq!(r.entry, Some(1.0));
        assert_eq!(r.stop_loss, Some(0.9));
        assert_eq!(r.take_profit, Some(1.5));
        assert_eq!(journal.record_count(), 1);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let backend = Arc::new(MemoryStore::new());
        let mut journal = TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();

        journal.upsert(d(2024, 1, 5), 100.0, TradeUpdate::new()).unwrap();
        let bytes = backend.load(KEY).unwrap().unwrap();
        assert_eq!(bytes, br#"[{"date":"2024-01-05","pnl":100.0}]"#);

        journal.upsert(d(2024, 1, 5), 5.0, TradeUpdate::new()).unwrap();
        let bytes = backend.load(KEY).unwrap().unwrap();
        assert_eq!(bytes, br#"[{"date":"2024-01-05","pnl":5.0}]"#);
    }

    #[test]
    fn reopen_restores_records() {
        let backend = Arc::new(MemoryStore::new());
        {
            let mut journal =
                TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();
            journal
                .upsert(d(2024, 1, 5), 100.0, TradeUpdate::new().entry(3.0))
                .unwrap();
            journal.upsert(d(2024, 1, 6), -50.0, TradeUpdate::new()).unwrap();
        }
        let journal = TradingJournal::open(backend, JournalSettings::default()).unwrap();
        assert_eq!(journal.record_count(), 2);
        assert_eq!(journal.get(d(2024, 1, 5)).unwrap().entry, Some(3.0));
    }

    #[test]
    fn clear_deletes_persisted_key() {
        let backend = Arc::new(MemoryStore::new());
        let mut journal = TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();
        journal.upsert(d(2024, 1, 5), 1.0, TradeUpdate::new()).unwrap();
        assert!(backend.contains(KEY));

        journal.clear();
        assert!(journal.is_empty());
        assert!(!backend.contains(KEY));
    }

    #[test]
    fn removing_last_record_deletes_key() {
        let backend = Arc::new(MemoryStore::new());
        let mut journal = TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();
        journal.upsert(d(2024, 1, 5), 1.0, TradeUpdate::new()).unwrap();

        assert!(journal.remove(d(2024, 1, 6)).is_none());
        assert!(journal.remove(d(2024, 1, 5)).is_some());
        assert!(!backend.contains(KEY));
    }

    #[test]
    fn corrupt_blob_starts_empty_and_is_deleted() {
        let backend = Arc::new(MemoryStore::new());
        backend.save(KEY, b"\"just a string\"").unwrap();

        let journal = TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();
        assert!(journal.is_empty());
        assert!(!backend.contains(KEY));
    }

    #[test]
    fn custom_storage_key() {
        let backend = Arc::new(MemoryStore::new());
        let settings = JournalSettings {
            storage_key: "alt".into(),
            ..JournalSettings::default()
        };
        let mut journal = TradingJournal::open(backend.clone(), settings).unwrap();
        journal.upsert(d(2024, 1, 5), 1.0, TradeUpdate::new()).unwrap();
        assert!(backend.contains("alt"));
        assert!(!backend.contains(KEY));
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let backend = Arc::new(FlakyStore::default());
        let mut journal = TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();
        backend.failing.store(true, Ordering::SeqCst);

        journal.upsert(d(2024, 1, 5), 10.0, TradeUpdate::new()).unwrap();
        assert_eq!(journal.get(d(2024, 1, 5)).unwrap().pnl, 10.0);
        assert_eq!(backend.writes.load(Ordering::SeqCst), 1);

        journal.clear();
        assert!(journal.is_empty());
    }

    #[test]
    fn non_finite_pnl_rejected_without_write() {
        let backend = Arc::new(FlakyStore::default());
        let mut journal = TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();
        let err = journal
            .upsert(d(2024, 1, 5), f64::NAN, TradeUpdate::new())
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_settings_rejected() {
        let settings = JournalSettings {
            device_pixel_ratio: -1.0,
            ..JournalSettings::default()
        };
        assert!(TradingJournal::open(MemoryStore::new(), settings).is_err());
    }

    #[test]
    fn file_backed_journal() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut journal = TradingJournal::open(
                FileStore::new(dir.path()).unwrap(),
                JournalSettings::default(),
            )
            .unwrap();
            journal.upsert(d(2024, 2, 1), 42.0, TradeUpdate::new()).unwrap();
        }
        let journal =
            TradingJournal::open(FileStore::new(dir.path()).unwrap(), JournalSettings::default())
                .unwrap();
        assert_eq!(journal.daily_pnl(d(2024, 2, 1)), 42.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Empty-state policy
// ═══════════════════════════════════════════════════════════════════

mod empty_state {
    use super::*;

    #[test]
    fn empty_policy_starts_empty() {
        let journal =
            TradingJournal::open_at(MemoryStore::new(), JournalSettings::default(), d(2024, 1, 10))
                .unwrap();
        assert!(journal.is_empty());
    }

    #[test]
    fn seed_policy_seeds_and_persists() {
        let backend = Arc::new(MemoryStore::new());
        let settings = JournalSettings {
            empty_state: EmptyStatePolicy::SeedSampleData,
            ..JournalSettings::default()
        };
        let journal = TradingJournal::open_at(backend.clone(), settings, d(2024, 1, 10)).unwrap();
        assert_eq!(journal.record_count(), 8);
        assert!(backend.contains(KEY));
    }

    #[test]
    fn seed_policy_leaves_existing_data_alone() {
        let backend = Arc::new(MemoryStore::new());
        backend
            .save(KEY, br#"[{"date":"2023-05-05","pnl":7}]"#)
            .unwrap();
        let settings = JournalSettings {
            empty_state: EmptyStatePolicy::SeedSampleData,
            ..JournalSettings::default()
        };
        let journal = TradingJournal::open_at(backend, settings, d(2024, 1, 10)).unwrap();
        assert_eq!(journal.record_count(), 1);
        assert_eq!(journal.daily_pnl(d(2023, 5, 5)), 7.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Statistics & calendar through the facade
// ═══════════════════════════════════════════════════════════════════

mod stats_and_calendar {
    use super::*;

    #[test]
    fn monthly_scenario() {
        let journal = january_journal();
        let stats = journal.stats_at(StatsWindow::Monthly { month: 1, year: 2024 }, d(2024, 1, 31));
        assert_eq!(stats.total, 50.0);
        assert_eq!(stats.traded_days, 2);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.win_rate, 50.0);
    }

    #[test]
    fn streak_scenario() {
        let mut journal = TradingJournal::in_memory();
        for (i, pnl) in [10.0, 0.0, 5.0, -1.0, 20.0].iter().enumerate() {
            journal
                .upsert(d(2024, 3, 1 + i as u32), *pnl, TradeUpdate::new())
                .unwrap();
        }
        let stats = journal.stats_at(StatsWindow::All, d(2024, 3, 5));
        assert_eq!(stats.max_win_streak, 2);
        assert_eq!(journal.current_win_streak_at(StatsWindow::All, d(2024, 3, 5)), 1);
    }

    #[test]
    fn helpers() {
        let journal = january_journal();
        assert_eq!(journal.monthly_total(2024, 1), 50.0);
        assert_eq!(journal.daily_pnl(d(2024, 1, 6)), -50.0);
        assert_eq!(
            journal.best_day_at(StatsWindow::All, d(2024, 1, 31)).unwrap().date,
            d(2024, 1, 5)
        );
        assert_eq!(
            journal.worst_day_at(StatsWindow::All, d(2024, 1, 31)).unwrap().date,
            d(2024, 1, 6)
        );
        assert_eq!(journal.records_in_range(d(2024, 1, 6), d(2024, 1, 7)).len(), 2);
        assert_eq!(journal.records_in_month(2024, 1).len(), 3);
        assert!(journal.records_in_month(2024, 2).is_empty());
    }

    #[test]
    fn padding_days_do_not_count() {
        let mut journal = TradingJournal::in_memory();
        // Jan 29 2024 is a padding cell of the February grid
        journal.upsert(d(2024, 1, 29), 500.0, TradeUpdate::new()).unwrap();
        journal.upsert(d(2024, 2, 2), 10.0, TradeUpdate::new()).unwrap();

        let grid = journal.month_grid(2024, 2).unwrap();
        assert!(!grid[0].in_current_month);
        let stats = journal.stats_at(StatsWindow::Monthly { month: 2, year: 2024 }, d(2024, 2, 29));
        assert_eq!(stats.total, 10.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Export / Import
// ═══════════════════════════════════════════════════════════════════

mod export_import {
    use super::*;

    #[test]
    fn json_round_trip() {
        let journal = january_journal();
        let json = journal.export_json().unwrap();

        let mut other = TradingJournal::in_memory();
        assert_eq!(other.import_json(&json).unwrap(), 3);
        assert_eq!(other.records(), journal.records());
    }

    #[test]
    fn import_rejects_malformed() {
        let mut journal = TradingJournal::in_memory();
        assert!(matches!(
            journal.import_json("{}"),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn import_upserts_existing_days() {
        let mut journal = january_journal();
        journal
            .upsert(d(2024, 1, 5), 100.0, TradeUpdate::new().entry(9.0))
            .unwrap();
        journal
            .import_json(r#"[{"date":"2024-01-05","pnl":1}]"#)
            .unwrap();
        let r = journal.get(d(2024, 1, 5)).unwrap();
        assert_eq!(r.pnl, 1.0);
        assert_eq!(r.entry, Some(9.0));
    }

    #[test]
    fn csv_export() {
        let mut journal = TradingJournal::in_memory();
        journal
            .upsert(d(2024, 1, 5), 100.5, TradeUpdate::new().entry(1.25))
            .unwrap();
        journal.upsert(d(2024, 1, 6), -50.0, TradeUpdate::new()).unwrap();

        let csv = journal.export_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,pnl,entry,stop_loss,take_profit");
        assert_eq!(lines[1], "2024-01-05,100.5,1.25,,");
        assert_eq!(lines[2], "2024-01-06,-50,,,");
    }

    #[test]
    fn currency_symbol_setting() {
        let mut journal = TradingJournal::in_memory();
        journal.set_currency_symbol("$").unwrap();
        assert_eq!(journal.settings().currency_symbol, "$");
        assert!(journal.set_currency_symbol(" ").is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Share card through the facade
// ═══════════════════════════════════════════════════════════════════

mod share_card {
    use super::*;

    fn config() -> ShareConfiguration {
        ShareConfiguration::new(Timeframe::Monthly, 1, 2024).unwrap()
    }

    #[tokio::test]
    async fn render_uses_device_pixel_ratio() {
        let backend = MemoryStore::new();
        let settings = JournalSettings {
            device_pixel_ratio: 2.0,
            ..JournalSettings::default()
        };
        let journal = TradingJournal::open(backend, settings).unwrap();
        let provider = BlankProvider::new();

        let png = journal
            .render_share_card_at(&provider, &config(), None, d(2024, 1, 31))
            .await
            .unwrap();
        assert!(png.starts_with(b"\x89PNG"));
        assert_eq!(*provider.scales.lock().unwrap(), vec![2.0]);
    }

    #[tokio::test]
    async fn no_surface_leaves_journal_unchanged() {
        let journal = january_journal();
        let window = StatsWindow::Monthly { month: 1, year: 2024 };
        let before = journal.stats_at(window, d(2024, 1, 31));
        let records_before = journal.records().to_vec();

        let err = journal
            .render_share_card_at(&NoSurfaceProvider, &config(), None, d(2024, 1, 31))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::RenderingUnavailable(_)));
        assert_eq!(journal.stats_at(window, d(2024, 1, 31)), before);
        assert_eq!(journal.records(), records_before.as_slice());
    }

    #[tokio::test]
    async fn preview_attaches_to_session() {
        let journal = january_journal();
        let registry = Arc::new(MemoryBlobRegistry::new());
        let session = ShareSession::new(registry.clone());

        let id = journal
            .preview_share_card_at(&BlankProvider::new(), &config(), None, &session, d(2024, 1, 31))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(session.preview_id(), Some(id));
        assert!(registry.get(id).is_some());

        session.close();
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn preview_after_close_returns_none() {
        let journal = january_journal();
        let registry = Arc::new(MemoryBlobRegistry::new());
        let session = ShareSession::new(registry.clone());
        session.close();

        let id = journal
            .preview_share_card_at(&BlankProvider::new(), &config(), None, &session, d(2024, 1, 31))
            .await
            .unwrap();
        assert!(id.is_none());
        assert_eq!(registry.live_count(), 0);
    }

    #[tokio::test]
    async fn close_during_render_discards_preview() {
        let journal = january_journal();
        let registry = Arc::new(MemoryBlobRegistry::new());
        let session = ShareSession::new(registry.clone());
        session.attach_preview(b"old".to_vec()).unwrap();
        let provider = ClosingProvider {
            session: session.clone(),
        };

        let id = journal
            .preview_share_card_at(&provider, &config(), None, &session, d(2024, 1, 31))
            .await
            .unwrap();

        assert!(id.is_none());
        assert!(session.is_closed());
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revocation_count(), 1);
    }

    #[tokio::test]
    async fn break_even_month_renders_as_zero_profit() {
        let mut journal = TradingJournal::in_memory();
        journal.upsert(d(2024, 1, 1), 0.30, TradeUpdate::new()).unwrap();
        journal.upsert(d(2024, 1, 2), -0.10, TradeUpdate::new()).unwrap();
        journal.upsert(d(2024, 1, 3), -0.20, TradeUpdate::new()).unwrap();

        let stats = journal.stats_at(StatsWindow::Monthly { month: 1, year: 2024 }, d(2024, 1, 31));
        assert_eq!(stats.total, 0.0);
        assert!(stats.total.is_sign_positive());
        assert_eq!(journal.monthly_total(2024, 1), 0.0);

        let png = journal
            .render_share_card_at(&BlankProvider::new(), &config(), None, d(2024, 1, 31))
            .await
            .unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn download_names_file_and_releases_handle() {
        let journal = january_journal();
        let registry = Arc::new(MemoryBlobRegistry::new());
        let sink = RecordingSink::default();

        let name = journal
            .download_share_card_at(
                &BlankProvider::new(),
                &config(),
                None,
                registry.clone(),
                &sink,
                d(2024, 1, 31),
            )
            .await
            .unwrap();

        assert_eq!(name, "trading-monthly-January-2024.png");
        let downloads = sink.downloads.lock().unwrap();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].1, name);
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revocation_count(), 1);
    }

    #[tokio::test]
    async fn failed_download_still_releases_handle() {
        let journal = january_journal();
        let registry = Arc::new(MemoryBlobRegistry::new());
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };

        let res = journal
            .download_share_card_at(
                &BlankProvider::new(),
                &config(),
                None,
                registry.clone(),
                &sink,
                d(2024, 1, 31),
            )
            .await;
        assert!(res.is_err());
        assert_eq!(registry.live_count(), 0);
        assert_eq!(registry.revocation_count(), 1);
    }

    #[tokio::test]
    async fn download_without_surface_registers_nothing() {
        let journal = january_journal();
        let registry = Arc::new(MemoryBlobRegistry::new());
        let sink = RecordingSink::default();

        let err = journal
            .download_share_card_at(
                &NoSurfaceProvider,
                &config(),
                None,
                registry.clone(),
                &sink,
                d(2024, 1, 31),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::RenderingUnavailable(_)));
        assert_eq!(registry.revocation_count(), 0);
        assert!(sink.downloads.lock().unwrap().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Op {
    day: u32,
    pnl: f64,
    entry: Option<f64>,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    (
        1u32..=5,
        -5000.0f64..5000.0,
        proptest::option::of(0.0f64..100.0),
        proptest::option::of(0.0f64..100.0),
        proptest::option::of(0.0f64..100.0),
    )
        .prop_map(|(day, pnl, entry, stop_loss, take_profit)| Op {
            day,
            pnl,
            entry,
            stop_loss,
            take_profit,
        })
}

proptest! {
    #[test]
    fn get_returns_latest_values(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut journal = TradingJournal::in_memory();
        for op in &ops {
            let update = TradeUpdate {
                entry: op.entry,
                stop_loss: op.stop_loss,
                take_profit: op.take_profit,
            };
            journal.upsert(d(2024, 1, op.day), op.pnl, update).unwrap();
        }

        for day in 1..=5u32 {
            let for_day: Vec<&Op> = ops.iter().filter(|o| o.day == day).collect();
            let record = journal.get(d(2024, 1, day));
            match for_day.last() {
                None => prop_assert!(record.is_none()),
                Some(last) => {
                    let record = record.unwrap();
                    prop_assert_eq!(record.pnl, last.pnl);
                    prop_assert_eq!(record.entry, for_day.iter().rev().find_map(|o| o.entry));
                    prop_assert_eq!(record.stop_loss, for_day.iter().rev().find_map(|o| o.stop_loss));
                    prop_assert_eq!(record.take_profit, for_day.iter().rev().find_map(|o| o.take_profit));
                }
            }
        }
    }

    #[test]
    fn win_rate_in_bounds(pnls in proptest::collection::vec(-100i32..100, 0..31)) {
        let mut journal = TradingJournal::in_memory();
        for (i, pnl) in pnls.iter().enumerate() {
            journal.upsert(d(2024, 1, 1 + i as u32), f64::from(*pnl), TradeUpdate::new()).unwrap();
        }
        let stats = journal.stats_at(StatsWindow::All, d(2024, 1, 31));
        prop_assert!((0.0..=100.0).contains(&stats.win_rate));
        if stats.traded_days == 0 {
            prop_assert_eq!(stats.win_rate, 0.0);
        }
        if stats.wins > 0 {
            prop_assert!(stats.win_rate > 0.0);
        }
        prop_assert_eq!(stats.wins + stats.losses, stats.traded_days);
    }

    #[test]
    fn persisted_round_trip(quarters in proptest::collection::vec(-4000i32..4000, 0..20)) {
        let pnls: Vec<f64> = quarters.iter().map(|q| f64::from(*q) / 4.0).collect();
        let backend = Arc::new(MemoryStore::new());
        let mut journal = TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();
        for (i, pnl) in pnls.iter().enumerate() {
            journal.upsert(d(2024, 1, 1 + i as u32), *pnl, TradeUpdate::new()).unwrap();
        }
        let reopened = TradingJournal::open(backend.clone(), JournalSettings::default()).unwrap();
        prop_assert_eq!(reopened.records(), journal.records());
        prop_assert_eq!(backend.contains(KEY), !pnls.is_empty());
    }
}
