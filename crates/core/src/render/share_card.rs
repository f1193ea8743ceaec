use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::share::{ShareConfiguration, Timeframe};
use crate::models::stats::StatsSnapshot;
use crate::services::calendar_service::CalendarService;
use crate::services::stats_service::StatsService;

use super::format::{format_pnl, format_win_rate};
use super::surface::{Paint, Rect, Rgba, Surface, SurfaceProvider, TextAlign, TextStyle};

/// Logical card size; the surface multiplies it by the device pixel ratio.
pub const CARD_WIDTH: u32 = 1363;
pub const CARD_HEIGHT: u32 = 763;

pub const PROFIT_COLOR: Rgba = Rgba::rgb(0x22, 0xc5, 0x5e);
pub const LOSS_COLOR: Rgba = Rgba::rgb(0xef, 0x44, 0x44);

const TITLE_COLOR: Rgba = Rgba::rgb(0xf8, 0xfa, 0xfc);
const MUTED_COLOR: Rgba = Rgba::rgb(0x94, 0xa3, 0xb8);
const CARD_FILL: Rgba = Rgba::new(255, 255, 255, 16);

const MARGIN: f32 = 80.0;
const STAT_GAP: f32 = 20.0;
const STAT_TOP: f32 = 540.0;
const STAT_HEIGHT: f32 = 150.0;

/// Draws the shareable summary card.
///
/// Layers, back to front: background (asset or fallback gradient), header,
/// headline P&L with glow, stat row.
#[derive(Debug, Clone)]
pub struct ShareCardRenderer {
    currency_symbol: String,
    background: Option<Vec<u8>>,
}

impl ShareCardRenderer {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            background: None,
        }
    }

    /// PNG drawn behind everything, scaled to cover the card.
    pub fn with_background(mut self, background: Vec<u8>) -> Self {
        self.background = Some(background);
        self
    }

    /// Download name: `trading-{timeframe}-{MonthName}-{year}.png`.
    pub fn file_name(config: &ShareConfiguration) -> Result<String, CoreError> {
        let month = CalendarService::month_name(config.month)?;
        Ok(format!(
            "trading-{}-{}-{}.png",
            config.timeframe, month, config.year
        ))
    }

    /// Human-readable period under the title.
    pub fn period_label(config: &ShareConfiguration, today: NaiveDate) -> Result<String, CoreError> {
        let label = match config.timeframe {
            Timeframe::Daily => format!("Daily P&L · {}", today.format("%B %-d, %Y")),
            Timeframe::Weekly => format!(
                "Weekly P&L · {} - {}",
                StatsService::week_start(today).format("%b %-d"),
                today.format("%b %-d, %Y")
            ),
            Timeframe::Monthly => format!(
                "Monthly P&L · {} {}",
                CalendarService::month_name(config.month)?,
                config.year
            ),
        };
        Ok(label)
    }

    /// Draw the card onto `surface`. Synchronous; nothing is encoded here.
    pub fn draw(
        &self,
        surface: &mut dyn Surface,
        snapshot: &StatsSnapshot,
        config: &ShareConfiguration,
        today: NaiveDate,
    ) -> Result<(), CoreError> {
        let (width, height) = (surface.width(), surface.height());
        let accent = if StatsService::round_cents(snapshot.total) >= 0.0 {
            PROFIT_COLOR
        } else {
            LOSS_COLOR
        };

        self.draw_background(surface, width, height, accent)?;

        // Header
        surface.fill_text(
            "TRADING JOURNAL",
            MARGIN,
            110.0,
            &TextStyle::new(30.0, TITLE_COLOR),
        )?;
        surface.fill_text(
            &Self::period_label(config, today)?,
            MARGIN,
            160.0,
            &TextStyle::new(24.0, MUTED_COLOR),
        )?;

        // Headline
        surface.fill_text(
            "TOTAL P&L",
            width / 2.0,
            270.0,
            &TextStyle::new(22.0, MUTED_COLOR).align(TextAlign::Center),
        )?;
        surface.fill_text(
            &format_pnl(snapshot.total, &self.currency_symbol),
            width / 2.0,
            420.0,
            &TextStyle::new(150.0, accent)
                .align(TextAlign::Center)
                .glow(accent.with_alpha(160), 18.0),
        )?;

        self.draw_stat_row(surface, width, snapshot)?;

        debug!(
            timeframe = %config.timeframe,
            total = snapshot.total,
            "Share card drawn"
        );
        Ok(())
    }

    /// Create a surface, draw the card and encode it as PNG.
    ///
    /// Fails with [`CoreError::RenderingUnavailable`] when the provider has
    /// no surface to give.
    pub async fn render(
        &self,
        provider: &dyn SurfaceProvider,
        scale: f32,
        snapshot: &StatsSnapshot,
        config: &ShareConfiguration,
        today: NaiveDate,
    ) -> Result<Vec<u8>, CoreError> {
        let mut surface = provider
            .create_surface(CARD_WIDTH, CARD_HEIGHT, scale)
            .ok_or_else(|| {
                CoreError::RenderingUnavailable("no drawing surface available".into())
            })?;

        self.draw(surface.as_mut(), snapshot, config, today)?;
        let png = surface.encode_png().await?;
        debug!(bytes = png.len(), "Share card encoded");
        Ok(png)
    }

    fn draw_background(
        &self,
        surface: &mut dyn Surface,
        width: f32,
        height: f32,
        accent: Rgba,
    ) -> Result<(), CoreError> {
        let full = Rect::new(0.0, 0.0, width, height);

        let drew_asset = match &self.background {
            Some(image) => match surface.draw_image(image, full) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Background asset failed, using gradient");
                    false
                }
            },
            None => false,
        };

        if drew_asset {
            // Darken the photo so the text stays legible.
            surface.fill_rect(full, &Paint::Solid(Rgba::new(0, 0, 0, 110)))?;
        } else {
            surface.fill_rect(
                full,
                &Paint::LinearGradient {
                    start: (0.0, 0.0),
                    end: (width, height),
                    stops: vec![
                        (0.0, Rgba::rgb(0x0f, 0x17, 0x2a)),
                        (0.55, Rgba::rgb(0x1e, 0x29, 0x3b)),
                        (1.0, Rgba::rgb(0x0b, 0x11, 0x20)),
                    ],
                },
            )?;
        }

        surface.fill_rect(
            full,
            &Paint::RadialGradient {
                center: (width / 2.0, 360.0),
                radius: width / 2.5,
                stops: vec![(0.0, accent.with_alpha(56)), (1.0, accent.with_alpha(0))],
            },
        )
    }

    fn draw_stat_row(
        &self,
        surface: &mut dyn Surface,
        width: f32,
        snapshot: &StatsSnapshot,
    ) -> Result<(), CoreError> {
        let weekly_color = if StatsService::round_cents(snapshot.weekly_profit) >= 0.0 {
            PROFIT_COLOR
        } else {
            LOSS_COLOR
        };
        let stats = [
            ("WIN RATE", format_win_rate(snapshot.win_rate), TITLE_COLOR),
            ("WIN STREAK", snapshot.max_win_streak.to_string(), TITLE_COLOR),
            ("TRADING DAYS", snapshot.traded_days.to_string(), TITLE_COLOR),
            (
                "WEEKLY P&L",
                format_pnl(snapshot.weekly_profit, &self.currency_symbol),
                weekly_color,
            ),
            (
                "W / L",
                format!("{}W / {}L", snapshot.wins, snapshot.losses),
                TITLE_COLOR,
            ),
        ];

        let count = stats.len() as f32;
        let card_width = (width - 2.0 * MARGIN - (count - 1.0) * STAT_GAP) / count;

        for (i, (label, value, color)) in stats.iter().enumerate() {
            let x = MARGIN + i as f32 * (card_width + STAT_GAP);
            let centre = x + card_width / 2.0;
            surface.fill_rounded_rect(
                Rect::new(x, STAT_TOP, card_width, STAT_HEIGHT),
                18.0,
                &Paint::Solid(CARD_FILL),
            )?;
            surface.fill_text(
                label,
                centre,
                STAT_TOP + 50.0,
                &TextStyle::new(18.0, MUTED_COLOR).align(TextAlign::Center),
            )?;
            surface.fill_text(
                value,
                centre,
                STAT_TOP + 110.0,
                &TextStyle::new(36.0, *color).align(TextAlign::Center),
            )?;
        }
        Ok(())
    }
}
