use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use async_trait::async_trait;
use tiny_skia as sk;
use tracing::warn;

use crate::errors::CoreError;

use super::surface::{Paint, Rect, Rgba, Surface, SurfaceProvider, TextAlign, TextStyle};

/// Number of samples taken around a glyph run when drawing a glow.
const GLOW_SAMPLES: usize = 12;

/// Software raster surface: `tiny-skia` for shapes and PNG, `ab_glyph` for text.
pub struct RasterSurface {
    pixmap: sk::Pixmap,
    scale: f32,
    width: f32,
    height: f32,
    font: Option<FontArc>,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("logical", &(self.width, self.height))
            .field("pixels", &(self.pixmap.width(), self.pixmap.height()))
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl RasterSurface {
    /// Allocate a transparent surface of `width × height` logical pixels,
    /// backed by `width·scale × height·scale` device pixels.
    pub fn new(width: u32, height: u32, scale: f32) -> Result<Self, CoreError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(CoreError::RenderingUnavailable(format!(
                "invalid device pixel ratio {scale}"
            )));
        }
        let px_width = (width as f32 * scale).round() as u32;
        let px_height = (height as f32 * scale).round() as u32;
        let pixmap = sk::Pixmap::new(px_width, px_height).ok_or_else(|| {
            CoreError::RenderingUnavailable(format!(
                "cannot allocate a {px_width}x{px_height} surface"
            ))
        })?;

        Ok(Self {
            pixmap,
            scale,
            width: width as f32,
            height: height as f32,
            font: None,
        })
    }

    /// Font used by [`Surface::fill_text`]. Without one, text drawing fails.
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Device pixel dimensions.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    /// Color at a device pixel, demultiplied. `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba::new(c.red(), c.green(), c.blue(), c.alpha()))
    }

    fn transform(&self) -> sk::Transform {
        sk::Transform::from_scale(self.scale, self.scale)
    }

    fn sk_rect(rect: Rect) -> Result<sk::Rect, CoreError> {
        sk::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height).ok_or_else(|| {
            CoreError::Rendering(format!(
                "invalid rectangle {}x{} at ({}, {})",
                rect.width, rect.height, rect.x, rect.y
            ))
        })
    }

    fn sk_paint(paint: &Paint) -> Result<sk::Paint<'static>, CoreError> {
        let shader = match paint {
            Paint::Solid(color) => sk::Shader::SolidColor(sk_color(*color)),
            Paint::LinearGradient { start, end, stops } => sk::LinearGradient::new(
                sk::Point::from_xy(start.0, start.1),
                sk::Point::from_xy(end.0, end.1),
                sk_stops(stops),
                sk::SpreadMode::Pad,
                sk::Transform::identity(),
            )
            .ok_or_else(|| CoreError::Rendering("invalid linear gradient".into()))?,
            Paint::RadialGradient {
                center,
                radius,
                stops,
            } => sk::RadialGradient::new(
                sk::Point::from_xy(center.0, center.1),
                sk::Point::from_xy(center.0, center.1),
                *radius,
                sk_stops(stops),
                sk::SpreadMode::Pad,
                sk::Transform::identity(),
            )
            .ok_or_else(|| CoreError::Rendering("invalid radial gradient".into()))?,
        };

        Ok(sk::Paint {
            shader,
            anti_alias: true,
            ..sk::Paint::default()
        })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Surface for RasterSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), CoreError> {
        let rect = Self::sk_rect(rect)?;
        let paint = Self::sk_paint(paint)?;
        let transform = self.transform();
        self.pixmap.fill_rect(rect, &paint, transform, None);
        Ok(())
    }

    fn fill_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f32,
        paint: &Paint,
    ) -> Result<(), CoreError> {
        let path = rounded_rect_path(rect, radius)
            .ok_or_else(|| CoreError::Rendering("invalid rounded rectangle".into()))?;
        let paint = Self::sk_paint(paint)?;
        let transform = self.transform();
        self.pixmap
            .fill_path(&path, &paint, sk::FillRule::Winding, transform, None);
        Ok(())
    }

    fn draw_image(&mut self, image: &[u8], rect: Rect) -> Result<(), CoreError> {
        let decoded = sk::Pixmap::decode_png(image)
            .map_err(|e| CoreError::Rendering(format!("cannot decode image: {e}")))?;
        let target = Self::sk_rect(rect)?;

        // Cover: scale uniformly until both sides fill the target, centre the overflow.
        let (img_w, img_h) = (decoded.width() as f32, decoded.height() as f32);
        let factor = (rect.width / img_w).max(rect.height / img_h);
        let offset_x = rect.x + (rect.width - img_w * factor) / 2.0;
        let offset_y = rect.y + (rect.height - img_h * factor) / 2.0;

        let paint = sk::Paint {
            shader: sk::Pattern::new(
                decoded.as_ref(),
                sk::SpreadMode::Pad,
                sk::FilterQuality::Bilinear,
                1.0,
                sk::Transform::from_row(factor, 0.0, 0.0, factor, offset_x, offset_y),
            ),
            anti_alias: true,
            ..sk::Paint::default()
        };
        let transform = self.transform();
        self.pixmap.fill_rect(target, &paint, transform, None);
        Ok(())
    }

    fn fill_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        style: &TextStyle,
    ) -> Result<(), CoreError> {
        let font = self
            .font
            .clone()
            .ok_or_else(|| CoreError::RenderingUnavailable("no font loaded".into()))?;

        let px = style.size * self.scale;
        let width = measure_text(&font, px, text);
        let anchor_x = x * self.scale;
        let origin_x = match style.align {
            TextAlign::Left => anchor_x,
            TextAlign::Center => anchor_x - width / 2.0,
            TextAlign::Right => anchor_x - width,
        };
        let baseline = y * self.scale;

        if let Some(glow) = style.glow {
            let radius = glow.radius * self.scale;
            let sample = glow.color.with_alpha((glow.color.a as usize / 4) as u8);
            for ring in [radius, radius / 2.0] {
                for i in 0..GLOW_SAMPLES {
                    let angle = i as f32 / GLOW_SAMPLES as f32 * std::f32::consts::TAU;
                    draw_glyphs(
                        &mut self.pixmap,
                        &font,
                        px,
                        text,
                        origin_x + ring * angle.cos(),
                        baseline + ring * angle.sin(),
                        sample,
                    );
                }
            }
        }

        draw_glyphs(&mut self.pixmap, &font, px, text, origin_x, baseline, style.color);
        Ok(())
    }

    async fn encode_png(&self) -> Result<Vec<u8>, CoreError> {
        self.pixmap
            .encode_png()
            .map_err(|e| CoreError::Encoding(e.to_string()))
    }
}

/// Builds [`RasterSurface`]s sharing one font.
#[derive(Clone, Default, Debug)]
pub struct RasterSurfaceProvider {
    font: Option<FontArc>,
}

impl RasterSurfaceProvider {
    /// Provider without a font: it cannot draw text, so it hands out no surfaces.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    /// Load a TrueType/OpenType font from raw bytes.
    pub fn with_font_bytes(bytes: Vec<u8>) -> Result<Self, CoreError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| CoreError::ValidationError(format!("Invalid font data: {e}")))?;
        Ok(Self::with_font(font))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

impl SurfaceProvider for RasterSurfaceProvider {
    fn create_surface(&self, width: u32, height: u32, scale: f32) -> Option<Box<dyn Surface>> {
        let Some(font) = self.font.clone() else {
            warn!("No font loaded, raster surface unavailable");
            return None;
        };
        match RasterSurface::new(width, height, scale) {
            Ok(surface) => Some(Box::new(surface.with_font(font))),
            Err(e) => {
                warn!(error = %e, "Failed to create raster surface");
                None
            }
        }
    }
}

fn sk_color(c: Rgba) -> sk::Color {
    sk::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn sk_stops(stops: &[(f32, Rgba)]) -> Vec<sk::GradientStop> {
    stops
        .iter()
        .map(|(pos, color)| sk::GradientStop::new(*pos, sk_color(*color)))
        .collect()
}

fn rounded_rect_path(rect: Rect, radius: f32) -> Option<sk::Path> {
    let Rect {
        x,
        y,
        width: w,
        height: h,
    } = rect;
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);

    let mut pb = sk::PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.quad_to(x + w, y, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.quad_to(x + w, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.quad_to(x, y + h, x, y + h - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Advance width of `text` at `px` pixels, kerning included.
fn measure_text(font: &FontArc, px: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut width = 0.0;
    let mut prev: Option<GlyphId> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Rasterize a single line of text in device pixels, baseline at `baseline`.
fn draw_glyphs(
    pixmap: &mut sk::Pixmap,
    font: &FontArc,
    px: f32,
    text: &str,
    origin_x: f32,
    baseline: f32,
    color: Rgba,
) {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut caret = origin_x;
    let mut prev: Option<GlyphId> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(px, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                blend_pixel(pixmap, x, y, color, coverage);
            });
        }
    }
}

/// Source-over blend of `color` at `coverage` onto one premultiplied pixel.
fn blend_pixel(pixmap: &mut sk::Pixmap, x: i32, y: i32, color: Rgba, coverage: f32) {
    let (width, height) = (pixmap.width() as i32, pixmap.height() as i32);
    if x < 0 || y < 0 || x >= width || y >= height {
        return;
    }
    let alpha = color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let idx = (y * width + x) as usize;
    let Some(dst) = pixmap.pixels_mut().get_mut(idx) else {
        return;
    };

    let inv = 1.0 - alpha;
    let out_a = (alpha * 255.0 + dst.alpha() as f32 * inv).round().min(255.0) as u8;
    let channel = |src: u8, dst: u8| -> u8 {
        let value = (src as f32 * alpha + dst as f32 * inv).round().min(255.0) as u8;
        value.min(out_a)
    };
    let blended = sk::PremultipliedColorU8::from_rgba(
        channel(color.r, dst.red()),
        channel(color.g, dst.green()),
        channel(color.b, dst.blue()),
        out_a,
    );
    if let Some(blended) = blended {
        *dst = blended;
    }
}
