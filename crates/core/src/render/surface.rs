use async_trait::async_trait;

use crate::errors::CoreError;

/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with alpha replaced.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// How a shape is filled.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    /// Gradient along the line `start → end`; stops are `(offset 0..=1, color)`.
    LinearGradient {
        start: (f32, f32),
        end: (f32, f32),
        stops: Vec<(f32, Rgba)>,
    },
    /// Gradient from `center` outwards to `radius`.
    RadialGradient {
        center: (f32, f32),
        radius: f32,
        stops: Vec<(f32, Rgba)>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Soft halo drawn behind text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgba,
    pub radius: f32,
}

/// Text appearance. `x` anchors according to `align`; `y` is the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgba,
    pub align: TextAlign,
    pub glow: Option<Glow>,
}

impl TextStyle {
    pub fn new(size: f32, color: Rgba) -> Self {
        Self {
            size,
            color,
            align: TextAlign::Left,
            glow: None,
        }
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn glow(mut self, color: Rgba, radius: f32) -> Self {
        self.glow = Some(Glow { color, radius });
        self
    }
}

/// Off-screen drawing surface (a canvas context, or a software raster).
///
/// All coordinates are logical pixels; the surface applies its own
/// device-pixel-ratio scaling. Drawing is synchronous, encoding is async.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Surface: Send + Sync {
    /// Logical width.
    fn width(&self) -> f32;

    /// Logical height.
    fn height(&self) -> f32;

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) -> Result<(), CoreError>;

    fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, paint: &Paint)
        -> Result<(), CoreError>;

    /// Draw an encoded (PNG) image scaled to cover `rect`, cropping overflow.
    /// Fails when the bytes cannot be decoded.
    fn draw_image(&mut self, image: &[u8], rect: Rect) -> Result<(), CoreError>;

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle)
        -> Result<(), CoreError>;

    /// Encode the current contents as PNG bytes.
    async fn encode_png(&self) -> Result<Vec<u8>, CoreError>;
}

/// Hands out drawing surfaces. Returns `None` when no surface can be made
/// (no canvas context, no font, allocation failure).
pub trait SurfaceProvider: Send + Sync {
    fn create_surface(&self, width: u32, height: u32, scale: f32) -> Option<Box<dyn Surface>>;
}
