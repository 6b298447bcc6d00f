use serde::{Deserialize, Serialize};

use crate::foundation::error::{PhotoBookError, PhotoBookResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Rectangle in unit-canvas coordinates, every component nominally in `[0, 1]`.
///
/// Serialized as a `[x, y, w, h]` array, matching the `rect_ratio` field of saved layouts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct RectRatio {
    /// Left edge as a fraction of canvas width.
    pub x: f64,
    /// Top edge as a fraction of canvas height.
    pub y: f64,
    /// Width as a fraction of canvas width.
    pub w: f64,
    /// Height as a fraction of canvas height.
    pub h: f64,
}

impl RectRatio {
    /// The whole canvas.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Build a rectangle from its components.
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Map onto a concrete canvas in absolute pixels.
    pub fn to_pixels(self, canvas: CanvasSize) -> Rect {
        let cw = f64::from(canvas.width);
        let ch = f64::from(canvas.height);
        Rect::new(
            self.x * cw,
            self.y * ch,
            (self.x + self.w) * cw,
            (self.y + self.h) * ch,
        )
    }
}

impl Default for RectRatio {
    fn default() -> Self {
        Self::UNIT
    }
}

impl From<[f64; 4]> for RectRatio {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<RectRatio> for [f64; 4] {
    fn from(r: RectRatio) -> Self {
        [r.x, r.y, r.w, r.h]
    }
}

/// Canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Build a validated canvas size; both sides must be non-zero.
    pub fn new(width: u32, height: u32) -> PhotoBookResult<Self> {
        if width == 0 || height == 0 {
            return Err(PhotoBookError::configuration(
                "canvas width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Height divided by width.
    pub fn aspect(self) -> f64 {
        f64::from(self.height) / f64::from(self.width.max(1))
    }
}

/// Opaque 8-bit RGB color.
///
/// Serialized as `[r, g, b]`, matching the `bg_color` field of saved layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Neutral gray painted under every block before its content.
    pub const BLOCK_UNDERLAY: Self = Self::new(200, 200, 200);
    /// Selection border.
    pub const SELECTED: Self = Self::new(255, 255, 0);
    /// Pending drop-target border.
    pub const DROP_TARGET: Self = Self::new(255, 0, 0);

    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque RGBA pixel for this color.
    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }

    /// Parse `#RRGGBB` (the leading `#` is optional, case-insensitive).
    pub fn parse_hex(s: &str) -> PhotoBookResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return Err(PhotoBookError::validation(
                "hex color must be #RRGGBB (case-insensitive)",
            ));
        }

        fn hex_byte(pair: &str) -> PhotoBookResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| PhotoBookError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        Ok(Self::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        ))
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(c: Rgb8) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Image translation inside its block, as fractions of canvas width/height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PanOffset {
    /// Horizontal offset (fraction of canvas width).
    pub dx: f64,
    /// Vertical offset (fraction of canvas height).
    pub dy: f64,
}

impl PanOffset {
    /// No translation.
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Build an offset from canvas fractions.
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Absolute pixel displacement on `canvas`.
    pub fn to_pixels(self, canvas: CanvasSize) -> Vec2 {
        Vec2::new(
            self.dx * f64::from(canvas.width),
            self.dy * f64::from(canvas.height),
        )
    }

    /// Add a pixel delta measured on `canvas`.
    pub fn nudged(self, delta_px: Vec2, canvas: CanvasSize) -> Self {
        Self {
            dx: self.dx + delta_px.x / f64::from(canvas.width.max(1)),
            dy: self.dy + delta_px.y / f64::from(canvas.height.max(1)),
        }
    }
}
