use image::{Rgba, RgbaImage};

use crate::foundation::core::Rect;
use crate::foundation::math::blend_channel;

/// Integer pixel rectangle `[x0, x1) x [y0, y1)`, already clipped to a target buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn width(self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(self) -> u32 {
        self.y1 - self.y0
    }

    pub fn intersect(self, other: PixelRect) -> Option<PixelRect> {
        let r = PixelRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (r.x0 < r.x1 && r.y0 < r.y1).then_some(r)
    }
}

/// Snap `rect` to whole pixels and clip to a `width x height` buffer.
///
/// Returns `None` for rectangles with no pixels left, including NaN geometry.
pub fn pixel_bounds(rect: Rect, width: u32, height: u32) -> Option<PixelRect> {
    fn snap(v: f64, hi: u32) -> u32 {
        if v.is_nan() {
            return 0;
        }
        v.round().clamp(0.0, f64::from(hi)) as u32
    }
    let r = PixelRect {
        x0: snap(rect.x0, width),
        y0: snap(rect.y0, height),
        x1: snap(rect.x1, width),
        y1: snap(rect.y1, height),
    };
    (r.x0 < r.x1 && r.y0 < r.y1).then_some(r)
}

/// Overwrite every pixel of `area` with `color`.
pub fn fill_rect(dst: &mut RgbaImage, area: PixelRect, color: Rgba<u8>) {
    for y in area.y0..area.y1 {
        for x in area.x0..area.x1 {
            dst.put_pixel(x, y, color);
        }
    }
}

/// Composite straight-alpha `src`, top-left at `(left, top)`, over `dst`, touching only
/// pixels inside `clip`.
pub fn blit_over(dst: &mut RgbaImage, src: &RgbaImage, left: i64, top: i64, clip: PixelRect) {
    let (sw, sh) = src.dimensions();
    let placed = {
        let x0 = left.max(0).min(i64::from(u32::MAX)) as u32;
        let y0 = top.max(0).min(i64::from(u32::MAX)) as u32;
        let x1 = (left + i64::from(sw)).clamp(0, i64::from(u32::MAX)) as u32;
        let y1 = (top + i64::from(sh)).clamp(0, i64::from(u32::MAX)) as u32;
        PixelRect { x0, y0, x1, y1 }
    };
    let Some(area) = clip.intersect(placed) else {
        return;
    };

    for y in area.y0..area.y1 {
        let sy = (i64::from(y) - top) as u32;
        for x in area.x0..area.x1 {
            let sx = (i64::from(x) - left) as u32;
            let s = src.get_pixel(sx, sy).0;
            match s[3] {
                0 => {}
                255 => dst.put_pixel(x, y, Rgba(s)),
                a => {
                    let d = dst.get_pixel_mut(x, y);
                    for i in 0..3 {
                        d.0[i] = blend_channel(d.0[i], s[i], a);
                    }
                    d.0[3] = 255;
                }
            }
        }
    }
}

/// Paint a solid band `thickness` pixels wide along the inside of `area`.
/// No anti-aliasing: edges land exactly on pixel boundaries.
pub fn stroke_inner(dst: &mut RgbaImage, area: PixelRect, thickness: u32, color: Rgba<u8>) {
    if thickness == 0 {
        return;
    }
    let t_x = thickness.min(area.width());
    let t_y = thickness.min(area.height());
    let bands = [
        PixelRect {
            y1: area.y0 + t_y,
            ..area
        },
        PixelRect {
            y0: area.y1 - t_y,
            ..area
        },
        PixelRect {
            x1: area.x0 + t_x,
            ..area
        },
        PixelRect {
            x0: area.x1 - t_x,
            ..area
        },
    ];
    for band in bands {
        fill_rect(dst, band, color);
    }
}
