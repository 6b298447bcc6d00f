use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::foundation::core::{Affine, Point, Vec2};

/// Resample `src` to `width x height` with a bicubic (Catmull-Rom) filter.
pub fn resize_smooth(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    imageops::resize(src, width, height, FilterType::CatmullRom)
}

/// Rotate clockwise by `deg` around the image center, growing the canvas so no corner is
/// clipped. Uncovered pixels are transparent.
///
/// Quarter turns are exact pixel permutations; other angles are resampled bilinearly.
pub fn rotate_expand(src: &RgbaImage, deg: i32) -> RgbaImage {
    match deg.rem_euclid(360) {
        0 => src.clone(),
        90 => imageops::rotate90(src),
        180 => imageops::rotate180(src),
        270 => imageops::rotate270(src),
        d => rotate_arbitrary(src, f64::from(d).to_radians()),
    }
}

/// Bounding box of a `w x h` rectangle rotated by `theta`.
pub fn rotated_bounds(w: u32, h: u32, theta: f64) -> (u32, u32) {
    let (s, c) = theta.sin_cos();
    let (wf, hf) = (f64::from(w), f64::from(h));
    let bw = (wf * c.abs() + hf * s.abs() - 1e-9).ceil();
    let bh = (wf * s.abs() + hf * c.abs() - 1e-9).ceil();
    ((bw as u32).max(1), (bh as u32).max(1))
}

fn rotate_arbitrary(src: &RgbaImage, theta: f64) -> RgbaImage {
    let (w, h) = src.dimensions();
    let (out_w, out_h) = rotated_bounds(w, h, theta);

    let src_center = Vec2::new(f64::from(w) / 2.0, f64::from(h) / 2.0);
    let dst_center = Vec2::new(f64::from(out_w) / 2.0, f64::from(out_h) / 2.0);
    let forward =
        Affine::translate(dst_center) * Affine::rotate(theta) * Affine::translate(-src_center);
    let inverse = forward.inverse();

    let mut out = RgbaImage::new(out_w, out_h);
    for (x, y, px) in out.enumerate_pixels_mut() {
        let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
        *px = sample_bilinear(src, p.x - 0.5, p.y - 0.5);
    }
    out
}

fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = src.dimensions();
    if x <= -1.0 || y <= -1.0 || x >= f64::from(w) || y >= f64::from(h) {
        return Rgba([0, 0, 0, 0]);
    }

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let fetch = |xi: f64, yi: f64| -> [f64; 4] {
        if xi < 0.0 || yi < 0.0 || xi >= f64::from(w) || yi >= f64::from(h) {
            return [0.0; 4];
        }
        let p = src.get_pixel(xi as u32, yi as u32).0;
        // Premultiply so transparent neighbours do not bleed color.
        let a = f64::from(p[3]) / 255.0;
        [
            f64::from(p[0]) * a,
            f64::from(p[1]) * a,
            f64::from(p[2]) * a,
            f64::from(p[3]),
        ]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1.0, y0);
    let p01 = fetch(x0, y0 + 1.0);
    let p11 = fetch(x0 + 1.0, y0 + 1.0);

    let mut acc = [0.0f64; 4];
    for i in 0..4 {
        let top = p00[i] * (1.0 - fx) + p10[i] * fx;
        let bottom = p01[i] * (1.0 - fx) + p11[i] * fx;
        acc[i] = top * (1.0 - fy) + bottom * fy;
    }

    let a = acc[3];
    if a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let unpremul = |c: f64| ((c * 255.0 / a).round()).clamp(0.0, 255.0) as u8;
    Rgba([
        unpremul(acc[0]),
        unpremul(acc[1]),
        unpremul(acc[2]),
        a.round().clamp(0.0, 255.0) as u8,
    ])
}
