/// Added to every cover ratio so the scaled image never leaves a one-pixel seam at
/// an exact cover boundary.
pub const COVER_EPSILON: f64 = 0.005;

/// Smallest ratio used when the geometry is degenerate.
pub const MIN_SCALE: f64 = 1e-4;

/// Largest side a scaled bitmap may reach.
pub const MAX_SCALED_SIDE: u32 = 20_000;

/// Cover-fit ratio: the image, scaled by the result, fills `rect_w x rect_h` on both axes
/// (cropping the overflow on one), then `user_scale` zooms on top.
///
/// Zero-sized rectangles or images never produce a zero, negative or infinite ratio.
pub fn cover_scale(rect_w: f64, rect_h: f64, img_w: u32, img_h: u32, user_scale: f64) -> f64 {
    let iw = f64::from(img_w.max(1));
    let ih = f64::from(img_h.max(1));
    let fit = (rect_w.max(0.0) / iw).max(rect_h.max(0.0) / ih);
    let ratio = fit * user_scale;
    let ratio = if ratio.is_finite() && ratio >= MIN_SCALE {
        ratio
    } else {
        MIN_SCALE
    };
    ratio + COVER_EPSILON
}

/// Pixel size of an `img_w x img_h` bitmap scaled by `ratio` (truncated, at least 1x1).
///
/// When the longer side would exceed [`MAX_SCALED_SIDE`] the ratio itself is reduced, so
/// both sides shrink together and the aspect ratio is kept.
pub fn scaled_size(img_w: u32, img_h: u32, ratio: f64) -> (u32, u32) {
    let long = f64::from(img_w.max(img_h).max(1));
    let cap = f64::from(MAX_SCALED_SIDE);
    let ratio = if long * ratio > cap { cap / long } else { ratio };

    let side = |v: u32| -> u32 {
        let s = f64::from(v) * ratio;
        if !s.is_finite() || s < 1.0 {
            return 1;
        }
        ((s + 1e-9) as u32).clamp(1, MAX_SCALED_SIDE)
    };
    (side(img_w), side(img_h))
}
