//! Per-slot state: template geometry, image content and user framing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use rand::Rng;

use crate::assets::{DecodedImage, ImageLoader};
use crate::foundation::core::{CanvasSize, PanOffset, RectRatio, Rgb8, Vec2};
use crate::settings::Margins;

/// Multiplier applied per wheel notch when zooming inside a block.
pub const WHEEL_ZOOM_IN: f64 = 1.05;
/// Multiplier applied per wheel notch when zooming out inside a block.
pub const WHEEL_ZOOM_OUT: f64 = 0.95;

/// Pan and zoom remembered per layout name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Framing {
    /// Image translation.
    pub pan: PanOffset,
    /// Zoom on top of cover-fit.
    pub user_scale: f64,
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            pan: PanOffset::ZERO,
            user_scale: 1.0,
        }
    }
}

/// One rectangular image slot.
#[derive(Clone, Debug)]
pub struct Block {
    template_rect: RectRatio,
    render_rect: RectRatio,
    image_path: Option<PathBuf>,
    image: Option<Arc<DecodedImage>>,
    framing: Framing,
    rotation_deg: i32,
    auto_rotated_fit_scale: f64,
    layout_memory: HashMap<String, Framing>,
    current_layout: Option<String>,
    swatch: Rgb8,
}

impl Block {
    /// New empty block with a random pastel swatch.
    pub fn new(template_rect: RectRatio) -> Self {
        let mut rng = rand::rng();
        let swatch = Rgb8::new(255, rng.random_range(180..=210), rng.random_range(180..=210));
        Self::with_swatch(template_rect, swatch)
    }

    /// New empty block with a fixed swatch.
    pub fn with_swatch(template_rect: RectRatio, swatch: Rgb8) -> Self {
        Self {
            template_rect,
            render_rect: template_rect,
            image_path: None,
            image: None,
            framing: Framing::default(),
            rotation_deg: 0,
            auto_rotated_fit_scale: 1.0,
            layout_memory: HashMap::new(),
            current_layout: None,
            swatch,
        }
    }

    /// Unmargined geometry from the active template.
    pub fn template_rect(&self) -> RectRatio {
        self.template_rect
    }

    /// Geometry after the last margin pass.
    pub fn render_rect(&self) -> RectRatio {
        self.render_rect
    }

    /// Source path, if any. A path may be set while the image failed to decode.
    pub fn image_path(&self) -> Option<&Path> {
        self.image_path.as_deref()
    }

    pub fn image(&self) -> Option<&Arc<DecodedImage>> {
        self.image.as_ref()
    }

    pub fn preview_image(&self) -> Option<&RgbaImage> {
        self.image.as_ref().map(|i| i.preview.as_ref())
    }

    pub fn full_image(&self) -> Option<&RgbaImage> {
        self.image.as_ref().map(|i| i.full.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }

    pub fn pan(&self) -> PanOffset {
        self.framing.pan
    }

    pub fn user_scale(&self) -> f64 {
        self.framing.user_scale
    }

    /// Rotation in degrees, always in `[0, 360)`.
    pub fn rotation_deg(&self) -> i32 {
        self.rotation_deg
    }

    /// Scale restored by [`Block::reset_framing`] for quarter-turned images.
    pub fn auto_rotated_fit_scale(&self) -> f64 {
        self.auto_rotated_fit_scale
    }

    pub fn swatch(&self) -> Rgb8 {
        self.swatch
    }

    pub fn current_layout(&self) -> Option<&str> {
        self.current_layout.as_deref()
    }

    pub fn set_pan(&mut self, pan: PanOffset) {
        self.framing.pan = pan;
    }

    pub fn set_user_scale(&mut self, scale: f64) {
        self.framing.user_scale = scale;
    }

    pub fn set_rotation(&mut self, deg: i32) {
        self.rotation_deg = deg.rem_euclid(360);
    }

    /// Adopt a new template rectangle; render geometry resets until the next margin pass.
    pub fn set_template_rect(&mut self, rect: RectRatio) {
        self.template_rect = rect;
        self.render_rect = rect;
    }

    /// Store the live framing under the current layout, then restore `layout`'s framing
    /// (or the default). Rotation is not part of the memory.
    pub fn switch_layout(&mut self, layout: &str) {
        if let Some(current) = self.current_layout.take() {
            self.layout_memory.insert(current, self.framing);
        }
        self.framing = self.layout_memory.get(layout).copied().unwrap_or_default();
        self.current_layout = Some(layout.to_owned());
    }

    /// Mark `layout` as current without touching the live framing.
    pub fn mark_layout(&mut self, layout: &str) {
        self.current_layout = Some(layout.to_owned());
    }

    /// Point at `path` and decode it through `loader`. Framing is left untouched.
    pub fn set_image(&mut self, path: impl Into<PathBuf>, loader: &dyn ImageLoader) {
        let path = path.into();
        let decoded = loader.load(&path);
        self.set_decoded(Some(path), decoded);
    }

    /// Install an already decoded image (or none) for `path`.
    pub fn set_decoded(&mut self, path: Option<PathBuf>, image: Option<Arc<DecodedImage>>) {
        if let Some(img) = &image {
            self.auto_rotated_fit_scale = img.rot_90_scale;
        }
        self.image_path = path;
        self.image = image;
    }

    /// Drop path and bitmaps. Framing is kept so re-adding the image restores it.
    pub fn clear_image(&mut self) {
        self.image_path = None;
        self.image = None;
    }

    /// Rotate by `delta_deg` (normally +/-90).
    pub fn rotate(&mut self, delta_deg: i32) {
        self.rotation_deg = (self.rotation_deg + delta_deg.rem_euclid(360)).rem_euclid(360);
    }

    /// Center the image and return to cover-fit. Quarter-turned images get
    /// [`Block::auto_rotated_fit_scale`] so they still cover the block.
    pub fn reset_framing(&mut self) {
        self.framing.pan = PanOffset::ZERO;
        self.framing.user_scale = if self.rotation_deg == 0 || self.rotation_deg == 180 {
            1.0
        } else {
            self.auto_rotated_fit_scale
        };
    }

    /// Pan by a pixel delta measured on `canvas`.
    pub fn nudge(&mut self, delta_px: Vec2, canvas: CanvasSize) {
        self.framing.pan = self.framing.pan.nudged(delta_px, canvas);
    }

    /// Wheel zoom: positive deltas zoom in, everything else zooms out.
    pub fn zoom(&mut self, wheel_delta: f64) {
        self.framing.user_scale *= if wheel_delta > 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        };
    }

    /// Exchange content with `other`. Swatch, template geometry and layout memory stay
    /// with the slot.
    pub fn swap_content(&mut self, other: &mut Block) {
        std::mem::swap(&mut self.image_path, &mut other.image_path);
        std::mem::swap(&mut self.image, &mut other.image);
        std::mem::swap(&mut self.framing, &mut other.framing);
        std::mem::swap(&mut self.rotation_deg, &mut other.rotation_deg);
        std::mem::swap(
            &mut self.auto_rotated_fit_scale,
            &mut other.auto_rotated_fit_scale,
        );
    }

    /// Recompute [`Block::render_rect`] for the given margins.
    pub fn update_render_rect(&mut self, margins: Margins, canvas: CanvasSize) {
        self.render_rect = margin_adjusted(self.template_rect, margins, canvas);
    }
}

/// Shrink `rect` by half the block spacing on every edge, then inset the whole layout by
/// the side and top/bottom margins. All pixel values are measured on `canvas`.
pub fn margin_adjusted(rect: RectRatio, margins: Margins, canvas: CanvasSize) -> RectRatio {
    let cw = f64::from(canvas.width.max(1));
    let ch = f64::from(canvas.height.max(1));

    let (margin_x, margin_y) = if margins.spacing_px > 0 {
        let s = f64::from(margins.spacing_px);
        (s / cw, s / ch)
    } else {
        (0.0, 0.0)
    };
    let side = f64::from(margins.side_px) / cw;
    let top = f64::from(margins.top_bottom_px) / ch;
    let side_scale = 1.0 - side * 2.0;
    let top_scale = 1.0 - top * 2.0;

    RectRatio {
        x: (rect.x + margin_x / 2.0) * side_scale + side,
        y: (rect.y + margin_y / 2.0) * top_scale + top,
        w: (rect.w - margin_x) * side_scale,
        h: (rect.h - margin_y) * top_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::decode::from_rgba;

    fn decoded(w: u32, h: u32) -> Arc<DecodedImage> {
        Arc::new(from_rgba(RgbaImage::new(w, h)))
    }

    fn block() -> Block {
        Block::with_swatch(RectRatio::new(0.0, 0.0, 0.5, 0.5), Rgb8::new(255, 190, 190))
    }

    #[test]
    fn random_swatch_stays_in_pastel_range() {
        for _ in 0..32 {
            let s = Block::new(RectRatio::UNIT).swatch();
            assert_eq!(s.r, 255);
            assert!((180..=210).contains(&s.g));
            assert!((180..=210).contains(&s.b));
        }
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        let mut b = block();
        b.set_rotation(90);
        for _ in 0..4 {
            b.rotate(90);
        }
        assert_eq!(b.rotation_deg(), 90);
        b.rotate(-90);
        b.rotate(-90);
        assert_eq!(b.rotation_deg(), 270);
        b.set_rotation(-450);
        assert_eq!(b.rotation_deg(), 270);
    }

    #[test]
    fn reset_framing_uses_rotated_fit_scale_for_quarter_turns() {
        let mut b = block();
        b.set_decoded(Some("a.png".into()), Some(decoded(200, 100)));
        b.set_pan(PanOffset::new(0.1, 0.2));
        b.set_user_scale(3.0);
        b.reset_framing();
        assert_eq!(b.pan(), PanOffset::ZERO);
        assert_eq!(b.user_scale(), 1.0);

        b.rotate(90);
        b.reset_framing();
        assert!((b.user_scale() - 2.0).abs() < 1e-9);

        b.rotate(90);
        b.reset_framing();
        assert_eq!(b.user_scale(), 1.0);
    }

    #[test]
    fn clear_keeps_framing() {
        let mut b = block();
        b.set_decoded(Some("a.png".into()), Some(decoded(4, 4)));
        b.set_user_scale(1.5);
        b.rotate(90);
        b.clear_image();
        assert!(b.is_empty());
        assert!(b.image_path().is_none());
        assert_eq!(b.user_scale(), 1.5);
        assert_eq!(b.rotation_deg(), 90);
    }

    #[test]
    fn swap_twice_restores_both_blocks() {
        let mut a = block();
        let mut b = Block::with_swatch(RectRatio::new(0.5, 0.0, 0.5, 0.5), Rgb8::new(255, 200, 181));
        a.set_decoded(Some("a.png".into()), Some(decoded(10, 20)));
        a.set_user_scale(2.0);
        a.rotate(270);
        b.set_pan(PanOffset::new(-0.05, 0.0));

        a.swap_content(&mut b);
        assert_eq!(b.image_path(), Some(Path::new("a.png")));
        assert!(a.is_empty());
        assert_eq!(a.pan(), PanOffset::new(-0.05, 0.0));
        assert_eq!(b.rotation_deg(), 270);
        assert_eq!(a.swatch(), Rgb8::new(255, 190, 190));
        assert_eq!(a.template_rect(), RectRatio::new(0.0, 0.0, 0.5, 0.5));

        a.swap_content(&mut b);
        assert_eq!(a.image_path(), Some(Path::new("a.png")));
        assert_eq!(a.user_scale(), 2.0);
        assert_eq!(a.rotation_deg(), 270);
        assert!(b.is_empty());
        assert_eq!(b.pan(), PanOffset::new(-0.05, 0.0));
    }

    #[test]
    fn layout_memory_restores_pan_and_scale_but_not_rotation() {
        let mut b = block();
        b.switch_layout("A");
        b.set_user_scale(2.0);
        b.set_pan(PanOffset::new(0.01, 0.02));

        b.switch_layout("B");
        assert_eq!(b.user_scale(), 1.0);
        assert_eq!(b.pan(), PanOffset::ZERO);
        b.rotate(90);

        b.switch_layout("A");
        assert_eq!(b.user_scale(), 2.0);
        assert_eq!(b.pan(), PanOffset::new(0.01, 0.02));
        assert_eq!(b.rotation_deg(), 90);
        assert_eq!(b.current_layout(), Some("A"));
    }

    #[test]
    fn wheel_zoom_steps() {
        let mut b = block();
        b.zoom(120.0);
        assert!((b.user_scale() - 1.05).abs() < 1e-12);
        b.zoom(-120.0);
        assert!((b.user_scale() - 1.05 * 0.95).abs() < 1e-12);
    }

    #[test]
    fn margin_formula() {
        let canvas = CanvasSize::new(1000, 500).unwrap();
        let m = Margins::new(10, 20, 50);
        let out = margin_adjusted(RectRatio::new(0.0, 0.0, 0.5, 1.0), m, canvas);
        let (mx, my) = (0.01, 0.02);
        let (side, top) = (0.05, 0.04);
        assert!((out.x - ((mx / 2.0) * (1.0 - 2.0 * side) + side)).abs() < 1e-12);
        assert!((out.y - ((my / 2.0) * (1.0 - 2.0 * top) + top)).abs() < 1e-12);
        assert!((out.w - (0.5 - mx) * (1.0 - 2.0 * side)).abs() < 1e-12);
        assert!((out.h - (1.0 - my) * (1.0 - 2.0 * top)).abs() < 1e-12);
    }

    #[test]
    fn zero_margins_keep_template_rect() {
        let canvas = CanvasSize::new(640, 480).unwrap();
        let rect = RectRatio::new(0.25, 0.5, 0.5, 0.25);
        assert_eq!(margin_adjusted(rect, Margins::new(0, 0, 0), canvas), rect);
    }

    #[test]
    fn rendered_rects_stay_inside_canvas() {
        let canvas = CanvasSize::new(3508, 2480).unwrap();
        for template in crate::layout::LayoutRegistry::all() {
            for &(s, tb, sd) in &[(0, 0, 0), (10, 10, 10), (200, 200, 200), (37, 0, 150)] {
                for rect in template.rects {
                    let out = margin_adjusted(*rect, Margins::new(s, tb, sd), canvas);
                    assert!(out.w > 0.0 && out.h > 0.0, "{}", template.name);
                    assert!(out.x >= 0.0 && out.y >= 0.0, "{}", template.name);
                    assert!(out.x + out.w <= 1.0 + 1e-9, "{}", template.name);
                    assert!(out.y + out.h <= 1.0 + 1e-9, "{}", template.name);
                }
            }
        }
    }
}
