//! Canvas, margin and paper-size settings produced by the shell's settings form.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{CanvasSize, Rgb8};
use crate::foundation::error::{PhotoBookError, PhotoBookResult};

/// Width of the interactive preview canvas; its height follows the export aspect.
pub const PREVIEW_CANVAS_WIDTH: u32 = 1900;

/// Default export resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Accepted range for each canvas side, in pixels.
pub const CANVAS_SIDE_RANGE: std::ops::RangeInclusive<u32> = 50..=10_000;

/// Accepted range for each margin, in pixels.
pub const MARGIN_RANGE: std::ops::RangeInclusive<u32> = 0..=200;

/// Named paper sizes offered by the settings form, `(long, short)` sides at 300 DPI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizePreset {
    /// Display name, also persisted as `size_preset`.
    pub name: &'static str,
    /// Long side in pixels.
    pub long_side: u32,
    /// Short side in pixels.
    pub short_side: u32,
}

/// Preset shown on first launch.
pub const DEFAULT_SIZE_PRESET: &str = "A4 3508 x 2480 px (300 DPI)";

const SIZE_PRESETS: &[SizePreset] = &[
    SizePreset {
        name: "A3 4961 x 3508 px (300 DPI)",
        long_side: 4961,
        short_side: 3508,
    },
    SizePreset {
        name: DEFAULT_SIZE_PRESET,
        long_side: 3508,
        short_side: 2480,
    },
    SizePreset {
        name: "A5 2480 x 1748 px (300 DPI)",
        long_side: 2480,
        short_side: 1748,
    },
    SizePreset {
        name: "B5 3035 x 2150 px (300 DPI)",
        long_side: 3035,
        short_side: 2150,
    },
    SizePreset {
        name: "Postcard 1748 x 1181 px (300 DPI)",
        long_side: 1748,
        short_side: 1181,
    },
    SizePreset {
        name: "Square 3543 x 3543 px (300 DPI)",
        long_side: 3543,
        short_side: 3543,
    },
];

impl SizePreset {
    /// Look up a preset by display name.
    pub fn find(name: &str) -> Option<&'static SizePreset> {
        SIZE_PRESETS.iter().find(|p| p.name == name)
    }

    /// All presets in display order.
    pub fn all() -> &'static [SizePreset] {
        SIZE_PRESETS
    }

    /// Canvas for this preset; `portrait` swaps the sides.
    pub fn canvas(&self, portrait: bool) -> CanvasSize {
        orient(self.long_side, self.short_side, portrait)
    }
}

/// Resolve the form's two size spinners and the size switch into a canvas.
///
/// With the switch off the first value is the width.
pub fn orient(size1: u32, size2: u32, switched: bool) -> CanvasSize {
    let a = size1.clamp(*CANVAS_SIDE_RANGE.start(), *CANVAS_SIDE_RANGE.end());
    let b = size2.clamp(*CANVAS_SIDE_RANGE.start(), *CANVAS_SIDE_RANGE.end());
    if switched {
        CanvasSize {
            width: b,
            height: a,
        }
    } else {
        CanvasSize {
            width: a,
            height: b,
        }
    }
}

/// Gutter and framing margins in export pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    /// Gap between adjacent blocks.
    pub spacing_px: u32,
    /// Margin above and below the layout.
    pub top_bottom_px: u32,
    /// Margin left and right of the layout.
    pub side_px: u32,
}

impl Margins {
    /// Build margins, clamping each value into [`MARGIN_RANGE`].
    pub fn new(spacing_px: u32, top_bottom_px: u32, side_px: u32) -> Self {
        let hi = *MARGIN_RANGE.end();
        Self {
            spacing_px: spacing_px.min(hi),
            top_bottom_px: top_bottom_px.min(hi),
            side_px: side_px.min(hi),
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(10, 10, 10)
    }
}

/// Everything the compositing engine reads on each draw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Export raster size.
    pub export: CanvasSize,
    /// Width of the interactive preview canvas.
    pub preview_width: u32,
    /// Physical density written into exported files.
    pub dpi: u32,
    /// Page background, also used for empty blocks on export.
    pub background: Rgb8,
    /// Gutters and framing margins.
    pub margins: Margins,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        let preset = SizePreset::find(DEFAULT_SIZE_PRESET).copied().unwrap_or(SizePreset {
            name: DEFAULT_SIZE_PRESET,
            long_side: 3508,
            short_side: 2480,
        });
        Self {
            export: preset.canvas(false),
            preview_width: PREVIEW_CANVAS_WIDTH,
            dpi: DEFAULT_DPI,
            background: Rgb8::WHITE,
            margins: Margins::default(),
        }
    }
}

impl CanvasConfig {
    /// Preview canvas: fixed width, height derived from the export aspect.
    pub fn edit_size(&self) -> CanvasSize {
        let width = self.preview_width.max(1);
        let height = ((f64::from(width) * self.export.aspect()) as u32).max(1);
        CanvasSize { width, height }
    }

    /// Set the export size after validating both sides.
    pub fn set_export_size(&mut self, width: u32, height: u32) -> PhotoBookResult<()> {
        if !CANVAS_SIDE_RANGE.contains(&width) || !CANVAS_SIDE_RANGE.contains(&height) {
            return Err(PhotoBookError::configuration(format!(
                "canvas {width}x{height} outside {}..={} px",
                CANVAS_SIDE_RANGE.start(),
                CANVAS_SIDE_RANGE.end()
            )));
        }
        self.export = CanvasSize::new(width, height)?;
        Ok(())
    }
}

/// ISO paper scale used when showing the preview at physical size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaperScale {
    /// Canvas width spans the long side of an A4 sheet.
    A4,
    /// One ISO step larger; 1.41 approximates sqrt(2).
    A3,
}

/// A4 long side in inches.
const A4_LONG_SIDE_IN: f64 = 297.0 / 25.4;

/// Effective print density of a canvas `width_px` wide on the given paper.
pub fn paper_dpi(width_px: u32, paper: PaperScale) -> f64 {
    let dpi = f64::from(width_px) / A4_LONG_SIDE_IN;
    match paper {
        PaperScale::A4 => dpi,
        PaperScale::A3 => dpi / 1.41,
    }
}

/// Zoom factor that shows the preview canvas at physical size on a screen of `screen_dpi`.
pub fn actual_size_zoom(config: &CanvasConfig, screen_dpi: f64, paper: PaperScale) -> f64 {
    let canvas_scale = f64::from(config.export.width) / f64::from(config.preview_width.max(1));
    canvas_scale * screen_dpi / paper_dpi(config.export.width, paper)
}

/// Pixels-per-meter for a DPI value, as stored in PNG `pHYs` chunks.
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (f64::from(dpi) / 0.0254).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_canvas_is_landscape_a4() {
        let cfg = CanvasConfig::default();
        assert_eq!(cfg.export, CanvasSize { width: 3508, height: 2480 });
        let edit = cfg.edit_size();
        assert_eq!(edit.width, 1900);
        assert_eq!(edit.height, (1900.0 * 2480.0 / 3508.0) as u32);
    }

    #[test]
    fn orient_swaps_when_switched() {
        assert_eq!(orient(3508, 2480, true), CanvasSize { width: 2480, height: 3508 });
        assert_eq!(orient(20, 20_000, false), CanvasSize { width: 50, height: 10_000 });
    }

    #[test]
    fn margins_are_clamped() {
        let m = Margins::new(500, 10, 201);
        assert_eq!(m, Margins::new(200, 10, 200));
    }

    #[test]
    fn export_size_is_validated() {
        let mut cfg = CanvasConfig::default();
        assert!(cfg.set_export_size(10, 100).is_err());
        cfg.set_export_size(100, 200).unwrap();
        assert_eq!(cfg.export.height, 200);
    }

    #[test]
    fn dpi_helpers() {
        assert_eq!(dpi_to_ppm(300), 11811);
        let a4 = paper_dpi(3508, PaperScale::A4);
        assert!((a4 - 300.0).abs() < 0.05);
        let a3 = paper_dpi(3508, PaperScale::A3);
        assert!((a3 - a4 / 1.41).abs() < 1e-12);

        let cfg = CanvasConfig::default();
        let zoom = actual_size_zoom(&cfg, 96.0, PaperScale::A4);
        let expected = (3508.0 / 1900.0) * 96.0 / a4;
        assert!((zoom - expected).abs() < 1e-12);
    }

    #[test]
    fn presets_resolve() {
        let p = SizePreset::find(DEFAULT_SIZE_PRESET).unwrap();
        assert_eq!(p.canvas(true), CanvasSize { width: 2480, height: 3508 });
        assert!(SizePreset::find("Letter").is_none());
    }
}
