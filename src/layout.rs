//! Built-in collage templates.
//!
//! A template is an ordered list of [`RectRatio`] slots on a unit canvas. Slots are
//! author-defined and may overlap; the registry does not validate coverage.

use crate::foundation::core::RectRatio;
use crate::foundation::error::{PhotoBookError, PhotoBookResult};

/// Template selected when nothing else is configured.
pub const DEFAULT_LAYOUT: &str = "grid-2x2";

/// One named layout.
#[derive(Clone, Copy, Debug)]
pub struct LayoutTemplate {
    /// Registry key.
    pub name: &'static str,
    /// Slots in block order.
    pub rects: &'static [RectRatio],
    /// The shell switches the canvas to portrait when this layout is picked.
    pub prefers_portrait: bool,
}

impl LayoutTemplate {
    /// Number of blocks this layout activates.
    pub fn block_count(&self) -> usize {
        self.rects.len()
    }
}

const fn r(x: f64, y: f64, w: f64, h: f64) -> RectRatio {
    RectRatio::new(x, y, w, h)
}

const THIRD: f64 = 1.0 / 3.0;
const TWO_THIRDS: f64 = 2.0 / 3.0;

const SINGLE: &[RectRatio] = &[r(0.0, 0.0, 1.0, 1.0)];

const TWO_COLUMNS: &[RectRatio] = &[r(0.0, 0.0, 0.5, 1.0), r(0.5, 0.0, 0.5, 1.0)];

const TWO_ROWS: &[RectRatio] = &[r(0.0, 0.0, 1.0, 0.5), r(0.0, 0.5, 1.0, 0.5)];

const FEATURE_LEFT: &[RectRatio] = &[
    r(0.0, 0.0, TWO_THIRDS, 1.0),
    r(TWO_THIRDS, 0.0, THIRD, 0.5),
    r(TWO_THIRDS, 0.5, THIRD, 0.5),
];

const FEATURE_TOP: &[RectRatio] = &[
    r(0.0, 0.0, 1.0, 0.6),
    r(0.0, 0.6, THIRD, 0.4),
    r(THIRD, 0.6, THIRD, 0.4),
    r(TWO_THIRDS, 0.6, THIRD, 0.4),
];

const GRID_2X2: &[RectRatio] = &[
    r(0.0, 0.0, 0.5, 0.5),
    r(0.5, 0.0, 0.5, 0.5),
    r(0.0, 0.5, 0.5, 0.5),
    r(0.5, 0.5, 0.5, 0.5),
];

const GRID_3X2: &[RectRatio] = &[
    r(0.0, 0.0, THIRD, 0.5),
    r(THIRD, 0.0, THIRD, 0.5),
    r(TWO_THIRDS, 0.0, THIRD, 0.5),
    r(0.0, 0.5, THIRD, 0.5),
    r(THIRD, 0.5, THIRD, 0.5),
    r(TWO_THIRDS, 0.5, THIRD, 0.5),
];

const GRID_2X3: &[RectRatio] = &[
    r(0.0, 0.0, 0.5, THIRD),
    r(0.5, 0.0, 0.5, THIRD),
    r(0.0, THIRD, 0.5, THIRD),
    r(0.5, THIRD, 0.5, THIRD),
    r(0.0, TWO_THIRDS, 0.5, THIRD),
    r(0.5, TWO_THIRDS, 0.5, THIRD),
];

const GRID_3X3: &[RectRatio] = &[
    r(0.0, 0.0, THIRD, THIRD),
    r(THIRD, 0.0, THIRD, THIRD),
    r(TWO_THIRDS, 0.0, THIRD, THIRD),
    r(0.0, THIRD, THIRD, THIRD),
    r(THIRD, THIRD, THIRD, THIRD),
    r(TWO_THIRDS, THIRD, THIRD, THIRD),
    r(0.0, TWO_THIRDS, THIRD, THIRD),
    r(THIRD, TWO_THIRDS, THIRD, THIRD),
    r(TWO_THIRDS, TWO_THIRDS, THIRD, THIRD),
];

const MOSAIC_5: &[RectRatio] = &[
    r(0.0, 0.0, 0.5, TWO_THIRDS),
    r(0.5, 0.0, 0.5, THIRD),
    r(0.5, THIRD, 0.5, THIRD),
    r(0.0, TWO_THIRDS, 0.5, THIRD),
    r(0.5, TWO_THIRDS, 0.5, THIRD),
];

const STRIP_4: &[RectRatio] = &[
    r(0.0, 0.0, 1.0, 0.25),
    r(0.0, 0.25, 1.0, 0.25),
    r(0.0, 0.5, 1.0, 0.25),
    r(0.0, 0.75, 1.0, 0.25),
];

const TEMPLATES: &[LayoutTemplate] = &[
    LayoutTemplate {
        name: "single",
        rects: SINGLE,
        prefers_portrait: false,
    },
    LayoutTemplate {
        name: "two-columns",
        rects: TWO_COLUMNS,
        prefers_portrait: false,
    },
    LayoutTemplate {
        name: "two-rows",
        rects: TWO_ROWS,
        prefers_portrait: true,
    },
    LayoutTemplate {
        name: "feature-left",
        rects: FEATURE_LEFT,
        prefers_portrait: false,
    },
    LayoutTemplate {
        name: "feature-top",
        rects: FEATURE_TOP,
        prefers_portrait: true,
    },
    LayoutTemplate {
        name: "grid-2x2",
        rects: GRID_2X2,
        prefers_portrait: false,
    },
    LayoutTemplate {
        name: "grid-3x2",
        rects: GRID_3X2,
        prefers_portrait: false,
    },
    LayoutTemplate {
        name: "grid-2x3",
        rects: GRID_2X3,
        prefers_portrait: true,
    },
    LayoutTemplate {
        name: "grid-3x3",
        rects: GRID_3X3,
        prefers_portrait: false,
    },
    LayoutTemplate {
        name: "mosaic-5",
        rects: MOSAIC_5,
        prefers_portrait: false,
    },
    LayoutTemplate {
        name: "strip-4",
        rects: STRIP_4,
        prefers_portrait: true,
    },
];

/// Static name -> template lookup.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutRegistry;

impl LayoutRegistry {
    /// Look up a template by name.
    pub fn get(name: &str) -> PhotoBookResult<&'static LayoutTemplate> {
        TEMPLATES
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| PhotoBookError::configuration(format!("unknown layout '{name}'")))
    }

    /// Slots of the named template.
    pub fn get_template(name: &str) -> PhotoBookResult<&'static [RectRatio]> {
        Ok(Self::get(name)?.rects)
    }

    /// Whether the named layout is authored for a portrait canvas.
    pub fn prefers_portrait(name: &str) -> PhotoBookResult<bool> {
        Ok(Self::get(name)?.prefers_portrait)
    }

    /// Registered names in registration order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        TEMPLATES.iter().map(|t| t.name)
    }

    /// All templates in registration order.
    pub fn all() -> &'static [LayoutTemplate] {
        TEMPLATES
    }
}
