//! Per-block rasterization shared by the preview and export paths.

use image::RgbaImage;

use crate::block::Block;
use crate::foundation::core::{CanvasSize, Rgb8};

pub mod composite;
pub mod fit;
pub mod transform;

use composite::{PixelRect, blit_over, fill_rect, pixel_bounds, stroke_inner};
use fit::{cover_scale, scaled_size};
use transform::{resize_smooth, rotate_expand};

/// Inner band width of a highlight border, in canvas pixels.
pub const HIGHLIGHT_BORDER_PX: u32 = 5;

/// Which bitmap a block renders from and how empty slots look.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Interactive preview: preview bitmaps, swatches for empty slots, highlights.
    #[default]
    Preview,
    /// Final output: full bitmaps, background color for empty slots, no highlights.
    Export,
}

/// Transient highlight state of a block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Highlight {
    #[default]
    None,
    /// The block is selected.
    Selected,
    /// A dragged block would land here.
    DropTarget,
}

/// Inputs shared by every block of one page render.
#[derive(Clone, Copy, Debug)]
pub struct PageParams {
    pub canvas: CanvasSize,
    pub mode: RenderMode,
    pub background: Rgb8,
}

/// Render a whole page: background fill, then every block in order.
pub fn render_page<'a>(
    blocks: impl IntoIterator<Item = (&'a Block, Highlight)>,
    params: PageParams,
) -> RgbaImage {
    let mut page = RgbaImage::from_pixel(
        params.canvas.width,
        params.canvas.height,
        params.background.to_rgba(),
    );
    for (block, highlight) in blocks {
        draw_block(&mut page, block, params, highlight);
    }
    page
}

/// Draw one block into `page`, clipped to its render rectangle.
pub fn draw_block(page: &mut RgbaImage, block: &Block, params: PageParams, highlight: Highlight) {
    let rect = block.render_rect().to_pixels(params.canvas);
    let Some(area) = pixel_bounds(rect, page.width(), page.height()) else {
        return;
    };

    fill_rect(page, area, Rgb8::BLOCK_UNDERLAY.to_rgba());

    let source = match params.mode {
        RenderMode::Preview => block.preview_image(),
        RenderMode::Export => block.full_image(),
    };

    match source {
        Some(img) => {
            let ratio = cover_scale(
                rect.width(),
                rect.height(),
                img.width(),
                img.height(),
                block.user_scale(),
            );
            let (sw, sh) = scaled_size(img.width(), img.height(), ratio);
            let scaled = resize_smooth(img, sw, sh);
            let rotated = rotate_expand(&scaled, block.rotation_deg());

            let offset = block.pan().to_pixels(params.canvas);
            let center = rect.center();
            let left = (center.x - f64::from(rotated.width()) / 2.0 + offset.x).round() as i64;
            let top = (center.y - f64::from(rotated.height()) / 2.0 + offset.y).round() as i64;
            blit_over(page, &rotated, left, top, area);
        }
        None => {
            let fill = match params.mode {
                RenderMode::Preview => block.swatch(),
                RenderMode::Export => params.background,
            };
            fill_rect(page, area, fill.to_rgba());
        }
    }

    if params.mode == RenderMode::Preview {
        draw_highlight(page, area, highlight);
    }
}

fn draw_highlight(page: &mut RgbaImage, area: PixelRect, highlight: Highlight) {
    let color = match highlight {
        Highlight::None => return,
        Highlight::Selected => Rgb8::SELECTED,
        Highlight::DropTarget => Rgb8::DROP_TARGET,
    };
    stroke_inner(page, area, HIGHLIGHT_BORDER_PX, color.to_rgba());
}
