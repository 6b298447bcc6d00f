//! The compositing engine: owns the blocks, the canvas settings and the transient
//! interaction state, and exposes one typed command per shell control.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};

use crate::assets::{DirectLoader, ImageLoader, is_supported_image};
use crate::block::Block;
use crate::context::{self, BlockRecord, InputContext, LayoutFile};
use crate::drag::{DragKind, DragSession};
use crate::export::{ExportFormat, ExportOpts, write_raster};
use crate::foundation::core::{CanvasSize, Point, RectRatio, Rgb8};
use crate::foundation::error::{PhotoBookError, PhotoBookResult};
use crate::layout::{DEFAULT_LAYOUT, LayoutRegistry};
use crate::render::{Highlight, PageParams, RenderMode, render_page};
use crate::settings::{CanvasConfig, DEFAULT_SIZE_PRESET, Margins};

/// Collage state plus the commands the shell drives it with.
pub struct CollageEngine {
    config: CanvasConfig,
    layout: String,
    size_preset: String,
    size_switch: bool,
    blocks: Vec<Block>,
    block_count: usize,
    mode: RenderMode,
    selection: Option<usize>,
    drag: Option<DragSession>,
    loader: Arc<dyn ImageLoader>,
}

impl std::fmt::Debug for CollageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollageEngine")
            .field("layout", &self.layout)
            .field("config", &self.config)
            .field("blocks", &self.blocks.len())
            .field("block_count", &self.block_count)
            .field("mode", &self.mode)
            .field("selection", &self.selection)
            .field("drag", &self.drag)
            .finish()
    }
}

impl Default for CollageEngine {
    fn default() -> Self {
        let mut engine = Self::empty(Arc::new(DirectLoader));
        engine.apply_template(DEFAULT_LAYOUT, LayoutRegistry::get_template(DEFAULT_LAYOUT).unwrap_or(&[]));
        engine
    }
}

impl CollageEngine {
    /// Engine showing `layout`, decoding straight from disk.
    pub fn new(layout: &str) -> PhotoBookResult<Self> {
        Self::with_loader(layout, Arc::new(DirectLoader))
    }

    /// Engine showing `layout`, decoding through `loader`.
    pub fn with_loader(layout: &str, loader: Arc<dyn ImageLoader>) -> PhotoBookResult<Self> {
        let rects = LayoutRegistry::get_template(layout)?;
        let mut engine = Self::empty(loader);
        engine.apply_template(layout, rects);
        Ok(engine)
    }

    fn empty(loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            config: CanvasConfig::default(),
            layout: String::new(),
            size_preset: DEFAULT_SIZE_PRESET.to_owned(),
            size_switch: false,
            blocks: Vec::new(),
            block_count: 0,
            mode: RenderMode::Preview,
            selection: None,
            drag: None,
            loader,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn layout_name(&self) -> &str {
        &self.layout
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Every allocated block, active ones first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The blocks the current layout draws.
    pub fn active_blocks(&self) -> &[Block] {
        &self.blocks[..self.block_count.min(self.blocks.len())]
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn canvas(&self) -> CanvasSize {
        match self.mode {
            RenderMode::Preview => self.config.edit_size(),
            RenderMode::Export => self.config.export,
        }
    }

    pub fn loader(&self) -> &dyn ImageLoader {
        self.loader.as_ref()
    }


    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> PhotoBookResult<()> {
        self.config.set_export_size(width, height)?;
        self.relayout();
        Ok(())
    }

    /// Apply a named size preset, optionally in portrait.
    pub fn set_size_preset(&mut self, name: &str, portrait: bool) -> PhotoBookResult<()> {
        let preset = crate::settings::SizePreset::find(name)
            .ok_or_else(|| PhotoBookError::configuration(format!("unknown size preset '{name}'")))?;
        let canvas = preset.canvas(portrait);
        self.config.set_export_size(canvas.width, canvas.height)?;
        self.size_preset = name.to_owned();
        self.size_switch = portrait;
        self.relayout();
        Ok(())
    }

    pub fn set_margins(&mut self, spacing_px: u32, top_bottom_px: u32, side_px: u32) {
        self.config.margins = Margins::new(spacing_px, top_bottom_px, side_px);
        self.relayout();
    }

    pub fn set_background_color(&mut self, color: Rgb8) {
        self.config.background = color;
    }

    pub fn set_dpi(&mut self, dpi: u32) -> PhotoBookResult<()> {
        if dpi == 0 {
            return Err(PhotoBookError::configuration("dpi must be > 0"));
        }
        self.config.dpi = dpi;
        Ok(())
    }

    /// Switch to `name`. Block *i* keeps its content and adopts slot *i*; pan and scale
    /// come from that block's memory for `name`, rotation carries over.
    pub fn set_layout(&mut self, name: &str) -> PhotoBookResult<()> {
        let rects = LayoutRegistry::get_template(name)?;
        self.apply_template(name, rects);
        Ok(())
    }

    fn apply_template(&mut self, name: &str, rects: &[RectRatio]) {
        for (i, rect) in rects.iter().enumerate() {
            if i >= self.blocks.len() {
                self.blocks.push(Block::new(*rect));
            }
            let block = &mut self.blocks[i];
            block.set_template_rect(*rect);
            block.switch_layout(name);
        }
        self.block_count = rects.len();
        self.layout = name.to_owned();
        self.selection = self.selection.filter(|&i| i < self.block_count);
        self.drag = None;
        tracing::debug!(layout = name, blocks = self.block_count, "layout switched");
        self.relayout();
    }

    /// Recompute every active block's render rectangle from the current margins.
    ///
    /// Margins are measured in configured export pixels, so the preview shows the same
    /// fractions the default export renders.
    pub fn relayout(&mut self) {
        self.relayout_for(self.config.export);
    }

    /// Recompute render rectangles with margins measured on `canvas`.
    fn relayout_for(&mut self, canvas: CanvasSize) {
        let margins = self.config.margins;
        let n = self.block_count.min(self.blocks.len());
        for block in &mut self.blocks[..n] {
            block.update_render_rect(margins, canvas);
        }
    }


    /// Load `path` into block `index`. `index == blocks().len()` appends a new (inactive
    /// unless the layout has room) block.
    pub fn set_image_at_index(&mut self, index: usize, path: impl Into<PathBuf>) -> PhotoBookResult<()> {
        let loader = Arc::clone(&self.loader);
        self.block_slot(index)?.set_image(path, loader.as_ref());
        Ok(())
    }

    fn block_slot(&mut self, index: usize) -> PhotoBookResult<&mut Block> {
        if index == self.blocks.len() {
            let mut block = Block::new(RectRatio::UNIT);
            block.mark_layout(&self.layout);
            self.blocks.push(block);
        }
        let len = self.blocks.len();
        self.blocks.get_mut(index).ok_or_else(|| {
            PhotoBookError::validation(format!("block index {index} out of range (have {len})"))
        })
    }

    fn block_mut(&mut self, index: usize) -> PhotoBookResult<&mut Block> {
        let len = self.blocks.len();
        self.blocks.get_mut(index).ok_or_else(|| {
            PhotoBookError::validation(format!("block index {index} out of range (have {len})"))
        })
    }

    /// Fill blocks from index 0 with `paths`, in the given order, skipping files whose
    /// extension is not a supported image. Returns the number of blocks filled.
    pub fn import_images<P: AsRef<Path>>(&mut self, paths: &[P]) -> PhotoBookResult<usize> {
        let accepted: Vec<&Path> = paths
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| is_supported_image(p))
            .collect();
        let lookups: Vec<Option<&Path>> = accepted.iter().copied().map(Some).collect();
        let decoded = self.loader.load_many(&lookups);
        for (index, (path, image)) in accepted.iter().zip(decoded).enumerate() {
            self.block_slot(index)?
                .set_decoded(Some(path.to_path_buf()), image);
        }
        Ok(accepted.len())
    }

    /// Lexicographically sorted image files of `dir`, imported from index 0.
    pub fn import_folder(&mut self, dir: &Path) -> PhotoBookResult<usize> {
        let paths = crate::import::list_image_files(dir)?;
        self.import_images(&paths)
    }

    /// External file dropped on block `index`. Returns `false` for unsupported files.
    pub fn drop_file(&mut self, index: usize, path: &Path) -> PhotoBookResult<bool> {
        if !path.is_file() || !is_supported_image(path) {
            return Ok(false);
        }
        self.set_image_at_index(index, path)?;
        Ok(true)
    }

    pub fn rotate_block(&mut self, index: usize, delta_deg: i32) -> PhotoBookResult<()> {
        self.block_mut(index)?.rotate(delta_deg);
        Ok(())
    }

    /// Rotate the selected block; no-op without a selection.
    pub fn rotate_selected(&mut self, delta_deg: i32) {
        if let Some(i) = self.selection
            && let Some(block) = self.blocks.get_mut(i)
        {
            block.rotate(delta_deg);
        }
    }

    pub fn reset_block_framing(&mut self, index: usize) -> PhotoBookResult<()> {
        self.block_mut(index)?.reset_framing();
        Ok(())
    }

    pub fn clear_block_image(&mut self, index: usize) -> PhotoBookResult<()> {
        self.block_mut(index)?.clear_image();
        Ok(())
    }

    /// Wheel zoom inside block `index`.
    pub fn zoom_block(&mut self, index: usize, wheel_delta: f64) -> PhotoBookResult<()> {
        self.block_mut(index)?.zoom(wheel_delta);
        Ok(())
    }

    pub fn swap_blocks(&mut self, a: usize, b: usize) -> PhotoBookResult<()> {
        let len = self.blocks.len();
        if a >= len || b >= len {
            return Err(PhotoBookError::validation(format!(
                "swap {a}<->{b} out of range (have {len})"
            )));
        }
        if a == b {
            return Ok(());
        }
        let (lo, hi) = (a.min(b), a.max(b));
        let (left, right) = self.blocks.split_at_mut(hi);
        left[lo].swap_content(&mut right[0]);
        Ok(())
    }


    pub fn selected(&self) -> Option<usize> {
        self.selection
    }

    pub fn select(&mut self, index: usize) -> PhotoBookResult<()> {
        if index >= self.block_count {
            return Err(PhotoBookError::validation(format!(
                "cannot select inactive block {index}"
            )));
        }
        self.selection = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Topmost active block under `point` (preview canvas pixels).
    pub fn block_at(&self, point: Point) -> Option<usize> {
        let canvas = self.config.edit_size();
        self.active_blocks()
            .iter()
            .enumerate()
            .rev()
            .find(|(_, b)| b.render_rect().to_pixels(canvas).contains(point))
            .map(|(i, _)| i)
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    /// Start dragging block `index`; it becomes the selection.
    pub fn begin_drag(&mut self, index: usize, at: Point, kind: DragKind) -> PhotoBookResult<()> {
        self.select(index)?;
        self.drag = Some(DragSession::new(index, kind, at));
        Ok(())
    }

    /// Pointer moved to `at` (preview canvas pixels).
    pub fn drag_to(&mut self, at: Point) {
        let target = self.block_at(at);
        let canvas = self.config.edit_size();
        let Some(session) = self.drag.as_mut() else {
            return;
        };
        let delta = session.advance(at);
        match session.kind() {
            DragKind::Pan => {
                let source = session.source();
                if let Some(block) = self.blocks.get_mut(source) {
                    block.nudge(delta, canvas);
                }
            }
            DragKind::Swap => session.set_target(target),
        }
    }

    /// Finish the drag at `at`. A swap drag released over another block exchanges
    /// content with it; returns the swapped pair.
    pub fn end_drag(&mut self, at: Point) -> PhotoBookResult<Option<(usize, usize)>> {
        self.drag_to(at);
        let Some(session) = self.drag.take() else {
            return Ok(None);
        };
        match (session.kind(), session.target()) {
            (DragKind::Swap, Some(target)) => {
                self.swap_blocks(session.source(), target)?;
                Ok(Some((session.source(), target)))
            }
            _ => Ok(None),
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    fn highlight(&self, index: usize) -> Highlight {
        if self.drag.and_then(|d| d.target()) == Some(index) {
            Highlight::DropTarget
        } else if self.selection == Some(index) {
            Highlight::Selected
        } else {
            Highlight::None
        }
    }


    pub fn render_preview(&self) -> RgbaImage {
        let params = PageParams {
            canvas: self.config.edit_size(),
            mode: RenderMode::Preview,
            background: self.config.background,
        };
        render_page(
            self.active_blocks()
                .iter()
                .enumerate()
                .map(|(i, b)| (b, self.highlight(i))),
            params,
        )
    }

    /// Export at the configured size, density and background.
    pub fn export_image(&mut self, path: &Path) -> PhotoBookResult<()> {
        let opts = ExportOpts {
            width: self.config.export.width,
            height: self.config.export.height,
            dpi: self.config.dpi,
            background: self.config.background,
        };
        self.export_with(path, opts)
    }

    /// Full-resolution render written to `path`. Selection and drag state are cleared;
    /// the engine is back in preview mode afterwards whether or not the write succeeded.
    #[tracing::instrument(skip(self), fields(layout = %self.layout))]
    pub fn export_with(&mut self, path: &Path, opts: ExportOpts) -> PhotoBookResult<()> {
        ExportFormat::from_path(path)?;
        let canvas = CanvasSize::new(opts.width, opts.height)
            .map_err(|e| PhotoBookError::export(e.to_string()))?;

        self.mode = RenderMode::Export;
        self.relayout_for(canvas);
        self.selection = None;
        self.drag = None;

        let result = {
            let params = PageParams {
                canvas,
                mode: RenderMode::Export,
                background: opts.background,
            };
            let page = render_page(
                self.active_blocks().iter().map(|b| (b, Highlight::None)),
                params,
            );
            let rgb = DynamicImage::ImageRgba8(page).into_rgb8();
            write_raster(path, &rgb, opts.dpi)
        };

        self.mode = RenderMode::Preview;
        self.relayout();
        result
    }


    /// Records of the active blocks.
    pub fn context(&self) -> Vec<BlockRecord> {
        context::to_context(self.active_blocks())
    }

    /// Records of the inactive blocks kept past the active count.
    pub fn stock_context(&self) -> Vec<BlockRecord> {
        let n = self.block_count.min(self.blocks.len());
        context::to_context(&self.blocks[n..])
    }

    /// Restore active blocks from `records`; their count becomes the active count.
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    pub fn set_context(&mut self, records: &[BlockRecord]) {
        context::from_context(&mut self.blocks, records, self.loader.as_ref());
        self.block_count = records.len();
        let n = self.block_count.min(self.blocks.len());
        for block in &mut self.blocks[..n] {
            block.mark_layout(&self.layout);
        }
        self.selection = None;
        self.drag = None;
        self.relayout();
    }

    pub fn input_context(&self) -> InputContext {
        InputContext::from_config(&self.config, &self.layout)
            .with_size_form(&self.size_preset, self.size_switch)
    }

    pub fn layout_file(&self, window_size: Option<[u32; 2]>) -> LayoutFile {
        LayoutFile {
            input_context: self.input_context(),
            photo_context: self.context(),
            stock_context: self.stock_context(),
            window_size,
        }
    }

    /// Replace the engine state with a saved document.
    ///
    /// Unknown layout names fail before anything is changed.
    pub fn apply_layout_file(&mut self, file: &LayoutFile) -> PhotoBookResult<()> {
        let input = &file.input_context;
        LayoutRegistry::get(&input.layout)?;

        input.apply_to(&mut self.config);
        self.size_preset = input.size_preset.clone();
        self.size_switch = input.size_switch;
        self.layout = input.layout.clone();

        let records: Vec<BlockRecord> = file
            .photo_context
            .iter()
            .chain(&file.stock_context)
            .cloned()
            .collect();
        context::from_context(&mut self.blocks, &records, self.loader.as_ref());
        self.block_count = file.photo_context.len();
        for block in &mut self.blocks[..records.len()] {
            block.mark_layout(&self.layout);
        }
        self.selection = None;
        self.drag = None;
        self.relayout();
        Ok(())
    }

    /// Load a layout file chosen by the user. Errors propagate.
    pub fn load_layout(&mut self, path: &Path) -> PhotoBookResult<()> {
        let file = context::load_layout_file(path)?;
        self.apply_layout_file(&file)
    }

    pub fn save_layout(&self, path: &Path, window_size: Option<[u32; 2]>) -> PhotoBookResult<()> {
        context::save_layout_file(path, &self.layout_file(window_size))
    }
}
