//! Saved-layout records and the JSON file that carries them.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::ImageLoader;
use crate::block::Block;
use crate::foundation::core::{CanvasSize, PanOffset, RectRatio, Rgb8};
use crate::foundation::error::{PhotoBookError, PhotoBookResult};
use crate::layout::DEFAULT_LAYOUT;
use crate::settings::{CanvasConfig, DEFAULT_DPI, DEFAULT_SIZE_PRESET, Margins, orient};

/// Persisted state of one block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    /// Template rectangle (unmargined).
    #[serde(default)]
    pub rect_ratio: RectRatio,
    /// Pan as a fraction of canvas width.
    #[serde(default)]
    pub offset_x: f64,
    /// Pan as a fraction of canvas height.
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for BlockRecord {
    fn default() -> Self {
        Self {
            rect_ratio: RectRatio::UNIT,
            offset_x: 0.0,
            offset_y: 0.0,
            scale: default_scale(),
            rotation: 0,
            file_path: None,
        }
    }
}

impl BlockRecord {
    /// Snapshot a block.
    pub fn from_block(block: &Block) -> Self {
        let pan = block.pan();
        Self {
            rect_ratio: block.template_rect(),
            offset_x: pan.dx,
            offset_y: pan.dy,
            scale: block.user_scale(),
            rotation: block.rotation_deg(),
            file_path: block.image_path().map(Path::to_path_buf),
        }
    }
}

/// Settings-form values stored alongside the blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputContext {
    pub size_preset: String,
    /// First size spinner (width unless switched).
    pub size1: u32,
    /// Second size spinner.
    pub size2: u32,
    pub size_switch: bool,
    pub layout: String,
    pub space_margin: u32,
    pub top_under_margin: u32,
    pub side_margin: u32,
    pub bg_color: Rgb8,
    pub dpi: u32,
}

impl Default for InputContext {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default(), DEFAULT_LAYOUT)
    }
}

impl InputContext {
    /// Capture `config` and the active layout name.
    pub fn from_config(config: &CanvasConfig, layout: &str) -> Self {
        let CanvasSize { width, height } = config.export;
        Self {
            size_preset: DEFAULT_SIZE_PRESET.to_owned(),
            size1: width,
            size2: height,
            size_switch: false,
            layout: layout.to_owned(),
            space_margin: config.margins.spacing_px,
            top_under_margin: config.margins.top_bottom_px,
            side_margin: config.margins.side_px,
            bg_color: config.background,
            dpi: config.dpi,
        }
    }

    /// Record the form's preset name and size switch; spinner order follows the switch.
    pub fn with_size_form(mut self, size_preset: &str, size_switch: bool) -> Self {
        if size_switch != self.size_switch {
            std::mem::swap(&mut self.size1, &mut self.size2);
        }
        self.size_preset = size_preset.to_owned();
        self.size_switch = size_switch;
        self
    }

    /// Export canvas these values describe.
    pub fn canvas_size(&self) -> CanvasSize {
        orient(self.size1, self.size2, self.size_switch)
    }

    /// Apply onto `config`, keeping its preview width.
    pub fn apply_to(&self, config: &mut CanvasConfig) {
        config.export = self.canvas_size();
        config.margins = Margins::new(self.space_margin, self.top_under_margin, self.side_margin);
        config.background = self.bg_color;
        config.dpi = if self.dpi == 0 { DEFAULT_DPI } else { self.dpi };
    }
}

/// The on-disk layout document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutFile {
    #[serde(default)]
    pub input_context: InputContext,
    /// Active blocks, in slot order.
    #[serde(default)]
    pub photo_context: Vec<BlockRecord>,
    /// Inactive blocks kept beyond the active count.
    #[serde(default)]
    pub stock_context: Vec<BlockRecord>,
    /// Shell window size, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_size: Option<[u32; 2]>,
}

/// Snapshot every block in order.
pub fn to_context(blocks: &[Block]) -> Vec<BlockRecord> {
    blocks.iter().map(BlockRecord::from_block).collect()
}

/// Restore `records` into the leading blocks, growing `blocks` when needed.
///
/// Existing blocks past `records.len()` are left untouched. Images are re-decoded from
/// their paths; paths that no longer resolve leave the block empty.
pub fn from_context(blocks: &mut Vec<Block>, records: &[BlockRecord], loader: &dyn ImageLoader) {
    while blocks.len() < records.len() {
        blocks.push(Block::new(RectRatio::UNIT));
    }

    let paths: Vec<Option<&Path>> = records.iter().map(|r| r.file_path.as_deref()).collect();
    let decoded = loader.load_many(&paths);

    for ((block, record), image) in blocks.iter_mut().zip(records).zip(decoded) {
        block.set_template_rect(record.rect_ratio);
        block.set_pan(PanOffset::new(record.offset_x, record.offset_y));
        block.set_user_scale(record.scale);
        block.set_rotation(record.rotation);
        block.set_decoded(record.file_path.clone(), image);
    }
}

/// Read and parse a layout file.
pub fn load_layout_file(path: &Path) -> PhotoBookResult<LayoutFile> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PhotoBookError::persistence(format!("read layout '{}': {e}", path.display()))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        PhotoBookError::persistence(format!("parse layout '{}': {e}", path.display()))
    })
}

/// Write `file` as pretty JSON, atomically replacing `path`.
pub fn save_layout_file(path: &Path, file: &LayoutFile) -> PhotoBookResult<()> {
    let json = serde_json::to_vec_pretty(file).context("serialize layout")?;
    write_atomic(path, &json)?;
    Ok(())
}

/// Write `bytes` to a temporary sibling of `path`, then rename it into place.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in '{}'", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("write '{}'", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("flush '{}'", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("rename into '{}'", path.display()))?;
    Ok(())
}
