#![forbid(unsafe_code)]

pub mod assets;
pub mod block;
pub mod context;
pub mod drag;
pub mod engine;
pub mod export;
pub mod foundation;
pub mod import;
pub mod layout;
pub mod render;
pub mod session;
pub mod settings;

pub use assets::{CachedLoader, DecodedImage, DirectLoader, ImageLoader, decode_image};
pub use block::Block;
pub use context::{BlockRecord, InputContext, LayoutFile, load_layout_file, save_layout_file};
pub use drag::{DragKind, DragSession};
pub use engine::CollageEngine;
pub use export::{ExportFormat, ExportOpts};
pub use foundation::core::{CanvasSize, PanOffset, Point, RectRatio, Rgb8};
pub use foundation::error::{PhotoBookError, PhotoBookResult};
pub use layout::{DEFAULT_LAYOUT, LayoutRegistry, LayoutTemplate};
pub use render::{Highlight, RenderMode};
pub use session::Session;
pub use settings::{CanvasConfig, Margins, PaperScale, SizePreset, actual_size_zoom, paper_dpi};
