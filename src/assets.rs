use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

pub mod cache;
pub mod decode;

pub use cache::CachedLoader;
pub use decode::{DecodedImage, PREVIEW_MAX_SIZE, decode_image, is_supported_image, load_image};

/// Source of decoded images for blocks.
///
/// Failures are absorbed: an unreadable path yields `None` and the block stays empty.
pub trait ImageLoader: Send + Sync {
    /// Decode (or fetch) the image at `path`.
    fn load(&self, path: &Path) -> Option<Arc<DecodedImage>>;

    /// Decode a batch, preserving input order. Absent paths map to `None`.
    fn load_many(&self, paths: &[Option<&Path>]) -> Vec<Option<Arc<DecodedImage>>> {
        paths
            .par_iter()
            .map(|p| p.and_then(|p| self.load(p)))
            .collect()
    }
}

/// Decodes from disk on every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectLoader;

impl ImageLoader for DirectLoader {
    fn load(&self, path: &Path) -> Option<Arc<DecodedImage>> {
        load_image(path).map(Arc::new)
    }
}
