use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use image::RgbaImage;
use image::imageops::FilterType;

use crate::foundation::error::PhotoBookResult;

/// Long side of the interactive preview bitmap.
pub const PREVIEW_MAX_SIZE: u32 = 512;

/// File extensions accepted by batch import and file drops (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// A source photo decoded once, in both resolutions the engine renders from.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Untouched decode, used for export.
    pub full: Arc<RgbaImage>,
    /// Downscaled copy, long side [`PREVIEW_MAX_SIZE`], used while editing.
    pub preview: Arc<RgbaImage>,
    /// Long side over short side; the user scale that keeps a quarter-turned
    /// image covering a block after a framing reset.
    pub rot_90_scale: f64,
}

/// Decode `path` into straight-alpha RGBA8 plus its preview.
#[tracing::instrument(level = "debug")]
pub fn decode_image(path: &Path) -> PhotoBookResult<DecodedImage> {
    let dyn_img = image::open(path).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(from_rgba(dyn_img.to_rgba8()))
}

/// Build a [`DecodedImage`] from an already decoded buffer.
pub fn from_rgba(full: RgbaImage) -> DecodedImage {
    let (w, h) = full.dimensions();
    let (pw, ph, rot_90_scale) = preview_dims(w, h);
    let preview = image::imageops::resize(&full, pw, ph, FilterType::CatmullRom);
    DecodedImage {
        full: Arc::new(full),
        preview: Arc::new(preview),
        rot_90_scale,
    }
}

fn preview_dims(w: u32, h: u32) -> (u32, u32, f64) {
    let max = f64::from(PREVIEW_MAX_SIZE);
    let (wf, hf) = (f64::from(w.max(1)), f64::from(h.max(1)));
    if wf > hf {
        let nh = max * hf / wf;
        (PREVIEW_MAX_SIZE, (nh as u32).max(1), max / nh)
    } else {
        let nw = max * wf / hf;
        ((nw as u32).max(1), PREVIEW_MAX_SIZE, max / nw)
    }
}

/// Silent-recovery wrapper: missing or undecodable files become `None`.
pub fn load_image(path: &Path) -> Option<DecodedImage> {
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "image path does not resolve to a file");
        return None;
    }
    match decode_image(path) {
        Ok(img) => Some(img),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "treating unreadable image as empty");
            None
        }
    }
}

/// Case-insensitive extension check against [`IMAGE_EXTENSIONS`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn landscape_preview_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "wide.png", 1024, 256);
        let img = decode_image(&path).unwrap();
        assert_eq!(img.full.dimensions(), (1024, 256));
        assert_eq!(img.preview.dimensions(), (512, 128));
        assert!((img.rot_90_scale - 4.0).abs() < 1e-9);
    }

    #[test]
    fn portrait_preview_is_bounded() {
        let img = from_rgba(RgbaImage::new(300, 600));
        assert_eq!(img.preview.dimensions(), (256, 512));
        assert!((img.rot_90_scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn missing_or_corrupt_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(&dir.path().join("missing.png")).is_none());

        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not a png").unwrap();
        assert!(load_image(&bad).is_none());
        assert!(decode_image(&bad).is_err());
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(is_supported_image(Path::new("a/B.JPG")));
        assert!(is_supported_image(Path::new("x.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("noext")));
    }
}
