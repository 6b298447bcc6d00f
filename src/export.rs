//! Raster encoding and file output for exported pages.

use std::path::Path;

use image::RgbImage;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};

use crate::context::write_atomic;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{PhotoBookError, PhotoBookResult};
use crate::settings::dpi_to_ppm;

/// JPEG quality used for exports.
pub const JPEG_QUALITY: u8 = 95;

/// Parameters of one export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportOpts {
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
    pub background: Rgb8,
}

/// Output container, chosen from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    /// Infer the format from `path`'s extension (case-insensitive).
    pub fn from_path(path: &Path) -> PhotoBookResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") => Ok(Self::Png),
            Some("jpg" | "jpeg") => Ok(Self::Jpeg),
            _ => Err(PhotoBookError::export(format!(
                "unsupported export extension for '{}' (expected .png, .jpg or .jpeg)",
                path.display()
            ))),
        }
    }
}

/// Encode an RGB page with its physical density embedded.
pub fn encode_rgb(img: &RgbImage, format: ExportFormat, dpi: u32) -> PhotoBookResult<Vec<u8>> {
    match format {
        ExportFormat::Png => encode_png(img, dpi),
        ExportFormat::Jpeg => encode_jpeg(img, dpi),
    }
}

fn encode_png(img: &RgbImage, dpi: u32) -> PhotoBookResult<Vec<u8>> {
    let export_err = |e: png::EncodingError| PhotoBookError::export(format!("encode png: {e}"));

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, img.width(), img.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let ppm = dpi_to_ppm(dpi);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header().map_err(export_err)?;
        writer.write_image_data(img.as_raw()).map_err(export_err)?;
        writer.finish().map_err(export_err)?;
    }
    Ok(out)
}

fn encode_jpeg(img: &RgbImage, dpi: u32) -> PhotoBookResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    let density = u16::try_from(dpi).unwrap_or(u16::MAX);
    encoder.set_pixel_density(PixelDensity::dpi(density));
    encoder
        .encode_image(img)
        .map_err(|e| PhotoBookError::export(format!("encode jpeg: {e}")))?;
    Ok(out)
}

/// Encode `img` for `path`'s extension and atomically write it.
#[tracing::instrument(skip(img), fields(width = img.width(), height = img.height()))]
pub fn write_raster(path: &Path, img: &RgbImage, dpi: u32) -> PhotoBookResult<()> {
    let format = ExportFormat::from_path(path)?;
    let bytes = encode_rgb(img, format, dpi)?;
    write_atomic(path, &bytes).map_err(|e| PhotoBookError::export(format!("{e:#}")))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
    Ok(())
}
