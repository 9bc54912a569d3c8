// SPDX-License-Identifier: AGPL-3.0-only

//! Frame acquisition and export
//!
//! Turns an arbitrary image file into the grayscale frame the pipeline
//! consumes, and writes grids back out as 8-bit PNGs for inspection.

use crate::error::{Result, SobelError};
use crate::grid::{FrameDims, IntensityGrid};
use image::imageops::FilterType;
use image::{GrayImage, ImageError, ImageFormat};
use std::path::Path;

/// Load `path`, resize exactly to `dims`, and convert to 8-bit luma
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or an image error if it
/// cannot be decoded.
pub fn load_frame(path: &Path, dims: FrameDims) -> Result<IntensityGrid> {
    let (width, height) = dims_u32(dims)?;

    let img = image::open(path).map_err(|e| map_image_error(path, e))?;
    tracing::debug!(
        "Decoded {} ({}×{} source)",
        path.display(),
        img.height(),
        img.width()
    );

    let gray = img
        .resize_exact(width, height, FilterType::Triangle)
        .to_luma8();

    let grid = IntensityGrid::from_raw(dims, gray.into_raw())?;
    tracing::info!("Loaded {} as {} grayscale frame", path.display(), dims);
    Ok(grid)
}

/// Load `path` at its own size and convert to 8-bit luma
///
/// For comparing stored images, where resampling would hide a size
/// mismatch.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, or an image error if it
/// cannot be decoded.
pub fn load_native(path: &Path) -> Result<IntensityGrid> {
    let gray = image::open(path)
        .map_err(|e| map_image_error(path, e))?
        .to_luma8();
    let dims = FrameDims::new(gray.height() as usize, gray.width() as usize)?;

    let grid = IntensityGrid::from_raw(dims, gray.into_raw())?;
    tracing::info!("Loaded {} at native size {}", path.display(), dims);
    Ok(grid)
}

/// Write a grid as an 8-bit grayscale PNG
///
/// # Errors
///
/// Returns an I/O or image error naming `path` if encoding or writing fails.
pub fn save_grid(grid: &IntensityGrid, path: &Path) -> Result<()> {
    let (width, height) = dims_u32(grid.dims())?;
    let img = GrayImage::from_raw(width, height, grid.as_slice().to_vec())
        .ok_or_else(|| SobelError::image(path, "buffer does not match frame size"))?;

    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| map_image_error(path, e))?;

    tracing::debug!("Saved {} frame to {}", grid.dims(), path.display());
    Ok(())
}

fn dims_u32(dims: FrameDims) -> Result<(u32, u32)> {
    let width = u32::try_from(dims.width())
        .map_err(|_| SobelError::config(format!("width {} too large", dims.width())))?;
    let height = u32::try_from(dims.height())
        .map_err(|_| SobelError::config(format!("height {} too large", dims.height())))?;
    Ok((width, height))
}

fn map_image_error(path: &Path, err: ImageError) -> SobelError {
    match err {
        ImageError::IoError(source) => SobelError::io(path, source),
        other => SobelError::image(path, other.to_string()),
    }
}
