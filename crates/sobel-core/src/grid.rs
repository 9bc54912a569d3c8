// SPDX-License-Identifier: AGPL-3.0-only

//! Frame dimensions and 8-bit intensity grids

use crate::error::{Result, SobelError};

/// Frame size agreed between encoder, simulator and reconstructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameDims {
    height: usize,
    width: usize,
}

impl FrameDims {
    /// Create frame dimensions
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either dimension is zero or the
    /// pixel count does not fit in `usize`.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(SobelError::config(format!(
                "frame dimensions must be non-zero (got {height}×{width})"
            )));
        }
        if height.checked_mul(width).is_none() {
            return Err(SobelError::config(format!(
                "frame {height}×{width} has too many pixels"
            )));
        }
        Ok(Self { height, width })
    }

    /// Rows
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Columns
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Total pixels (`height × width`)
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.height * self.width
    }
}

impl std::fmt::Display for FrameDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.height, self.width)
    }
}

/// Row-major grid of 8-bit intensities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityGrid {
    dims: FrameDims,
    data: Vec<u8>,
}

impl IntensityGrid {
    /// All-black grid
    #[must_use]
    pub fn zeros(dims: FrameDims) -> Self {
        Self {
            dims,
            data: vec![0; dims.pixel_count()],
        }
    }

    /// Grid where every pixel holds `value`
    #[must_use]
    pub fn filled(dims: FrameDims, value: u8) -> Self {
        Self {
            dims,
            data: vec![value; dims.pixel_count()],
        }
    }

    /// Wrap a row-major buffer
    ///
    /// # Errors
    ///
    /// Returns a shape error if `data.len() != dims.pixel_count()`.
    pub fn from_raw(dims: FrameDims, data: Vec<u8>) -> Result<Self> {
        if data.len() != dims.pixel_count() {
            return Err(SobelError::shape(
                format!("{dims} grid buffer"),
                dims.pixel_count(),
                data.len(),
            ));
        }
        Ok(Self { dims, data })
    }

    /// Build a grid by evaluating `f(row, col)` for every pixel
    pub fn from_fn(dims: FrameDims, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(dims.pixel_count());
        for row in 0..dims.height() {
            for col in 0..dims.width() {
                data.push(f(row, col));
            }
        }
        Self { dims, data }
    }

    /// Dimensions
    pub const fn dims(&self) -> FrameDims {
        self.dims
    }

    /// Pixel at (`row`, `col`), `None` when out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row >= self.dims.height() || col >= self.dims.width() {
            return None;
        }
        Some(self.data[row * self.dims.width() + col])
    }

    /// Row-major pixel slice
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutable row-major pixel slice
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Iterate rows
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.dims.width())
    }

    /// Consume into the row-major buffer
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dims_rejected() {
        assert!(matches!(FrameDims::new(0, 4), Err(SobelError::Config { .. })));
        assert!(matches!(FrameDims::new(4, 0), Err(SobelError::Config { .. })));
    }

    #[test]
    fn test_overflowing_dims_rejected() {
        assert!(matches!(
            FrameDims::new(usize::MAX, 2),
            Err(SobelError::Config { .. })
        ));
        assert!(matches!(
            FrameDims::new(1 << (usize::BITS / 2), 1 << (usize::BITS / 2)),
            Err(SobelError::Config { .. })
        ));
        assert_eq!(FrameDims::new(usize::MAX, 1).unwrap().pixel_count(), usize::MAX);
    }

    #[test]
    fn test_from_raw_length_checked() {
        let dims = FrameDims::new(2, 3).unwrap();
        assert!(IntensityGrid::from_raw(dims, vec![0; 6]).is_ok());
        assert!(matches!(
            IntensityGrid::from_raw(dims, vec![0; 5]),
            Err(SobelError::Shape { .. })
        ));
    }

    #[test]
    fn test_row_major_indexing() {
        let dims = FrameDims::new(2, 3).unwrap();
        let grid = IntensityGrid::from_fn(dims, |r, c| (r * 10 + c) as u8);
        assert_eq!(grid.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(grid.get(1, 2), Some(12));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.rows().count(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(FrameDims::new(128, 64).unwrap().to_string(), "128×64");
    }
}
