// SPDX-License-Identifier: AGPL-3.0-only

//! Image similarity metrics
//!
//! Differences are taken in `f64` so that `a - b` on 8-bit pixels never
//! wraps. Both metrics are symmetric in their arguments.

use crate::error::{Result, SobelError};
use crate::grid::IntensityGrid;

/// Peak intensity of an 8-bit frame
pub const PSNR_PEAK: f64 = 255.0;

/// Similarity between a reconstructed and a reference frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// Mean squared error, ≥ 0
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB; `f64::INFINITY` when `mse == 0`
    pub psnr: f64,
}

impl Comparison {
    /// True when the two frames were pixel-identical
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.mse == 0.0
    }
}

impl std::fmt::Display for Comparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.psnr.is_infinite() {
            write!(f, "MSE={:.2} PSNR=inf dB", self.mse)
        } else {
            write!(f, "MSE={:.2} PSNR={:.2} dB", self.mse, self.psnr)
        }
    }
}

/// Mean squared error over all pixels
///
/// # Errors
///
/// Returns a shape error if the grids differ in dimensions.
pub fn mse(a: &IntensityGrid, b: &IntensityGrid) -> Result<f64> {
    if a.dims() != b.dims() {
        return Err(SobelError::shape("metric comparison", a.dims(), b.dims()));
    }

    let sum: f64 = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| {
            let d = f64::from(x) - f64::from(y);
            d * d
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let n = a.dims().pixel_count() as f64;
    Ok(sum / n)
}

/// `10 · log10(255² / mse)`, or infinity for `mse == 0`
#[must_use]
pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse > 0.0 {
        10.0 * (PSNR_PEAK * PSNR_PEAK / mse).log10()
    } else {
        f64::INFINITY
    }
}

/// MSE and PSNR between two frames
///
/// # Errors
///
/// Returns a shape error if the grids differ in dimensions.
pub fn compare(a: &IntensityGrid, b: &IntensityGrid) -> Result<Comparison> {
    let mse = mse(a, b)?;
    let comparison = Comparison {
        mse,
        psnr: psnr_from_mse(mse),
    };
    tracing::info!("Comparison over {} frame: {comparison}", a.dims());
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::FrameDims;

    #[test]
    fn test_identical_frames() {
        let dims = FrameDims::new(3, 3).unwrap();
        let a = IntensityGrid::from_fn(dims, |r, c| (r * 3 + c) as u8 * 20);
        let cmp = compare(&a, &a).unwrap();
        assert_eq!(cmp.mse, 0.0);
        assert!(cmp.psnr.is_infinite());
        assert!(cmp.is_identical());
        assert_eq!(cmp.to_string(), "MSE=0.00 PSNR=inf dB");
    }

    #[test]
    fn test_no_unsigned_wraparound() {
        let dims = FrameDims::new(1, 2).unwrap();
        let a = IntensityGrid::from_raw(dims, vec![0, 255]).unwrap();
        let b = IntensityGrid::from_raw(dims, vec![255, 0]).unwrap();
        assert_eq!(mse(&a, &b).unwrap(), 255.0 * 255.0);
        assert_eq!(psnr_from_mse(255.0 * 255.0), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = IntensityGrid::zeros(FrameDims::new(2, 3).unwrap());
        let b = IntensityGrid::zeros(FrameDims::new(3, 2).unwrap());
        assert!(matches!(compare(&a, &b), Err(SobelError::Shape { .. })));
    }
}
