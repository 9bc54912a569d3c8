// SPDX-License-Identifier: AGPL-3.0-only

//! Output reconstruction
//!
//! Maps the flat, latency-shifted sample stream emitted by the pipeline back
//! onto frame coordinates. The offset is fixed by the window geometry; it is
//! never searched for in the data. An off-by-one here shifts every pixel
//! diagonally without raising any error, so the sample count is checked
//! exactly before anything is placed.

use crate::error::{Result, SobelError};
use crate::grid::{FrameDims, IntensityGrid};
use sobel_design::pipeline::PipelineGeometry;

/// How warm-up samples relate to frame positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderRule {
    /// The first `latency` flat positions are invalid and stay black; sample
    /// `i` lands on flat position `latency + i`.
    ///
    /// Expects `H*W - latency` samples.
    #[default]
    FlatPrefix,

    /// The first `latency` samples are warm-up and dropped; the rest fill
    /// rows `inset..H` and columns `inset..W` in raster order. Everything
    /// outside that interior stays black.
    ///
    /// Expects `latency + (H-inset)*(W-inset)` samples.
    WindowedInterior,
}

impl std::fmt::Display for BorderRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FlatPrefix => write!(f, "flat-prefix"),
            Self::WindowedInterior => write!(f, "windowed-interior"),
        }
    }
}

/// Rebuilds frames from raw pipeline output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconstructor {
    dims: FrameDims,
    latency: usize,
    inset: usize,
    rule: BorderRule,
}

impl Reconstructor {
    /// Reconstructor whose latency is derived from the window geometry
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the frame is too small for the
    /// window.
    pub fn new(dims: FrameDims, geometry: PipelineGeometry, rule: BorderRule) -> Result<Self> {
        Self::with_latency(dims, geometry, geometry.latency(dims.width()), rule)
    }

    /// Reconstructor with an explicit latency
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the latency leaves no valid sample,
    /// or if the frame is not larger than the window inset under
    /// [`BorderRule::WindowedInterior`].
    pub fn with_latency(
        dims: FrameDims,
        geometry: PipelineGeometry,
        latency: usize,
        rule: BorderRule,
    ) -> Result<Self> {
        if latency >= dims.pixel_count() {
            return Err(SobelError::config(format!(
                "latency {latency} leaves no valid samples in a {dims} frame"
            )));
        }

        let inset = geometry.window_inset();
        if rule == BorderRule::WindowedInterior
            && (dims.height() <= inset || dims.width() <= inset)
        {
            return Err(SobelError::config(format!(
                "{dims} frame has no interior for a {} window",
                geometry.kernel_size()
            )));
        }

        Ok(Self {
            dims,
            latency,
            inset,
            rule,
        })
    }

    /// Frame dimensions
    pub const fn dims(&self) -> FrameDims {
        self.dims
    }

    /// Latency offset in samples
    pub const fn latency(&self) -> usize {
        self.latency
    }

    /// Border rule
    pub const fn rule(&self) -> BorderRule {
        self.rule
    }

    /// Exact number of raw samples a valid run produces
    #[must_use]
    pub const fn expected_samples(&self) -> usize {
        match self.rule {
            BorderRule::FlatPrefix => self.dims.pixel_count() - self.latency,
            BorderRule::WindowedInterior => {
                self.latency
                    + (self.dims.height() - self.inset) * (self.dims.width() - self.inset)
            }
        }
    }

    /// Rebuild a frame from raw samples
    ///
    /// # Errors
    ///
    /// Returns a shape error, and no grid, if `samples.len()` differs from
    /// [`expected_samples`](Self::expected_samples).
    pub fn reconstruct(&self, samples: &[u8]) -> Result<IntensityGrid> {
        let expected = self.expected_samples();
        if samples.len() != expected {
            tracing::error!(
                "Sample count {} != expected {expected} ({} frame, latency {}, {})",
                samples.len(),
                self.dims,
                self.latency,
                self.rule
            );
            return Err(SobelError::shape(
                format!(
                    "pipeline output ({} frame, latency {}, {})",
                    self.dims, self.latency, self.rule
                ),
                format!("{expected} samples"),
                format!("{} samples", samples.len()),
            ));
        }

        let mut grid = IntensityGrid::zeros(self.dims);
        match self.rule {
            BorderRule::FlatPrefix => {
                grid.as_mut_slice()[self.latency..].copy_from_slice(samples);
            }
            BorderRule::WindowedInterior => {
                let width = self.dims.width();
                let interior = width - self.inset;
                let valid = &samples[self.latency..];
                for (row, chunk) in valid.chunks_exact(interior).enumerate() {
                    let start = (row + self.inset) * width + self.inset;
                    grid.as_mut_slice()[start..start + interior].copy_from_slice(chunk);
                }
            }
        }

        tracing::debug!(
            "Reconstructed {} frame from {} samples ({} border)",
            self.dims,
            samples.len(),
            self.rule
        );
        Ok(grid)
    }
}
