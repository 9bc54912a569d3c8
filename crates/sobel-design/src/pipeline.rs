// SPDX-License-Identifier: AGPL-3.0-only

//! Sliding-window geometry and warm-up latency.
//!
//! A `k×k` window fed one pixel per cycle in raster order needs `k-1` full
//! line buffers plus `k-1` pixels of the current line before the first
//! complete window exists. Everything the pipeline emits is shifted by that
//! many samples.
//!
//! ```text
//!   row 0  ████████████████   line buffer 0
//!   row 1  ████████████████   line buffer 1
//!   row 2  ██░░░░░░░░░░░░░░   first valid window closes here
//!          ^^
//!          warm-up columns
//! ```

/// Kernel size used by the shipped design (3×3 Sobel).
pub const DEFAULT_KERNEL_SIZE: usize = 3;

/// Window geometry of the hardware pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineGeometry {
    kernel_size: usize,
}

impl PipelineGeometry {
    /// Geometry for a `kernel_size × kernel_size` window.
    ///
    /// Returns `None` unless the kernel is odd and at least 3 wide.
    #[must_use]
    pub const fn new(kernel_size: usize) -> Option<Self> {
        if kernel_size < 3 || kernel_size % 2 == 0 {
            None
        } else {
            Some(Self { kernel_size })
        }
    }

    /// Side length of the window.
    #[must_use]
    pub const fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    /// Full rows buffered before the first valid output.
    #[must_use]
    pub const fn warmup_rows(&self) -> usize {
        self.kernel_size - 1
    }

    /// Extra leading pixels of the first window row.
    #[must_use]
    pub const fn warmup_cols(&self) -> usize {
        self.kernel_size - 1
    }

    /// Number of leading flat positions that never receive a valid sample
    /// for a frame `width` pixels wide.
    ///
    /// `warmup_rows * width + warmup_cols`, i.e. `2*W + 2` for 3×3.
    #[must_use]
    pub const fn latency(&self, width: usize) -> usize {
        self.warmup_rows() * width + self.warmup_cols()
    }

    /// Rows/columns at the top-left with no full window behind them.
    #[must_use]
    pub const fn window_inset(&self) -> usize {
        self.kernel_size - 1
    }
}

impl Default for PipelineGeometry {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
        }
    }
}

impl std::fmt::Display for PipelineGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{k}×{k} window ({r} warm-up rows + {c} warm-up cols)",
            k = self.kernel_size,
            r = self.warmup_rows(),
            c = self.warmup_cols()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_latency_is_two_rows_plus_two() {
        let geom = PipelineGeometry::default();
        for width in [4, 16, 128, 640] {
            assert_eq!(geom.latency(width), 2 * width + 2);
        }
    }

    #[test]
    fn test_larger_kernel() {
        let geom = PipelineGeometry::new(5).unwrap();
        assert_eq!(geom.warmup_rows(), 4);
        assert_eq!(geom.latency(10), 44);
        assert_eq!(geom.window_inset(), 4);
    }

    #[test]
    fn test_rejects_even_and_tiny_kernels() {
        assert!(PipelineGeometry::new(1).is_none());
        assert!(PipelineGeometry::new(2).is_none());
        assert!(PipelineGeometry::new(4).is_none());
    }

    #[test]
    fn test_display() {
        let s = PipelineGeometry::default().to_string();
        assert!(s.contains("3×3"));
    }
}
