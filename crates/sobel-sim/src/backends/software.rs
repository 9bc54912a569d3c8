// SPDX-License-Identifier: AGPL-3.0-only

//! Software (golden model) backend
//!
//! Produces the output stream an ideal pipeline would emit for the same
//! input stream, using the reference 3×3 Manhattan Sobel:
//!
//! ```text
//! FlatPrefix:        ref[latency], ref[latency+1], …, ref[H*W-1]
//! WindowedInterior:  latency warm-up zeros, then ref over rows/cols inset.. in raster order
//! ```
//!
//! Useful for exercising the full harness in CI, and as the baseline a real
//! simulation is expected to approach. Against the reference it scores only
//! the black border as error.

use crate::backend::{BackendType, SimulationBackend};
use crate::error::Result;
use sobel_core::{sobel_manhattan, stream, BorderRule, FrameDims, IntensityGrid};
use std::path::Path;
use tracing::{debug, info};

/// Software golden-model backend
#[derive(Debug, Clone)]
pub struct SoftwareBackend {
    dims: FrameDims,
    latency: usize,
    inset: usize,
    rule: BorderRule,
}

impl SoftwareBackend {
    /// Model for a `dims` frame with the given warm-up latency and layout
    pub fn new(dims: FrameDims, latency: usize, rule: BorderRule) -> Self {
        Self {
            dims,
            latency,
            inset: sobel_design::pipeline::DEFAULT_KERNEL_SIZE - 1,
            rule,
        }
    }

    /// Interior inset used by [`BorderRule::WindowedInterior`]
    #[must_use]
    pub fn with_inset(mut self, inset: usize) -> Self {
        self.inset = inset;
        self
    }

    /// Samples the model emits for `frame`
    #[must_use]
    pub fn emit(&self, frame: &IntensityGrid) -> Vec<u8> {
        let edges = sobel_manhattan(frame);
        match self.rule {
            BorderRule::FlatPrefix => edges
                .as_slice()
                .get(self.latency..)
                .map(<[u8]>::to_vec)
                .unwrap_or_default(),
            BorderRule::WindowedInterior => {
                let mut out = vec![0u8; self.latency];
                for row in edges.rows().skip(self.inset) {
                    out.extend_from_slice(row.get(self.inset..).unwrap_or_default());
                }
                out
            }
        }
    }
}

impl SimulationBackend for SoftwareBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Software
    }

    fn run(&mut self, input: &Path, output: &Path) -> Result<()> {
        let pixels = stream::read_samples(input)?;
        let frame = IntensityGrid::from_raw(self.dims, pixels)?;
        debug!("Software model: {} frame, latency {}", self.dims, self.latency);

        let samples = self.emit(&frame);
        stream::write_samples(&samples, output)?;

        info!("Software model emitted {} samples", samples.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobel_core::Reconstructor;
    use sobel_design::pipeline::PipelineGeometry;

    #[test]
    fn test_flat_prefix_emits_tail_of_reference() {
        let dims = FrameDims::new(6, 5).unwrap();
        let frame = IntensityGrid::from_fn(dims, |r, c| ((r * 37 + c * 11) % 256) as u8);
        let model = SoftwareBackend::new(dims, 12, BorderRule::FlatPrefix);

        let samples = model.emit(&frame);
        assert_eq!(samples.len(), 30 - 12);
        assert_eq!(samples.as_slice(), &sobel_manhattan(&frame).as_slice()[12..]);
    }

    #[test]
    fn test_windowed_output_matches_reconstructor_contract() {
        let dims = FrameDims::new(6, 5).unwrap();
        let geom = PipelineGeometry::default();
        let rec = Reconstructor::new(dims, geom, BorderRule::WindowedInterior).unwrap();
        let model = SoftwareBackend::new(dims, rec.latency(), BorderRule::WindowedInterior)
            .with_inset(geom.window_inset());

        let frame = IntensityGrid::from_fn(dims, |r, c| if c > r { 200 } else { 10 });
        let samples = model.emit(&frame);
        assert_eq!(samples.len(), rec.expected_samples());

        let rebuilt = rec.reconstruct(&samples).unwrap();
        let reference = sobel_manhattan(&frame);
        assert_eq!(rebuilt.get(3, 3), reference.get(3, 3));
        assert_eq!(rebuilt.get(1, 4), Some(0));
    }

    #[test]
    fn test_run_rejects_wrong_frame_size() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("input_pixels.mem");
        std::fs::write(&input, "00\n01\n02\n").unwrap();

        let dims = FrameDims::new(4, 4).unwrap();
        let mut backend = SoftwareBackend::new(dims, 10, BorderRule::FlatPrefix);
        let err = backend
            .run(&input, &dir.path().join("output_edges.txt"))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::SimError::Core(sobel_core::SobelError::Shape { .. })
        ));
    }
}
