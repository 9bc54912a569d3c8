// SPDX-License-Identifier: AGPL-3.0-only

//! End-to-end validation run
//!
//! ```text
//! image ─► frame ─► input_pixels.mem ─► backend ─► output_edges.txt
//!                                                        │
//!   reference Sobel ◄── frame         reconstruct ◄──────┘
//!          │                               │
//!          └────────────► compare ◄────────┘ ─► MSE / PSNR
//! ```
//!
//! Every stage is a function of the previous stage's output. The first
//! failure ends the run; no metrics are ever computed from a partial or
//! mis-sized reconstruction.

use crate::backend::{
    select_backend, BackendConfig, BackendSelection, SimulationBackend, DEFAULT_STEP_TIMEOUT,
};
use crate::backends::remove_if_present;
use crate::error::{Result, SimError};
use sobel_core::{
    compare, image_io, sobel_manhattan, stream, BorderRule, Comparison, FrameDims,
    IntensityGrid, Reconstructor,
};
use sobel_design::pipeline::PipelineGeometry;
use sobel_design::sources;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Configuration for one validation run
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Frame size shared by encoder, testbench and reconstructor
    pub dims: FrameDims,
    /// Window geometry of the design
    pub geometry: PipelineGeometry,
    /// Replaces the latency derived from `geometry` when set
    pub latency_override: Option<usize>,
    /// How warm-up samples map onto the frame
    pub border_rule: BorderRule,
    /// Simulator to drive
    pub backend: BackendSelection,
    /// Directory holding the testbench and RTL
    pub design_dir: PathBuf,
    /// Directory for the input/output stream artifacts
    pub work_dir: PathBuf,
    /// Limit for each simulator step
    pub timeout: Duration,
}

impl ValidationConfig {
    /// Defaults for a `dims` frame: 3×3 window, flat-prefix border, Icarus
    /// backend, current directory for sources and artifacts
    pub fn new(dims: FrameDims) -> Self {
        Self {
            dims,
            geometry: PipelineGeometry::default(),
            latency_override: None,
            border_rule: BorderRule::default(),
            backend: BackendSelection::default(),
            design_dir: PathBuf::from("."),
            work_dir: PathBuf::from("."),
            timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Effective latency in samples
    pub fn latency(&self) -> usize {
        self.latency_override
            .unwrap_or_else(|| self.geometry.latency(self.dims.width()))
    }

    /// Reconstructor for this configuration
    ///
    /// # Errors
    ///
    /// Returns error if the latency or border rule does not fit the frame.
    pub fn reconstructor(&self) -> Result<Reconstructor> {
        Ok(Reconstructor::with_latency(
            self.dims,
            self.geometry,
            self.latency(),
            self.border_rule,
        )?)
    }

    /// Check frame, latency and timeout once, before any stage runs
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        if self.dims.height() < self.geometry.kernel_size()
            || self.dims.width() < self.geometry.kernel_size()
        {
            return Err(SimError::config(format!(
                "{} frame is smaller than the {}",
                self.dims, self.geometry
            )));
        }
        if self.timeout.is_zero() {
            return Err(SimError::config("step timeout must be non-zero"));
        }
        let rec = self.reconstructor()?;
        debug!(
            "Config OK: {} frame, latency {}, {} border, expect {} samples",
            self.dims,
            rec.latency(),
            rec.rule(),
            rec.expected_samples()
        );
        Ok(())
    }

    /// Input stream artifact path
    pub fn input_stream_path(&self) -> PathBuf {
        self.work_dir.join(sources::INPUT_STREAM_FILE)
    }

    /// Output stream artifact path
    pub fn output_stream_path(&self) -> PathBuf {
        self.work_dir.join(sources::OUTPUT_STREAM_FILE)
    }

    /// Backend settings derived from this configuration
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            dims: self.dims,
            geometry: self.geometry,
            latency: self.latency(),
            border_rule: self.border_rule,
            design_dir: self.design_dir.clone(),
            timeout: self.timeout,
        }
    }
}

/// Frames and scores produced by a successful run
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Grayscale input frame
    pub original: IntensityGrid,
    /// Frame rebuilt from the simulator output
    pub reconstructed: IntensityGrid,
    /// Software reference edge map
    pub reference: IntensityGrid,
    /// Similarity between `reconstructed` and `reference`
    pub comparison: Comparison,
    /// Raw samples read from the simulator
    pub samples: usize,
    /// Wall time spent in the backend
    pub simulation_time: Duration,
}

impl ValidationReport {
    /// Write `original.png`, `reconstructed.png` and `reference.png` into
    /// `dir`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory or an image cannot be written.
    pub fn save_images(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| SimError::io(dir, e))?;

        let mut written = Vec::with_capacity(3);
        for (name, grid) in [
            ("original.png", &self.original),
            ("reconstructed.png", &self.reconstructed),
            ("reference.png", &self.reference),
        ] {
            let path = dir.join(name);
            image_io::save_grid(grid, &path)?;
            written.push(path);
        }

        info!("Saved comparison images to {}", dir.display());
        Ok(written)
    }
}

/// A configured validation run bound to a backend
#[derive(Debug)]
pub struct ValidationRun {
    config: ValidationConfig,
    reconstructor: Reconstructor,
    backend: Box<dyn SimulationBackend>,
}

impl ValidationRun {
    /// Validate `config` and create its backend
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is inconsistent or the backend
    /// cannot be created.
    pub fn new(config: ValidationConfig) -> Result<Self> {
        let backend = select_backend(config.backend, &config.backend_config())?;
        Self::with_backend(config, backend)
    }

    /// Use a caller-supplied backend
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is inconsistent.
    pub fn with_backend(config: ValidationConfig, backend: Box<dyn SimulationBackend>) -> Result<Self> {
        config.validate()?;
        let reconstructor = config.reconstructor()?;
        Ok(Self {
            config,
            reconstructor,
            backend,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Load `image_path` and validate it
    ///
    /// # Errors
    ///
    /// Returns the first stage failure.
    pub fn execute(&mut self, image_path: &Path) -> Result<ValidationReport> {
        info!("Stage 1/6: load {}", image_path.display());
        let original = image_io::load_frame(image_path, self.config.dims)?;
        self.execute_frame(original)
    }

    /// Validate an already-acquired frame
    ///
    /// # Errors
    ///
    /// Returns the first stage failure.
    pub fn execute_frame(&mut self, original: IntensityGrid) -> Result<ValidationReport> {
        if original.dims() != self.config.dims {
            return Err(sobel_core::SobelError::shape(
                "input frame",
                self.config.dims,
                original.dims(),
            )
            .into());
        }

        let input = self.config.input_stream_path();
        let output = self.config.output_stream_path();

        info!("Stage 2/6: encode -> {}", input.display());
        stream::write_stream(&original, &input)?;

        info!("Stage 3/6: simulate ({})", self.backend.backend_type());
        remove_if_present(&output)?;
        let t0 = Instant::now();
        self.backend.run(&input, &output)?;
        let simulation_time = t0.elapsed();
        debug!("Backend finished in {simulation_time:?}");

        info!("Stage 4/6: reconstruct from {}", output.display());
        let samples = stream::read_samples(&output)?;
        let reconstructed = self.reconstructor.reconstruct(&samples)?;

        info!("Stage 5/6: reference Sobel");
        let reference = sobel_manhattan(&original);

        info!("Stage 6/6: compare");
        let comparison = compare(&reconstructed, &reference)?;

        Ok(ValidationReport {
            original,
            reconstructed,
            reference,
            comparison,
            samples: samples.len(),
            simulation_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(h: usize, w: usize) -> FrameDims {
        FrameDims::new(h, w).unwrap()
    }

    #[test]
    fn test_default_latency() {
        let cfg = ValidationConfig::new(dims(128, 128));
        assert_eq!(cfg.latency(), 258);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_latency_override() {
        let mut cfg = ValidationConfig::new(dims(8, 8));
        cfg.latency_override = Some(3);
        assert_eq!(cfg.reconstructor().unwrap().expected_samples(), 61);
    }

    #[test]
    fn test_frame_smaller_than_window_rejected() {
        let cfg = ValidationConfig::new(dims(2, 64));
        assert!(matches!(cfg.validate(), Err(SimError::Config { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut cfg = ValidationConfig::new(dims(8, 8));
        cfg.timeout = Duration::ZERO;
        assert!(matches!(cfg.validate(), Err(SimError::Config { .. })));
    }

    #[test]
    fn test_new_still_rejects_bad_config() {
        let mut cfg = ValidationConfig::new(dims(8, 8));
        cfg.backend = BackendSelection::Software;
        cfg.timeout = Duration::ZERO;
        assert!(matches!(ValidationRun::new(cfg), Err(SimError::Config { .. })));
    }

    #[test]
    fn test_artifact_paths() {
        let mut cfg = ValidationConfig::new(dims(8, 8));
        cfg.work_dir = PathBuf::from("/tmp/run");
        assert_eq!(
            cfg.input_stream_path(),
            PathBuf::from("/tmp/run/input_pixels.mem")
        );
        assert_eq!(
            cfg.output_stream_path(),
            PathBuf::from("/tmp/run/output_edges.txt")
        );
    }
}
