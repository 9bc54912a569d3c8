// SPDX-License-Identifier: AGPL-3.0-only

//! Simulation backend abstraction
//!
//! The validation harness only ever needs one thing from a simulator: turn
//! an input pixel stream file into an output sample stream file, or fail.

use crate::error::{Result, SimError};
use sobel_core::{BorderRule, FrameDims};
use sobel_design::pipeline::PipelineGeometry;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default limit for each simulator step
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(300);

/// Simulation backend trait - stream file in, stream file out
pub trait SimulationBackend: Debug {
    /// Backend type for logging
    fn backend_type(&self) -> BackendType;

    /// Run the pipeline on `input` and leave its samples in `output`
    ///
    /// Blocks until the simulation finishes. `output` is replaced, never
    /// appended to.
    ///
    /// # Errors
    ///
    /// Returns error if the simulator is missing, exits non-zero, times out,
    /// or does not produce `output`.
    fn run(&mut self, input: &Path, output: &Path) -> Result<()>;
}

/// Backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Icarus Verilog (`iverilog` + `vvp`)
    Icarus,

    /// Software golden model, no simulator required
    Software,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Icarus => write!(f, "Icarus Verilog"),
            Self::Software => write!(f, "Software (golden model)"),
        }
    }
}

/// Backend selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendSelection {
    /// Run the RTL under Icarus Verilog
    #[default]
    Icarus,

    /// Force the software model - for CI and harness checks
    Software,
}

/// Everything a backend needs to know about the run
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Frame size passed to the testbench
    pub dims: FrameDims,
    /// Window geometry of the design
    pub geometry: PipelineGeometry,
    /// Warm-up offset in samples
    pub latency: usize,
    /// Output layout the software model reproduces
    pub border_rule: BorderRule,
    /// Directory holding the testbench and RTL sources
    pub design_dir: PathBuf,
    /// Limit for each simulator step
    pub timeout: Duration,
}

/// Create the selected backend
///
/// # Errors
///
/// Returns error if the backend cannot be constructed from `config`.
pub fn select_backend(
    selection: BackendSelection,
    config: &BackendConfig,
) -> Result<Box<dyn SimulationBackend>> {
    use crate::backends::icarus::IcarusBackend;
    use crate::backends::software::SoftwareBackend;

    match selection {
        BackendSelection::Icarus => {
            if !config.design_dir.is_dir() {
                return Err(SimError::config(format!(
                    "design directory {} does not exist",
                    config.design_dir.display()
                )));
            }
            tracing::info!("Using Icarus backend in {}", config.design_dir.display());
            let backend = IcarusBackend::new(&config.design_dir, config.dims)
                .with_timeout(config.timeout);
            Ok(Box::new(backend))
        }

        BackendSelection::Software => {
            tracing::info!("Using software backend ({} frame)", config.dims);
            let backend = SoftwareBackend::new(config.dims, config.latency, config.border_rule)
                .with_inset(config.geometry.window_inset());
            Ok(Box::new(backend))
        }
    }
}
