// SPDX-License-Identifier: AGPL-3.0-only

//! Simulator driver and validation harness for the streaming Sobel design.
//!
//! # Backend hierarchy
//!
//! ```text
//! Primary:
//!   IcarusBackend   : iverilog build + vvp run of the RTL testbench
//!
//! CI / harness checks:
//!   SoftwareBackend : golden model of the output stream, no simulator
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use sobel_core::FrameDims;
//! use sobel_sim::{ValidationConfig, ValidationRun};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = ValidationConfig::new(FrameDims::new(128, 128)?);
//! config.design_dir = "rtl".into();
//! config.work_dir = "rtl".into();
//!
//! let report = ValidationRun::new(config)?.execute("test_image.png".as_ref())?;
//! println!("{}", report.comparison);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod backend;
pub mod backends;
mod error;
mod harness;

pub use backend::{
    select_backend, BackendConfig, BackendSelection, BackendType, SimulationBackend,
    DEFAULT_STEP_TIMEOUT,
};
pub use backends::{IcarusBackend, SoftwareBackend};
pub use error::{Result, SimError};
pub use harness::{ValidationConfig, ValidationReport, ValidationRun};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        BackendSelection, IcarusBackend, Result, SimError, SimulationBackend, SoftwareBackend,
        ValidationConfig, ValidationReport, ValidationRun,
    };
}
