// SPDX-License-Identifier: AGPL-3.0-only

#![deny(unsafe_code)]

//! Stream codec, reconstruction and scoring for the streaming Sobel pipeline
//!
//! This crate holds everything about a validation run that does not involve
//! the simulator itself:
//!
//! - **Encoding**: grayscale frame → `$readmemh` pixel stream
//! - **Reconstruction**: latency-shifted output samples → frame
//! - **Reference**: software Sobel with the hardware's Manhattan norm
//! - **Metrics**: MSE and PSNR between reconstruction and reference
//!
//! # Example
//!
//! ```
//! use sobel_core::{compare, BorderRule, FrameDims, IntensityGrid, Reconstructor};
//! use sobel_design::pipeline::PipelineGeometry;
//!
//! # fn main() -> sobel_core::Result<()> {
//! let dims = FrameDims::new(4, 4)?;
//! let rec = Reconstructor::new(dims, PipelineGeometry::default(), BorderRule::FlatPrefix)?;
//! assert_eq!(rec.latency(), 10);
//!
//! let rebuilt = rec.reconstruct(&[0x10; 6])?;
//! let reference = IntensityGrid::filled(dims, 0x10);
//! let cmp = compare(&rebuilt, &reference)?;
//! assert_eq!(cmp.mse, 160.0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod error;
mod grid;
pub mod image_io;
mod metrics;
mod reconstruct;
pub mod reference;
pub mod stream;

pub use error::{Result, SobelError};
pub use grid::{FrameDims, IntensityGrid};
pub use metrics::{compare, mse, psnr_from_mse, Comparison, PSNR_PEAK};
pub use reconstruct::{BorderRule, Reconstructor};
pub use reference::sobel_manhattan;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        compare, sobel_manhattan, BorderRule, Comparison, FrameDims, IntensityGrid,
        Reconstructor, Result, SobelError,
    };
}
