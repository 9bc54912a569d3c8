// SPDX-License-Identifier: AGPL-3.0-only

//! Pure model of the streaming Sobel edge-detection design.
//!
//! This crate has **no dependencies** and **no simulator access**. It records
//! what the RTL fixes by construction: the sliding-window geometry and the
//! warm-up latency it implies, the design source files, and the artifact
//! names the testbench reads and writes.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`pipeline`] | Kernel geometry, warm-up rows/columns, latency derivation |
//! | [`sources`] | Testbench + module file list, artifact names, frame parameters |
//!
//! # Latency
//!
//! ```
//! use sobel_design::pipeline::PipelineGeometry;
//!
//! let geom = PipelineGeometry::default();
//! assert_eq!(geom.latency(128), 2 * 128 + 2);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod pipeline;
pub mod sources;
