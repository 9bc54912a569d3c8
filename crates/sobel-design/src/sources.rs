// SPDX-License-Identifier: AGPL-3.0-only

//! Design description inputs and testbench artifact names.
//!
//! The testbench opens its input and output files by fixed relative names,
//! so the simulator must run with the design directory as its working
//! directory.

/// Testbench source file.
pub const TESTBENCH_FILE: &str = "sobel_testbench.v";

/// Top-level module declared in [`TESTBENCH_FILE`].
pub const TESTBENCH_TOP: &str = "sobel_testbench";

/// RTL modules compiled alongside the testbench, in dependency order.
pub const DESIGN_MODULES: &[&str] = &["image_buffer.v", "sobel_core.v", "edge_detection_top.v"];

/// Pixel stream the testbench loads with `$readmemh`.
pub const INPUT_STREAM_FILE: &str = "input_pixels.mem";

/// Output samples the testbench writes, one hex token per line.
pub const OUTPUT_STREAM_FILE: &str = "output_edges.txt";

/// Compiled simulation image produced by the build step.
pub const SIM_BINARY: &str = "sobel_sim";

/// Testbench parameter holding the frame width.
pub const WIDTH_PARAM: &str = "IMAGE_WIDTH";

/// Testbench parameter holding the frame height.
pub const HEIGHT_PARAM: &str = "IMAGE_HEIGHT";

/// Frame size the shipped testbench is written for.
pub const DEFAULT_FRAME: (usize, usize) = (128, 128);

/// All source files in compile order (testbench first).
#[must_use]
pub fn compile_order() -> Vec<&'static str> {
    std::iter::once(TESTBENCH_FILE)
        .chain(DESIGN_MODULES.iter().copied())
        .collect()
}

/// `iverilog -P` override for a testbench parameter.
#[must_use]
pub fn param_override(name: &str, value: usize) -> String {
    format!("-P{TESTBENCH_TOP}.{name}={value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_order_starts_with_testbench() {
        let files = compile_order();
        assert_eq!(files[0], TESTBENCH_FILE);
        assert_eq!(files.len(), 1 + DESIGN_MODULES.len());
    }

    #[test]
    fn test_param_override() {
        assert_eq!(
            param_override(WIDTH_PARAM, 64),
            "-Psobel_testbench.IMAGE_WIDTH=64"
        );
    }
}
