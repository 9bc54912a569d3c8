// SPDX-License-Identifier: AGPL-3.0-only

//! `sobel`: validate the streaming Sobel RTL against a software reference.
//!
//! ```text
//! USAGE:
//!   sobel validate <image>            Encode, simulate, reconstruct and score
//!   sobel encode <image>              Write the $readmemh pixel stream
//!   sobel reconstruct <stream>        Rebuild a frame from simulator output
//!   sobel reference <image>           Write the software Sobel edge map
//!   sobel compare <a> <b>             MSE / PSNR between two images
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sobel_core::{image_io, stream, BorderRule, FrameDims, IntensityGrid, Reconstructor};
use sobel_design::pipeline::{PipelineGeometry, DEFAULT_KERNEL_SIZE};
use sobel_design::sources::DEFAULT_FRAME;
use sobel_sim::{BackendSelection, ValidationConfig, ValidationReport, ValidationRun};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sobel", about = "Streaming Sobel RTL validation harness", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the full pipeline: encode, simulate, reconstruct, compare.
    Validate {
        /// Input image (any format the image crate reads).
        image: PathBuf,
        #[command(flatten)]
        frame: FrameArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
        /// Simulator backend.
        #[arg(long, value_enum, default_value_t = BackendArg::Icarus)]
        backend: BackendArg,
        /// Directory holding the testbench and RTL sources.
        #[arg(long, default_value = ".")]
        design_dir: PathBuf,
        /// Directory for stream artifacts (defaults to the design directory).
        #[arg(long)]
        work_dir: Option<PathBuf>,
        /// Limit for each simulator step, in seconds.
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
        /// Write original/reconstructed/reference PNGs into this directory.
        #[arg(long)]
        save_images: Option<PathBuf>,
    },
    /// Write an image as a one-token-per-line hex pixel stream.
    Encode {
        /// Input image.
        image: PathBuf,
        /// Stream file to write.
        #[arg(short, long, default_value = "input_pixels.mem")]
        output: PathBuf,
        #[command(flatten)]
        frame: FrameArgs,
    },
    /// Rebuild a frame from a simulator output stream.
    Reconstruct {
        /// Simulator output stream.
        stream: PathBuf,
        /// PNG to write.
        #[arg(short, long, default_value = "reconstructed.png")]
        output: PathBuf,
        #[command(flatten)]
        frame: FrameArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// Write the software Sobel edge map of an image.
    Reference {
        /// Input image.
        image: PathBuf,
        /// PNG to write.
        #[arg(short, long, default_value = "reference.png")]
        output: PathBuf,
        #[command(flatten)]
        frame: FrameArgs,
    },
    /// Report MSE and PSNR between two images of the same size.
    Compare {
        /// First image.
        a: PathBuf,
        /// Second image.
        b: PathBuf,
    },
}

#[derive(Args)]
struct FrameArgs {
    /// Frame height in pixels.
    #[arg(long, default_value_t = DEFAULT_FRAME.0)]
    height: usize,
    /// Frame width in pixels.
    #[arg(long, default_value_t = DEFAULT_FRAME.1)]
    width: usize,
}

impl FrameArgs {
    fn dims(&self) -> Result<FrameDims> {
        Ok(FrameDims::new(self.height, self.width)?)
    }
}

#[derive(Args)]
struct PipelineArgs {
    /// Window size of the design (odd, at least 3).
    #[arg(long, default_value_t = DEFAULT_KERNEL_SIZE)]
    kernel_size: usize,
    /// Override the warm-up latency derived from the window size.
    #[arg(long)]
    latency: Option<usize>,
    /// How warm-up samples map onto the frame.
    #[arg(long, value_enum, default_value_t = BorderRuleArg::FlatPrefix)]
    border_rule: BorderRuleArg,
}

impl PipelineArgs {
    fn geometry(&self) -> Result<PipelineGeometry> {
        PipelineGeometry::new(self.kernel_size)
            .ok_or_else(|| anyhow!("kernel size {} must be odd and at least 3", self.kernel_size))
    }

    fn reconstructor(&self, dims: FrameDims) -> Result<Reconstructor> {
        let geometry = self.geometry()?;
        let latency = self
            .latency
            .unwrap_or_else(|| geometry.latency(dims.width()));
        Ok(Reconstructor::with_latency(
            dims,
            geometry,
            latency,
            self.border_rule.into(),
        )?)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BorderRuleArg {
    /// Warm-up pixels black, remaining samples fill the frame in raster order.
    FlatPrefix,
    /// Samples fill only rows and columns past the window inset.
    WindowedInterior,
}

impl From<BorderRuleArg> for BorderRule {
    fn from(arg: BorderRuleArg) -> Self {
        match arg {
            BorderRuleArg::FlatPrefix => Self::FlatPrefix,
            BorderRuleArg::WindowedInterior => Self::WindowedInterior,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    /// Icarus Verilog (iverilog + vvp).
    Icarus,
    /// Software golden model, no simulator required.
    Software,
}

impl From<BackendArg> for BackendSelection {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Icarus => Self::Icarus,
            BackendArg::Software => Self::Software,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Validate {
            image,
            frame,
            pipeline,
            backend,
            design_dir,
            work_dir,
            timeout_secs,
            save_images,
        } => {
            let mut config = ValidationConfig::new(frame.dims()?);
            config.geometry = pipeline.geometry()?;
            config.latency_override = pipeline.latency;
            config.border_rule = pipeline.border_rule.into();
            config.backend = backend.into();
            config.work_dir = work_dir.unwrap_or_else(|| design_dir.clone());
            config.design_dir = design_dir;
            config.timeout = std::time::Duration::from_secs(timeout_secs);
            cmd_validate(&image, config, save_images.as_deref())?;
        }
        Cmd::Encode { image, output, frame } => cmd_encode(&image, &output, &frame)?,
        Cmd::Reconstruct {
            stream,
            output,
            frame,
            pipeline,
        } => cmd_reconstruct(&stream, &output, &frame, &pipeline)?,
        Cmd::Reference { image, output, frame } => cmd_reference(&image, &output, &frame)?,
        Cmd::Compare { a, b } => cmd_compare(&a, &b)?,
    }

    Ok(())
}

fn cmd_validate(image: &Path, config: ValidationConfig, save_images: Option<&Path>) -> Result<()> {
    println!("Frame        : {}", config.dims);
    println!("Pipeline     : {}", config.geometry);
    println!("Latency      : {} samples", config.latency());
    println!("Border rule  : {}", config.border_rule);
    println!("Design dir   : {}", config.design_dir.display());
    println!();

    let mut run = ValidationRun::new(config).context("invalid validation configuration")?;
    let report = run
        .execute(image)
        .with_context(|| format!("validation of {} failed", image.display()))?;

    print_report(&report);

    if let Some(dir) = save_images {
        let written = report
            .save_images(dir)
            .with_context(|| format!("saving images to {}", dir.display()))?;
        for path in written {
            println!("Saved        : {}", path.display());
        }
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    println!("Validation Complete:");
    println!("  Samples read             : {}", report.samples);
    println!("  Simulation time          : {:.2?}", report.simulation_time);
    println!("  Mean Squared Error (MSE) : {:.2}", report.comparison.mse);
    if report.comparison.psnr.is_infinite() {
        println!("  PSNR                     : inf (identical)");
    } else {
        println!("  PSNR                     : {:.2} dB", report.comparison.psnr);
    }
    println!("A low MSE indicates high similarity between the RTL and reference outputs.");
}

fn cmd_encode(image: &Path, output: &Path, frame: &FrameArgs) -> Result<()> {
    let grid = load(image, frame)?;
    stream::write_stream(&grid, output)
        .with_context(|| format!("encoding stream to {}", output.display()))?;
    println!(
        "Wrote {} tokens ({}) to {}",
        grid.as_slice().len(),
        grid.dims(),
        output.display()
    );
    Ok(())
}

fn cmd_reconstruct(
    stream_path: &Path,
    output: &Path,
    frame: &FrameArgs,
    pipeline: &PipelineArgs,
) -> Result<()> {
    let dims = frame.dims()?;
    let reconstructor = pipeline.reconstructor(dims)?;

    let samples = stream::read_samples(stream_path)
        .with_context(|| format!("reading simulator output {}", stream_path.display()))?;
    let grid = reconstructor
        .reconstruct(&samples)
        .context("reconstruction rejected the sample stream")?;
    image_io::save_grid(&grid, output)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Reconstructed {} frame from {} samples (latency {}, {}) -> {}",
        dims,
        samples.len(),
        reconstructor.latency(),
        reconstructor.rule(),
        output.display()
    );
    Ok(())
}

fn cmd_reference(image: &Path, output: &Path, frame: &FrameArgs) -> Result<()> {
    let grid = load(image, frame)?;
    let edges = sobel_core::sobel_manhattan(&grid);
    image_io::save_grid(&edges, output).with_context(|| format!("writing {}", output.display()))?;
    println!("Reference edge map ({}) -> {}", edges.dims(), output.display());
    Ok(())
}

fn cmd_compare(a: &Path, b: &Path) -> Result<()> {
    let ga = image_io::load_native(a).with_context(|| format!("loading image {}", a.display()))?;
    let gb = image_io::load_native(b).with_context(|| format!("loading image {}", b.display()))?;
    let cmp = sobel_core::compare(&ga, &gb)
        .with_context(|| format!("comparing {} with {}", a.display(), b.display()))?;
    println!("{cmp}");
    Ok(())
}

fn load(image: &Path, frame: &FrameArgs) -> Result<IntensityGrid> {
    image_io::load_frame(image, frame.dims()?)
        .with_context(|| format!("loading image {}", image.display()))
}
