// SPDX-License-Identifier: AGPL-3.0-only

//! Icarus Verilog backend
//!
//! Two blocking steps, both run with the design directory as working
//! directory because the testbench opens its streams by relative name:
//!
//! ```text
//! build:  iverilog -o sobel_sim -Psobel_testbench.IMAGE_WIDTH=W ... sobel_testbench.v <modules>
//! run:    vvp sobel_sim
//! ```
//!
//! Each step's stdout and stderr go to a log file next to the sources
//! (`build.log`, `run.log`). On unix each step runs in its own process
//! group: `iverilog` forks `ivlpp` and `ivl`, and a timed-out step takes the
//! whole group down with it before the leader is reaped. Failed steps are
//! never retried.

use super::{find_in_path, remove_if_present, same_file};
use crate::backend::{BackendType, SimulationBackend, DEFAULT_STEP_TIMEOUT};
use crate::error::{Result, SimError};
use sobel_core::FrameDims;
use sobel_design::sources;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Environment variable overriding the `iverilog` executable
pub const IVERILOG_ENV: &str = "SOBEL_IVERILOG";

/// Environment variable overriding the `vvp` executable
pub const VVP_ENV: &str = "SOBEL_VVP";

const BUILD_LOG: &str = "build.log";
const RUN_LOG: &str = "run.log";
const LOG_TAIL_LINES: usize = 20;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Icarus Verilog backend
#[derive(Debug, Clone)]
pub struct IcarusBackend {
    design_dir: PathBuf,
    dims: FrameDims,
    iverilog: PathBuf,
    vvp: PathBuf,
    timeout: Duration,
    override_frame_params: bool,
}

impl IcarusBackend {
    /// Backend for the sources in `design_dir`
    ///
    /// Tools default to `iverilog` / `vvp` on `PATH`, or the paths in
    /// [`IVERILOG_ENV`] / [`VVP_ENV`] when set. Nothing is looked up until
    /// the first run.
    pub fn new(design_dir: impl Into<PathBuf>, dims: FrameDims) -> Self {
        let iverilog = std::env::var_os(IVERILOG_ENV).map_or_else(|| "iverilog".into(), PathBuf::from);
        let vvp = std::env::var_os(VVP_ENV).map_or_else(|| "vvp".into(), PathBuf::from);

        Self {
            design_dir: design_dir.into(),
            dims,
            iverilog,
            vvp,
            timeout: DEFAULT_STEP_TIMEOUT,
            override_frame_params: true,
        }
    }

    /// Use explicit tool executables
    #[must_use]
    pub fn with_tools(mut self, iverilog: impl Into<PathBuf>, vvp: impl Into<PathBuf>) -> Self {
        self.iverilog = iverilog.into();
        self.vvp = vvp.into();
        self
    }

    /// Limit for each of the build and run steps
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether to pass the frame size to the testbench with `-P` overrides
    /// (default `true`). Disable for testbenches without those parameters.
    #[must_use]
    pub fn with_frame_params(mut self, enabled: bool) -> Self {
        self.override_frame_params = enabled;
        self
    }

    /// Compile the testbench and design modules
    fn build(&self) -> Result<()> {
        let iverilog = resolve_tool(&self.iverilog, IVERILOG_ENV)?;

        let mut args: Vec<OsString> = vec!["-o".into(), sources::SIM_BINARY.into()];
        if self.override_frame_params {
            args.push(sources::param_override(sources::WIDTH_PARAM, self.dims.width()).into());
            args.push(sources::param_override(sources::HEIGHT_PARAM, self.dims.height()).into());
        }
        for file in sources::compile_order() {
            let path = self.design_dir.join(file);
            if !path.is_file() {
                return Err(SimError::DesignSourceMissing { path });
            }
            args.push(file.into());
        }

        self.run_step("build", &iverilog, &args, BUILD_LOG)?;
        info!("Compilation successful");
        Ok(())
    }

    /// Execute the compiled simulation
    fn simulate(&self) -> Result<()> {
        let vvp = resolve_tool(&self.vvp, VVP_ENV)?;
        self.run_step("run", &vvp, &[sources::SIM_BINARY.into()], RUN_LOG)?;
        info!("Simulation successful");
        Ok(())
    }

    fn run_step(&self, step: &str, program: &Path, args: &[OsString], log_name: &str) -> Result<()> {
        let command = render_command(program, args);
        let log_path = self.design_dir.join(log_name);
        info!("{step}: {command}");

        let stdout = File::create(&log_path).map_err(|e| SimError::io(&log_path, e))?;
        let stderr = stdout.try_clone().map_err(|e| SimError::io(&log_path, e))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&self.design_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut cmd, 0);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SimError::tool_not_found(program.display().to_string(), "spawn failed")
            } else {
                SimError::io(program, e)
            }
        })?;

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                warn!("{step} exceeded {:?}, killing pid {}", self.timeout, child.id());
                terminate(&mut child);
                return Err(SimError::Timeout {
                    step: step.to_string(),
                    command,
                    duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            Err(e) => {
                warn!("{step}: lost track of pid {}: {e}", child.id());
                terminate(&mut child);
                return Err(SimError::io(program, e));
            }
        };

        debug!("{step} exited with {status}");
        if !status.success() {
            return Err(SimError::ProcessFailed {
                step: step.to_string(),
                command,
                status: describe_status(status),
                tail: log_tail(&log_path),
                log: log_path,
            });
        }
        Ok(())
    }
}

impl SimulationBackend for IcarusBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Icarus
    }

    fn run(&mut self, input: &Path, output: &Path) -> Result<()> {
        let tb_input = self.design_dir.join(sources::INPUT_STREAM_FILE);
        let tb_output = self.design_dir.join(sources::OUTPUT_STREAM_FILE);

        if !same_file(input, &tb_input) {
            debug!("Staging {} -> {}", input.display(), tb_input.display());
            std::fs::copy(input, &tb_input).map_err(|e| SimError::io(input, e))?;
        }

        // A stale output from an earlier run must never pass for this one.
        remove_if_present(&tb_output)?;

        self.build()?;
        self.simulate()?;

        if !tb_output.is_file() {
            return Err(SimError::MissingOutput { path: tb_output });
        }
        if !same_file(&tb_output, output) {
            std::fs::copy(&tb_output, output).map_err(|e| SimError::io(output, e))?;
        }
        Ok(())
    }
}

/// Resolve a tool given as a bare name (searched on `PATH`) or a path
fn resolve_tool(tool: &Path, env_var: &str) -> Result<PathBuf> {
    let hint = format!("install Icarus Verilog or set {env_var}");

    if tool.components().count() > 1 || tool.is_absolute() {
        return if tool.is_file() {
            Ok(tool.to_path_buf())
        } else {
            Err(SimError::tool_not_found(tool.display().to_string(), hint))
        };
    }

    tool.to_str()
        .and_then(find_in_path)
        .ok_or_else(|| SimError::tool_not_found(tool.display().to_string(), hint))
}

/// Poll `child` until it exits or `timeout` elapses; `None` on timeout
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
    }
}

/// Kill a step that has not been reaped yet, together with everything it
/// spawned, then reap it
///
/// The leader is still unreaped here, so its pid (and with it the process
/// group id) cannot have been recycled.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use rustix::process::{kill_process_group, Pid, Signal};
        match kill_process_group(Pid::from_child(child), Signal::Kill) {
            Ok(()) => {}
            Err(e) if e == rustix::io::Errno::SRCH => {}
            Err(e) => {
                warn!("killing process group {} failed: {e}", child.id());
                if let Err(e) = child.kill() {
                    warn!("kill failed: {e}");
                }
            }
        }
    }
    #[cfg(not(unix))]
    if let Err(e) = child.kill() {
        warn!("kill failed: {e}");
    }

    if let Err(e) = child.wait() {
        warn!("reaping pid {} failed: {e}", child.id());
    }
}

fn render_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe_status(status: ExitStatus) -> String {
    status
        .code()
        .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"))
}

fn log_tail(path: &Path) -> String {
    let Ok(bytes) = std::fs::read(path) else {
        return String::new();
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(LOG_TAIL_LINES)..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_command() {
        let args: Vec<OsString> = vec!["-o".into(), "sobel_sim".into()];
        assert_eq!(
            render_command(Path::new("iverilog"), &args),
            "iverilog -o sobel_sim"
        );
    }

    #[test]
    fn test_missing_tool_path() {
        let err = resolve_tool(Path::new("/nonexistent/bin/iverilog"), IVERILOG_ENV).unwrap_err();
        assert!(matches!(err, SimError::ToolNotFound { .. }));
        assert!(err.to_string().contains(IVERILOG_ENV));
    }

    #[test]
    fn test_missing_tool_name() {
        let err = resolve_tool(Path::new("definitely-not-a-simulator-xyz"), VVP_ENV).unwrap_err();
        assert!(err.is_external_process());
    }

    #[test]
    fn test_log_tail_keeps_last_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("run.log");
        let body: String = (0..50).map(|i| format!("line {i}\n")).collect();
        std::fs::write(&path, body).unwrap();

        let tail = log_tail(&path);
        assert_eq!(tail.lines().count(), LOG_TAIL_LINES);
        assert!(tail.ends_with("line 49"));
        assert_eq!(log_tail(&dir.path().join("absent.log")), "");
    }
}
