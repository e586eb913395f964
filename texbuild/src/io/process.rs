//! Running tool processes with line-streamed output.

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, info, instrument, warn};
use wait_timeout::ChildExt;

/// A fully resolved tool invocation.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Absolute path of the executable to spawn.
    pub program: PathBuf,
    /// Tokenized arguments (already template-expanded).
    pub args: Vec<String>,
    /// Directory the tool runs in.
    pub working_dir: PathBuf,
    /// Prefix put on every streamed output line, e.g. `[texbuild][pdflatex]`.
    pub log_prefix: String,
    /// Bounded wait; `None` blocks until the tool terminates.
    pub timeout: Option<Duration>,
}

/// Terminal state of a tool process.
#[derive(Debug, Clone, Copy)]
pub struct ToolExit {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub timed_out: bool,
}

/// Spawn the tool and wait for it, streaming stdout at info level and stderr
/// at error level, each line prefixed for traceability. Non-UTF-8 output is
/// rendered lossily and never fails the run.
///
/// Output is drained concurrently while the child runs to avoid pipe
/// deadlocks. A spawn failure is returned as an error so the caller can apply
/// the optional-step policy; a non-zero exit is not an error here.
#[instrument(skip_all, fields(program = %invocation.program.display()))]
pub fn run_tool(invocation: &ToolInvocation) -> Result<ToolExit> {
    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .current_dir(&invocation.working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning tool process");
    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawn {}", invocation.program.display()))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let prefix = invocation.log_prefix.clone();
    let stdout_handle = thread::spawn(move || stream_lines(stdout, &prefix, false));
    let prefix = invocation.log_prefix.clone();
    let stderr_handle = thread::spawn(move || stream_lines(stderr, &prefix, true));

    let mut timed_out = false;
    let status = match invocation.timeout {
        Some(timeout) => match child.wait_timeout(timeout).context("wait for tool")? {
            Some(status) => status,
            None => {
                warn!(timeout_secs = timeout.as_secs(), "tool timed out, killing");
                timed_out = true;
                child.kill().context("kill tool")?;
                child.wait().context("wait tool after kill")?
            }
        },
        None => child.wait().context("wait for tool")?,
    };

    join_stream(stdout_handle).context("join stdout")?;
    join_stream(stderr_handle).context("join stderr")?;

    debug!(exit_code = ?status.code(), timed_out, "tool finished");
    Ok(ToolExit {
        code: status.code(),
        timed_out,
    })
}

fn join_stream(handle: thread::JoinHandle<Result<()>>) -> Result<()> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

// Tool output is not guaranteed to be UTF-8 (LaTeX engines emit latin-1
// console bytes), so lines are read as raw bytes and rendered lossily.
// Output encoding must never affect the exit-status contract.
fn stream_lines<R: Read>(reader: R, prefix: &str, is_error: bool) -> Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .context("read tool output")?;
        if read == 0 {
            return Ok(());
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        let line = String::from_utf8_lossy(&buf);
        if is_error {
            error!("{prefix} {line}");
        } else {
            info!("{prefix} {line}");
        }
    }
}
