//! Helpers for running child processes and capturing their output in memory.

use std::borrow::Cow;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use tracing::{debug, instrument, warn};

use crate::error::LaunchError;

/// Captured result of one finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Command vector the child was started with.
    pub args: Vec<String>,
    /// Exit code. On Unix a signal-terminated child reports `-signal`.
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Map an exit status to a single integer.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

/// Spawn `cmd`, wait for it, and capture stdout/stderr without risking pipe deadlocks.
///
/// Both streams are drained on their own threads while the child runs. `args`
/// is only recorded in the result and used for error messages.
#[instrument(skip_all, fields(program = args.first().map(String::as_str).unwrap_or_default()))]
pub fn run_command_capture(
    mut cmd: Command,
    args: &[String],
) -> Result<ProcessResult, LaunchError> {
    let program = args.first().ok_or(LaunchError::EmptyCommand)?;
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        program: program.clone(),
        cwd: cmd
            .get_current_dir()
            .map(|dir| dir.to_path_buf())
            .unwrap_or_default(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_handle = thread::spawn(move || read_stream(stdout));
    let stderr_handle = thread::spawn(move || read_stream(stderr));

    let status = wait_or_kill(&mut child);
    let stdout = join_output(stdout_handle);
    let stderr = join_output(stderr_handle);

    let capture_err = |source| LaunchError::Capture {
        program: program.clone(),
        source,
    };
    let status = status.map_err(capture_err)?;
    let stdout = stdout.map_err(capture_err)?;
    let stderr = stderr.map_err(capture_err)?;

    let exit_code = exit_code(status);
    debug!(
        exit_code,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "command finished"
    );
    Ok(ProcessResult {
        args: args.to_vec(),
        exit_code,
        stdout,
        stderr,
    })
}

/// Process handle that can be waited on and killed.
trait Reap {
    fn wait(&mut self) -> io::Result<ExitStatus>;
    fn kill(&mut self) -> io::Result<()>;
}

impl Reap for Child {
    fn wait(&mut self) -> io::Result<ExitStatus> {
        Child::wait(self)
    }

    fn kill(&mut self) -> io::Result<()> {
        Child::kill(self)
    }
}

/// Wait for the child. If waiting fails, kill it and reap it once more so the
/// output pipes close before the reader threads are joined.
fn wait_or_kill<R: Reap>(child: &mut R) -> io::Result<ExitStatus> {
    let err = match child.wait() {
        Ok(status) => return Ok(status),
        Err(err) => err,
    };
    warn!(err = %err, "wait for child failed, killing");
    if let Err(kill_err) = child.kill() {
        warn!(err = %kill_err, "kill child after failed wait");
    }
    if let Err(wait_err) = child.wait() {
        warn!(err = %wait_err, "wait child after kill");
    }
    Err(err)
}

fn join_output(handle: thread::JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(io::Error::other("output reader thread panicked")),
    }
}

fn read_stream<R: Read>(reader: Option<R>) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf)?;
    }
    Ok(buf)
}
