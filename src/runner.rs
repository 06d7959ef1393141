//! Subprocess execution.
//!
//! [`CommandRunner`] is the only place where the client touches the operating
//! system's process facility. Tests substitute their own implementation so no
//! real `op` binary is needed.

use std::ffi::OsString;
use std::io::{self, Read};
use std::process::{Command, Output, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Environment variable that points at a specific `op` binary.
pub const OP_CLI_PATH_ENV: &str = "OP_CLI_PATH";

/// Program name looked up on `PATH` when no override is set.
pub const DEFAULT_PROGRAM: &str = "op";

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of one subprocess run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    fn from_output(output: Output) -> io::Result<Self> {
        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("non-UTF8 output: {e}"))
        })?;
        Ok(Self {
            status: output.status.code(),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs the password-manager executable with an argument list.
///
/// Implementations must block until the process has exited. An `Err` means
/// the process could not be run at all; a non-zero exit is reported through
/// [`CommandOutput::status`].
pub trait CommandRunner {
    fn run(&self, args: &[&str]) -> io::Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, args: &[&str]) -> io::Result<CommandOutput> {
        (**self).run(args)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn run(&self, args: &[&str]) -> io::Result<CommandOutput> {
        (**self).run(args)
    }
}

/// Runs the real `op` binary.
#[derive(Debug, Clone)]
pub struct OpCli {
    program: OsString,
    timeout: Option<Duration>,
}

impl OpCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Uses `OP_CLI_PATH` if it is set, otherwise `op` from `PATH`.
    pub fn from_env() -> Self {
        match std::env::var_os(OP_CLI_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::new(DEFAULT_PROGRAM),
        }
    }

    /// Kills the process and fails with `TimedOut` if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }
}

impl Default for OpCli {
    fn default() -> Self {
        Self::from_env()
    }
}

impl CommandRunner for OpCli {
    fn run(&self, args: &[&str]) -> io::Result<CommandOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);

        let output = match self.timeout {
            Some(timeout) => output_with_timeout(cmd, timeout)?,
            None => cmd.output()?,
        };
        CommandOutput::from_output(output)
    }
}

fn output_with_timeout(mut cmd: Command, timeout: Duration) -> io::Result<Output> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Both pipes are drained while waiting so a chatty child cannot block on a full buffer.
    let (tx, rx) = mpsc::channel();
    let mut pending = 0;
    if let Some(stdout) = child.stdout.take() {
        drain(stdout, Stream::Stdout, tx.clone());
        pending += 1;
    }
    if let Some(stderr) = child.stderr.take() {
        drain(stderr, Stream::Stderr, tx.clone());
        pending += 1;
    }
    drop(tx);

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            // kill fails only if the child already exited, which wait() covers
            let _ = child.kill();
            child.wait()?;
            return Err(timed_out(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    };

    // A descendant of the child may still hold the pipes open, so the
    // readers are bound by the same deadline. Readers left behind exit once
    // the last holder closes its end.
    let mut output = Output {
        status,
        stdout: Vec::new(),
        stderr: Vec::new(),
    };
    for _ in 0..pending {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let (stream, bytes) = match rx.recv_timeout(remaining) {
            Ok(message) => message,
            Err(RecvTimeoutError::Timeout) => return Err(timed_out(timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io::Error::other("output reader thread panicked"));
            }
        };
        match stream {
            Stream::Stdout => output.stdout = bytes?,
            Stream::Stderr => output.stderr = bytes?,
        }
    }
    Ok(output)
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

type Drained = (Stream, io::Result<Vec<u8>>);

fn drain<R: Read + Send + 'static>(mut reader: R, stream: Stream, tx: Sender<Drained>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = reader.read_to_end(&mut buf).map(|_| buf);
        // the receiver is gone when the call already timed out
        let _ = tx.send((stream, result));
    });
}

fn timed_out(timeout: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("process did not finish within {timeout:?}"),
    )
}
