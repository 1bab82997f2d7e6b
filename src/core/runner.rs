//! Purpose: Narrow process-spawning capability used by the invoker and registry.
//! Exports: `ProcessRunner`, `ProcessOutput`, `SystemRunner`, `Argv`.
//! Role: Seam between argv construction and the OS; tests substitute recorders.
//! Invariants: stdout and stderr are captured fully; nothing is streamed.
//! Invariants: stdin is written from a helper thread so full output pipes cannot deadlock the child.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Argv {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Argv {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program followed by args, for logs and error context.
    pub fn to_strings(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len() + 1);
        out.push(self.program.to_string_lossy().into_owned());
        out.extend(self.args.iter().cloned());
        out
    }

    pub fn contains(&self, token: &str) -> bool {
        self.args.iter().any(|arg| arg == token)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub trait ProcessRunner {
    fn run(&self, argv: &Argv, stdin: Option<&[u8]>) -> Result<ProcessOutput, Error>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, argv: &Argv, stdin: Option<&[u8]>) -> Result<ProcessOutput, Error> {
        (**self).run(argv, stdin)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, argv: &Argv, stdin: Option<&[u8]>) -> Result<ProcessOutput, Error> {
        let mut child = Command::new(&argv.program)
            .args(&argv.args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                let kind = if err.kind() == io::ErrorKind::NotFound {
                    ErrorKind::NotInstalled
                } else {
                    ErrorKind::Io
                };
                Error::new(kind)
                    .with_message("failed to spawn solc")
                    .with_path(&argv.program)
                    .with_source(err)
            })?;

        let writer = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.to_vec();
                Some(thread::spawn(move || pipe.write_all(&input)))
            }
            _ => None,
        };

        let output = child.wait_with_output().map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to wait for solc")
                .with_path(&argv.program)
                .with_source(err)
        })?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // The child may exit without draining stdin (e.g. `--version`).
                Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {}
                Ok(Err(err)) => {
                    return Err(Error::new(ErrorKind::Io)
                        .with_message("failed to write solc stdin")
                        .with_path(&argv.program)
                        .with_source(err));
                }
                Err(_) => {
                    return Err(Error::new(ErrorKind::Internal)
                        .with_message("stdin writer thread panicked"));
                }
            }
        }

        Ok(ProcessOutput {
            exit_code: exit_code(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
