//! Executing an [`InvocationSpec`].
//!
//! The runner is a seam: the library ships [`SystemRunner`], and tests (or
//! callers with their own sandboxing, timeouts or remote execution) provide
//! another [`ProcessRunner`].

use std::process::{Command, Stdio};

use crate::command::InvocationSpec;
use crate::normalize::RawResult;

/// Runs one invocation to completion and captures its output.
pub trait ProcessRunner: Send + Sync {
    /// Execute `spec` synchronously.
    ///
    /// An `Err` means the process could not be started at all; a process that
    /// starts and fails is an `Ok` with a non-zero exit code.
    fn run(&self, spec: &InvocationSpec) -> std::io::Result<RawResult>;
}

/// Spawns the program with `std::process`, stdin closed, output captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &InvocationSpec) -> std::io::Result<RawResult> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        command.stdin(Stdio::null());
        if let Some(dir) = &spec.working_dir {
            command.current_dir(dir);
        }

        let output = command.output()?;

        Ok(RawResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, spec: &InvocationSpec) -> std::io::Result<RawResult> {
        (**self).run(spec)
    }
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for Box<R> {
    fn run(&self, spec: &InvocationSpec) -> std::io::Result<RawResult> {
        (**self).run(spec)
    }
}
