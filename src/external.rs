//! Running external programs in a child process.
//!
//! A launch forks the shell, replaces the child image with the requested
//! program via `execvp` (so the program is looked up in `PATH` and inherits
//! the environment), and blocks the parent until the child is done.

use nix::errno::Errno;
use nix::libc;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, fork};
use std::ffi::{CString, NulError, c_char};
use std::ptr;
use thiserror::Error;

/// Status value a child exits with when its program could not be executed.
pub const EXEC_FAILURE: i32 = 1;

/// Errors reported by the parent side of a launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Nothing to run.
    #[error("no command given")]
    EmptyCommand,

    /// An argument cannot be passed to `execvp`.
    #[error("{0:?}: argument contains a NUL byte")]
    InvalidArgument(String, #[source] NulError),

    /// The child process could not be created.
    #[error("fork failed: {0}")]
    Fork(#[source] Errno),

    /// The child was created but its status could not be collected.
    #[error("waiting for process {pid} failed: {source}")]
    Wait { pid: Pid, source: Errno },
}

/// How a collected child finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The child exited with the given status code.
    Exited(i32),
    /// The child was terminated by the given signal number.
    Signaled(i32),
    /// The child was stopped by the given signal number and left behind.
    Stopped(i32),
}

impl Outcome {
    pub fn success(self) -> bool {
        self == Outcome::Exited(0)
    }
}

/// Runs `args[0]` with `args` as its argument vector and waits for it.
///
/// If the program cannot be executed, the child prints
/// `lsh: command not found: <name>` to standard error and exits with
/// [`EXEC_FAILURE`]; the parent observes this as `Outcome::Exited(1)`.
pub fn launch(args: &[String]) -> Result<Outcome, LaunchError> {
    let name = args.first().ok_or(LaunchError::EmptyCommand)?;
    let argv = externalize(args)?;
    // Everything the child touches is prepared here: it must not allocate
    // after the fork.
    let argv_ptrs = exec_array(&argv);
    let not_found = format!("lsh: command not found: {}\n", name);

    // SAFETY: the child only calls execvp, write and _exit before it either
    // becomes a new program or terminates. `argv_ptrs` is NULL-terminated and
    // points into `argv`, which outlives both calls.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            unsafe {
                libc::execvp(argv_ptrs[0], argv_ptrs.as_ptr());
                libc::write(
                    libc::STDERR_FILENO,
                    not_found.as_ptr().cast(),
                    not_found.len(),
                );
                libc::_exit(EXEC_FAILURE);
            }
        }
        Ok(ForkResult::Parent { child }) => {
            tracing::debug!(pid = %child, program = %name, "spawned child");
            let outcome = wait_for(child)?;
            tracing::debug!(pid = %child, ?outcome, "collected child");
            Ok(outcome)
        }
        Err(errno) => Err(LaunchError::Fork(errno)),
    }
}

/// Blocks until `child` has exited, been killed, or been stopped.
fn wait_for(child: Pid) -> Result<Outcome, LaunchError> {
    loop {
        match waitpid(child, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(Outcome::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(Outcome::Signaled(signal as i32)),
            Ok(WaitStatus::Stopped(_, signal)) => {
                tracing::warn!(pid = %child, ?signal, "child stopped, no longer waiting for it");
                return Ok(Outcome::Stopped(signal as i32));
            }
            Ok(other) => tracing::trace!(?other, "ignoring wait status"),
            Err(Errno::EINTR) => continue,
            Err(source) => return Err(LaunchError::Wait { pid: child, source }),
        }
    }
}

/// Converts the token sequence into the C strings `execvp` expects.
fn externalize(args: &[String]) -> Result<Vec<CString>, LaunchError> {
    args.iter()
        .map(|arg| {
            CString::new(arg.as_str()).map_err(|e| LaunchError::InvalidArgument(arg.clone(), e))
        })
        .collect()
}

/// NULL-terminated pointer array over `argv`, in the layout `execvp` takes.
fn exec_array(argv: &[CString]) -> Vec<*const c_char> {
    argv.iter()
        .map(|arg| arg.as_ptr())
        .chain([ptr::null()])
        .collect()
}
