use crate::builtin::Builtins;
use anyhow::Result;
use std::io::Write;

/// Continuation signal returned by every command.
///
/// The read-eval loop keeps reading lines while commands return
/// [`Status::Continue`] and terminates on [`Status::Stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Read and run the next line.
    Continue,
    /// Terminate the loop.
    Stop,
}

impl Status {
    pub fn should_continue(self) -> bool {
        self == Status::Continue
    }
}

/// Streams and shared state a builtin may use while it runs.
///
/// Builtins write their regular output to `stdout` and diagnostics to
/// `stderr`. The builtin table is available read-only so commands like
/// `help` can enumerate it.
pub struct Context<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub builtins: &'a Builtins,
}

/// Command implemented directly inside the shell process.
///
/// `args` is the full token sequence, so `args[0]` is the command name
/// itself. Errors returned here are reported by the dispatcher and never
/// terminate the loop.
pub trait Builtin {
    /// Name the command is looked up by, e.g. "cd".
    fn name(&self) -> &'static str;

    /// Runs the command.
    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Status>;
}
