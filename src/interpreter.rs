use crate::builtin::Builtins;
use crate::command::{Context, Status};
use crate::config::Config;
use crate::external;
use crate::io_adapters::LineReader;
use crate::lexer;
use std::fmt::Display;
use std::io::{self, Write};

/// A minimal shell: dispatches token sequences to builtins or external
/// programs and drives the read-eval loop.
///
/// Example
/// ```
/// use lsh::{Builtins, Config, Interpreter, Status};
/// let sh = Interpreter::new(Config::default(), Builtins::default());
/// let (mut out, mut err) = (Vec::<u8>::new(), Vec::<u8>::new());
/// assert_eq!(sh.run_line("exit", &mut out, &mut err), Status::Stop);
/// ```
pub struct Interpreter {
    config: Config,
    builtins: Builtins,
}

impl Interpreter {
    pub fn new(config: Config, builtins: Builtins) -> Self {
        Self { config, builtins }
    }

    /// Run one token sequence.
    ///
    /// An empty sequence is a no-op. A builtin with the name of the first
    /// token always takes precedence over a program of the same name. Every
    /// failure is reported to `stderr` and yields [`Status::Continue`]; only
    /// a builtin such as `exit` can return [`Status::Stop`].
    pub fn execute(
        &self,
        tokens: &[String],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Status {
        let Some(name) = tokens.first() else {
            return Status::Continue;
        };

        if let Some(builtin) = self.builtins.lookup(name) {
            tracing::debug!(%name, "running builtin");
            let mut ctx = Context {
                stdout: &mut *stdout,
                stderr: &mut *stderr,
                builtins: &self.builtins,
            };
            return match builtin.execute(tokens, &mut ctx) {
                Ok(status) => status,
                Err(e) => {
                    report(stderr, format_args!("{:#}", e));
                    Status::Continue
                }
            };
        }

        // The child writes straight to the inherited descriptors.
        if let Err(e) = stdout.flush() {
            tracing::warn!(error = %e, "failed to flush output before launch");
        }
        tracing::debug!(%name, "launching external program");
        match external::launch(tokens) {
            Ok(outcome) => {
                tracing::debug!(%name, ?outcome, success = outcome.success(), "program finished")
            }
            Err(e) => report(stderr, e),
        }
        Status::Continue
    }

    /// Tokenize `line` and run it.
    pub fn run_line(&self, line: &str, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Status {
        self.execute(&lexer::split_into_tokens(line), stdout, stderr)
    }

    /// Read-eval loop: prompt, read, tokenize, dispatch, until a command
    /// returns [`Status::Stop`] or the input ends.
    ///
    /// End of input is handled like `exit`. Only I/O errors of the line
    /// source itself are returned.
    pub fn repl(
        &self,
        lines: &mut dyn LineReader,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> io::Result<()> {
        loop {
            let Some(line) = lines.read_line(&self.config.prompt)? else {
                tracing::debug!("end of input");
                return Ok(());
            };
            if !self.run_line(&line, stdout, stderr).should_continue() {
                tracing::debug!("loop stopped");
                return Ok(());
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Config::default(), Builtins::default())
    }
}

fn report(stderr: &mut dyn Write, message: impl Display) {
    if let Err(e) = writeln!(stderr, "lsh: {}", message) {
        tracing::error!(error = %e, "failed to write diagnostic");
    }
}
