//! A minimal command shell.
//!
//! Each input line is split into whitespace-separated words. The first word
//! names either a builtin (`cd`, `help`, `exit`), run inside the shell
//! process, or an external program, run in a forked child that the shell
//! waits for. There are no pipelines, redirections, background jobs, quoting
//! or variables.
//!
//! The main entry point is [`Interpreter`], which dispatches token sequences
//! and drives the read-eval loop over any [`io_adapters::LineReader`].

mod builtin;
pub mod command;
pub mod config;
pub mod external;
pub mod interpreter;
pub mod io_adapters;
pub mod lexer;

pub use builtin::{Builtins, Cd, Exit, Help};
pub use command::{Builtin, Context, Status};
pub use config::Config;
pub use interpreter::Interpreter;
