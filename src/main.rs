use argh::FromArgs;
use lsh::io_adapters::{BufReadLines, EditorLines};
use lsh::{Builtins, Config, Interpreter};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing::Level;

#[derive(FromArgs)]
/// A minimal command shell: runs builtins and external programs line by line.
struct Args {
    #[argh(option, short = 'p', default = "lsh::config::DEFAULT_PROMPT.to_string()")]
    /// text written before each input line
    prompt: String,

    #[argh(switch, short = 'v')]
    /// log debug information to standard error
    verbose: bool,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let interpreter = Interpreter::new(
        Config {
            prompt: args.prompt,
        },
        Builtins::default(),
    );
    match run(&interpreter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lsh: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(interpreter: &Interpreter) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    if io::stdin().is_terminal() {
        let mut lines = EditorLines::new()?;
        interpreter.repl(&mut lines, &mut stdout, &mut stderr)?;
    } else {
        let mut lines = BufReadLines::new(io::stdin().lock(), io::stdout());
        interpreter.repl(&mut lines, &mut stdout, &mut stderr)?;
    }
    Ok(())
}
