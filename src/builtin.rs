use crate::command::{Builtin, Context, Status};
use anyhow::{Context as _, Result};
use argh::{EarlyExit, FromArgs};
use std::env;

/// Fixed, ordered table of builtin commands.
///
/// The table is built once at startup and handed to the interpreter; it is
/// never mutated afterwards. Lookup is by exact name and the enumeration
/// order is the registration order.
pub struct Builtins {
    commands: Vec<Box<dyn Builtin>>,
}

impl Builtins {
    /// Create a table from the given commands. If two commands share a name,
    /// the first one registered wins.
    pub fn new(commands: Vec<Box<dyn Builtin>>) -> Self {
        Self { commands }
    }

    /// Find the builtin called `name`.
    pub fn lookup(&self, name: &str) -> Option<&dyn Builtin> {
        self.commands
            .iter()
            .find(|cmd| cmd.name() == name)
            .map(|cmd| &**cmd)
    }

    /// Names of all builtins in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|cmd| cmd.name())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for Builtins {
    /// The shell's builtins: `cd`, `help`, `exit`.
    fn default() -> Self {
        Self::new(vec![Box::new(Cd), Box::new(Help), Box::new(Exit)])
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
struct CdArgs {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    target: Option<String>,
}

/// Changes the working directory of the shell process.
pub struct Cd;

impl Builtin for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(&self, args: &[String], ctx: &mut Context<'_>) -> Result<Status> {
        let mut rest: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();
        // Every token after `cd` is a path, even `help` or `-dir`; only a
        // lone `--help` asks for usage.
        if rest != ["--help"] {
            rest.insert(0, "--");
        }
        let parsed = match CdArgs::from_args(&[self.name()], &rest) {
            Ok(parsed) => parsed,
            Err(EarlyExit { output, status }) => {
                match status {
                    Ok(()) => writeln!(ctx.stdout, "{}", output.trim_end())?,
                    Err(()) => writeln!(ctx.stderr, "lsh: cd: {}", output.trim_end())?,
                }
                return Ok(Status::Continue);
            }
        };

        let Some(target) = parsed.target else {
            writeln!(ctx.stderr, "lsh: expected argument to \"cd\"")?;
            return Ok(Status::Continue);
        };

        env::set_current_dir(&target).with_context(|| format!("cd: {}", target))?;
        tracing::debug!(%target, "changed directory");
        Ok(Status::Continue)
    }
}

/// Prints a short banner and the list of builtins.
pub struct Help;

impl Builtin for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn execute(&self, _args: &[String], ctx: &mut Context<'_>) -> Result<Status> {
        writeln!(ctx.stdout, "lsh: a minimal command shell")?;
        writeln!(ctx.stdout, "Type program names and arguments, and hit enter.")?;
        writeln!(ctx.stdout, "The following are built in:")?;
        for name in ctx.builtins.names() {
            writeln!(ctx.stdout, "  {}", name)?;
        }
        writeln!(
            ctx.stdout,
            "Use the man command for information on other programs."
        )?;
        Ok(Status::Continue)
    }
}

/// Terminates the read-eval loop. Arguments are ignored.
pub struct Exit;

impl Builtin for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, _args: &[String], _ctx: &mut Context<'_>) -> Result<Status> {
        Ok(Status::Stop)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lexer::split_into_tokens;
    use std::fs;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that read or change the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run(cmd: &dyn Builtin, line: &str) -> (Result<Status>, String, String) {
        let builtins = Builtins::default();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let res = {
            let mut ctx = Context {
                stdout: &mut out,
                stderr: &mut err,
                builtins: &builtins,
            };
            cmd.execute(&split_into_tokens(line), &mut ctx)
        };
        (
            res,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_default_table_order_and_lookup() {
        let builtins = Builtins::default();
        assert_eq!(builtins.names().collect::<Vec<_>>(), ["cd", "help", "exit"]);
        assert_eq!(builtins.len(), 3);
        assert!(!builtins.is_empty());
        assert_eq!(builtins.lookup("help").map(|b| b.name()), Some("help"));
        assert!(builtins.lookup("ls").is_none());
        assert!(builtins.lookup("EXIT").is_none());
    }

    #[test]
    fn test_first_registered_name_wins() {
        struct Shadow;
        impl Builtin for Shadow {
            fn name(&self) -> &'static str {
                "exit"
            }
            fn execute(&self, _args: &[String], _ctx: &mut Context<'_>) -> Result<Status> {
                Ok(Status::Continue)
            }
        }
        let builtins = Builtins::new(vec![Box::new(Exit), Box::new(Shadow)]);
        let (res, _, _) = run(builtins.lookup("exit").unwrap(), "exit");
        assert_eq!(res.unwrap(), Status::Stop);
    }

    #[test]
    fn test_exit_stops_regardless_of_arguments() {
        for line in ["exit", "exit 1", "exit --help", "exit now please -x"] {
            let (res, out, err) = run(&Exit, line);
            assert_eq!(res.unwrap(), Status::Stop, "line {:?}", line);
            assert!(out.is_empty());
            assert!(err.is_empty());
        }
    }

    #[test]
    fn test_help_lists_builtins_in_order() {
        let (res, out, err) = run(&Help, "help me --please");
        assert_eq!(res.unwrap(), Status::Continue);
        assert!(err.is_empty());

        let listed: Vec<&str> = out
            .lines()
            .filter_map(|line| line.strip_prefix("  "))
            .collect();
        assert_eq!(listed, ["cd", "help", "exit"]);
        assert!(out.starts_with("lsh: a minimal command shell\n"));
    }

    #[test]
    fn test_cd_without_argument_reports_usage() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();

        let (res, out, err) = run(&Cd, "cd");

        assert_eq!(res.unwrap(), Status::Continue);
        assert!(out.is_empty());
        assert!(err.contains("expected argument to \"cd\""), "stderr: {}", err);
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_cd_with_too_many_arguments_reports_usage() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();

        let (res, out, err) = run(&Cd, "cd /tmp /var");

        assert_eq!(res.unwrap(), Status::Continue);
        assert!(out.is_empty());
        assert!(err.starts_with("lsh: cd: "), "stderr: {}", err);
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();
        let tmp = env::temp_dir().join(format!("lsh_cd_test_{}", std::process::id()));
        fs::create_dir_all(&tmp).unwrap();

        let (res, out, err) = run(&Cd, &format!("cd {}", tmp.display()));
        let after = env::current_dir().unwrap();
        env::set_current_dir(&before).unwrap();

        assert_eq!(res.unwrap(), Status::Continue);
        assert!(out.is_empty());
        assert!(err.is_empty());
        assert_eq!(
            fs::canonicalize(after).unwrap(),
            fs::canonicalize(&tmp).unwrap()
        );
        let _ = fs::remove_dir_all(tmp);
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();

        let (res, out, err) = run(&Cd, "cd /nonexistent-path-xyz");

        let e = res.unwrap_err();
        assert!(format!("{:#}", e).contains("/nonexistent-path-xyz"));
        assert!(out.is_empty());
        assert!(err.is_empty());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_cd_into_directories_that_look_like_options() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();
        let tmp = env::temp_dir().join(format!("lsh_cd_names_{}", std::process::id()));
        for name in ["help", "-dash"] {
            fs::create_dir_all(tmp.join(name)).unwrap();
        }

        let mut moved = Vec::new();
        for name in ["help", "-dash"] {
            env::set_current_dir(&tmp).unwrap();
            let (res, out, err) = run(&Cd, &format!("cd {}", name));
            let after = env::current_dir().unwrap();
            moved.push((name, res.is_ok(), out, err, after));
        }
        env::set_current_dir(&before).unwrap();

        for (name, ok, out, err, after) in moved {
            assert!(ok, "cd {}", name);
            assert!(out.is_empty(), "cd {}: stdout {}", name, out);
            assert!(err.is_empty(), "cd {}: stderr {}", name, err);
            assert_eq!(
                fs::canonicalize(after).unwrap(),
                fs::canonicalize(tmp.join(name)).unwrap()
            );
        }
        let _ = fs::remove_dir_all(tmp);
    }

    #[test]
    fn test_cd_help_flag_prints_usage() {
        let _lock = lock_current_dir();
        let before = env::current_dir().unwrap();

        let (res, out, err) = run(&Cd, "cd --help");

        assert_eq!(res.unwrap(), Status::Continue);
        assert!(out.starts_with("Usage: cd"), "stdout: {}", out);
        assert!(err.is_empty());
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
