/// Prompt used when none is given on the command line.
pub const DEFAULT_PROMPT: &str = "> ";

/// Startup settings of the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Text written before every input line.
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}
