pub mod runner;

use std::fmt;
use std::future::Future;
use std::path::Path;

pub use runner::ProcessRunner;

/// One external checker invocation: a program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CheckCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// A node tool resolved through `npx`.
    pub fn npx(args: &[&str]) -> Self {
        Self::new("npx", args.iter().copied())
    }
}

impl fmt::Display for CheckCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs a checker and hands back whatever it printed on stdout.
///
/// Implementations never fail: a checker that could not be started, timed out
/// without output, or crashed yields an empty string, which callers read as
/// "no data".
pub trait CheckRunner {
    fn run(&self, command: &CheckCommand, cwd: &Path) -> impl Future<Output = String> + Send;
}
