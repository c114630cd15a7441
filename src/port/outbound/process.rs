//! Process supervision port.
//!
//! A [`ProcessLauncher`] starts an external command and hands back a
//! [`ProcessHandle`] with two independent line streams and an exit future.
//! Both streams must be consumed (or dropped) before [`ProcessHandle::wait`]
//! is awaited, otherwise a chatty child can block on a full pipe.

use std::fmt;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

use crate::error::ProvisionError;

/// Lazy sequence of output lines from one pipe. Ends when the pipe closes.
pub type LineStream = BoxStream<'static, String>;

/// Resolves to the process exit code once it terminates.
pub type ExitFuture = BoxFuture<'static, std::io::Result<i32>>;

/// Program plus arguments of an external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Handle on a running external process.
pub struct ProcessHandle {
    stdout: Option<LineStream>,
    stderr: Option<LineStream>,
    exit: ExitFuture,
}

impl ProcessHandle {
    pub fn new(stdout: LineStream, stderr: LineStream, exit: ExitFuture) -> Self {
        Self {
            stdout: Some(stdout),
            stderr: Some(stderr),
            exit,
        }
    }

    /// Take the stdout line stream. Returns `None` on the second call.
    pub fn take_stdout(&mut self) -> Option<LineStream> {
        self.stdout.take()
    }

    /// Take the stderr line stream. Returns `None` on the second call.
    pub fn take_stderr(&mut self) -> Option<LineStream> {
        self.stderr.take()
    }

    /// Wait for the process to exit and return its exit code.
    ///
    /// Processes killed by a signal report `-1`.
    pub async fn wait(self) -> std::io::Result<i32> {
        self.exit.await
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("stdout_taken", &self.stdout.is_none())
            .field("stderr_taken", &self.stderr.is_none())
            .finish_non_exhaustive()
    }
}

/// Launches external commands.
pub trait ProcessLauncher: Send + Sync {
    /// Start `command` with piped output.
    ///
    /// # Errors
    /// Returns [`ProvisionError::Launch`] when the executable cannot be
    /// started (missing, not executable). Nothing is left running.
    fn launch(&self, command: &CommandSpec) -> Result<ProcessHandle, ProvisionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{stream, FutureExt, StreamExt};

    #[test]
    fn command_display_joins_program_and_args() {
        let cmd = CommandSpec::new("helm").args(["uninstall", "shop"]).arg("--namespace");
        assert_eq!(cmd.to_string(), "helm uninstall shop --namespace");
    }

    #[tokio::test]
    async fn streams_can_only_be_taken_once() {
        let mut handle = ProcessHandle::new(
            stream::iter(vec!["a".to_string()]).boxed(),
            stream::empty().boxed(),
            async { Ok(0) }.boxed(),
        );

        let stdout: Vec<String> = handle.take_stdout().unwrap().collect().await;
        assert_eq!(stdout, vec!["a"]);
        assert!(handle.take_stdout().is_none());
        assert!(handle.take_stderr().is_some());
        assert_eq!(handle.wait().await.unwrap(), 0);
    }
}
