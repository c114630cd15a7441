//! Scripted process launcher.
//!
//! [`ScriptedLauncher`] hands out one [`ProcessScript`] per `launch` call,
//! in order. When the queue is empty every launch succeeds silently with
//! exit code 0. All launched commands are recorded for assertions.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{stream, FutureExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::ProvisionError;
use crate::port::outbound::process::{CommandSpec, LineStream, ProcessHandle, ProcessLauncher};

/// Canned behaviour of one launched process.
#[derive(Debug, Default)]
pub struct ProcessScript {
    stdout: Vec<String>,
    stderr: Vec<String>,
    exit_code: i32,
    line_delay: Option<Duration>,
    launch_error: bool,
    gate: Option<oneshot::Receiver<()>>,
}

impl ProcessScript {
    /// Process that exits with `code` after printing nothing.
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    /// Executable that cannot be started.
    pub fn launch_failure() -> Self {
        Self {
            launch_error: true,
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, lines: &[&str]) -> Self {
        self.stdout = lines.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_stderr(mut self, lines: &[&str]) -> Self {
        self.stderr = lines.iter().map(ToString::to_string).collect();
        self
    }

    /// Sleep before emitting each line.
    pub fn with_line_delay(mut self, delay: Duration) -> Self {
        self.line_delay = Some(delay);
        self
    }

    /// Hold the exit until the returned gate is opened (or dropped).
    pub fn gated(mut self) -> (Self, ProcessGate) {
        let (tx, rx) = oneshot::channel();
        self.gate = Some(rx);
        (self, ProcessGate(tx))
    }
}

/// Releases a gated process.
#[derive(Debug)]
pub struct ProcessGate(oneshot::Sender<()>);

impl ProcessGate {
    pub fn open(self) {
        let _ = self.0.send(());
    }
}

/// [`ProcessLauncher`] that replays [`ProcessScript`]s.
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    scripts: Mutex<VecDeque<ProcessScript>>,
    launched: Arc<Mutex<Vec<CommandSpec>>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scripts(scripts: Vec<ProcessScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            launched: Arc::default(),
        }
    }

    /// Queue another script.
    pub fn push(&self, script: ProcessScript) {
        self.scripts.lock().push_back(script);
    }

    /// Commands passed to `launch`, including ones that failed to start.
    pub fn launched(&self) -> Vec<CommandSpec> {
        self.launched.lock().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launched.lock().len()
    }
}

fn scripted_lines(lines: Vec<String>, delay: Option<Duration>) -> LineStream {
    stream::iter(lines)
        .then(move |line| async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            line
        })
        .boxed()
}

impl ProcessLauncher for ScriptedLauncher {
    fn launch(&self, command: &CommandSpec) -> Result<ProcessHandle, ProvisionError> {
        self.launched.lock().push(command.clone());
        let script = self.scripts.lock().pop_front().unwrap_or_default();

        if script.launch_error {
            return Err(ProvisionError::Launch {
                program: command.program.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "No such file or directory",
                ),
            });
        }

        let code = script.exit_code;
        let gate = script.gate;
        let exit = async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(code)
        }
        .boxed();

        Ok(ProcessHandle::new(
            scripted_lines(script.stdout, script.line_delay),
            scripted_lines(script.stderr, script.line_delay),
            exit,
        ))
    }
}
