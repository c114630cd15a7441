//! Process launcher backed by `tokio::process`.
//!
//! Children inherit the host environment, get a null stdin and piped
//! stdout/stderr. Output is split on `\n`, decoded lossily as UTF-8 and
//! trimmed. A child that outlives its handle keeps running.

use std::process::Stdio;

use futures_util::{stream, FutureExt, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ProvisionError;
use crate::port::outbound::process::{CommandSpec, LineStream, ProcessHandle, ProcessLauncher};

/// Exit code reported for processes terminated by a signal.
const SIGNALLED: i32 = -1;

/// Launches real OS processes.
#[derive(Debug, Default, Clone)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for TokioProcessLauncher {
    fn launch(&self, command: &CommandSpec) -> Result<ProcessHandle, ProvisionError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProvisionError::Launch {
                program: command.program.clone(),
                source,
            })?;

        debug!(pid = child.id(), command = %command, "process started");

        let stdout = child.stdout.take().map_or_else(|| stream::empty().boxed(), lines);
        let stderr = child.stderr.take().map_or_else(|| stream::empty().boxed(), lines);

        let exit = async move {
            let status = child.wait().await?;
            Ok(status.code().unwrap_or_else(|| {
                warn!(%status, "process terminated by signal");
                SIGNALLED
            }))
        }
        .boxed();

        Ok(ProcessHandle::new(stdout, stderr, exit))
    }
}

fn lines<R>(pipe: R) -> LineStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream::unfold(BufReader::new(pipe), |mut reader| async move {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim().to_string();
                Some((line, reader))
            }
            Err(err) => {
                warn!(error = %err, "failed to read process output");
                None
            }
        }
    })
    .boxed()
}
