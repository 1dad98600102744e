use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::ChildStdout;
use tokio::process::Command;
use tracing::debug;
use tracing::warn;

use super::reader::ReaderSource;
use super::LineSource;
use super::SourceError;

/// macOS unified log, filtered to camera (CoreMediaIO) events
pub const CAMERA_LOG_PROGRAM: &str = "log";
pub const CAMERA_LOG_ARGS: &[&str] = &[
    "stream",
    "--predicate",
    "subsystem == \"com.apple.cmio\"",
    "--style",
    "compact",
];

/// How long the producer gets to exit after SIGTERM before it is killed
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Lines from the stdout of a child process
#[derive(Debug)]
pub struct ProcessSource {
    program: String,
    child: Child,
    lines: ReaderSource<BufReader<ChildStdout>>,
}

impl ProcessSource {
    /// Start `program` with stdout piped. Stdin and stderr are discarded.
    pub fn spawn<I, S>(program: &str, args: I) -> Result<Self, SourceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SourceError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SourceError::NoStdout(program.to_string()))?;

        debug!("Started {} (pid {:?})", program, child.id());

        Ok(Self {
            program: program.to_string(),
            child,
            lines: ReaderSource::new(BufReader::new(stdout)),
        })
    }

    /// Stream camera events from the system log
    pub fn camera_log() -> Result<Self, SourceError> {
        Self::spawn(CAMERA_LOG_PROGRAM, CAMERA_LOG_ARGS)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// OS process id, `None` once the child has been reaped
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn terminate_error(&self, source: std::io::Error) -> SourceError {
        SourceError::Terminate {
            program: self.program.clone(),
            source,
        }
    }

    #[cfg(unix)]
    fn send_sigterm(&self) -> bool {
        let Some(pid) = self.child.id() else {
            return false;
        };
        let Ok(pid) = libc::pid_t::try_from(pid) else {
            return false;
        };
        // SAFETY: pid belongs to a child we have not yet reaped
        unsafe { libc::kill(pid, libc::SIGTERM) == 0 }
    }

    #[cfg(not(unix))]
    fn send_sigterm(&self) -> bool {
        false
    }
}

#[async_trait]
impl LineSource for ProcessSource {
    async fn next_line(&mut self) -> Result<Option<String>, SourceError> {
        self.lines.next_line().await
    }

    async fn shutdown(&mut self) -> Result<(), SourceError> {
        if let Some(status) = self.child.try_wait().map_err(|e| self.terminate_error(e))? {
            debug!("{} already exited with {}", self.program, status);
            return Ok(());
        }

        if self.send_sigterm() {
            match tokio::time::timeout(TERMINATE_GRACE, self.child.wait()).await {
                Ok(Ok(status)) => {
                    debug!("{} exited with {}", self.program, status);
                    return Ok(());
                }
                Ok(Err(e)) => return Err(self.terminate_error(e)),
                Err(_) => warn!(
                    "{} did not exit within {:?}, killing it",
                    self.program, TERMINATE_GRACE
                ),
            }
        }

        self.child.kill().await.map_err(|e| self.terminate_error(e))
    }
}
