//! Clipboard delivery through platform copy utilities.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::{DeliveryError, OutputSink};

/// How long a copy command may run before it counts as failed.
pub const DEFAULT_COPY_TIMEOUT: Duration = Duration::from_secs(5);

/// A command that reads the clipboard contents from stdin.
///
/// Tools like `xclip` and `wl-copy` leave a background process serving the
/// selection. Only the foreground process is awaited and none of its output
/// is captured, so that helper cannot hold delivery open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ClipboardCommand {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout: DEFAULT_COPY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pbcopy() -> Self {
        Self::new("pbcopy", &[])
    }

    pub fn wl_copy() -> Self {
        Self::new("wl-copy", &[])
    }

    pub fn xclip() -> Self {
        Self::new("xclip", &["-selection", "clipboard"])
    }

    pub fn xsel() -> Self {
        Self::new("xsel", &["--clipboard", "--input"])
    }

    pub fn clip_exe() -> Self {
        Self::new("clip.exe", &[])
    }

    /// Candidates in the order they should be tried on this platform.
    pub fn platform_defaults() -> Vec<Self> {
        if cfg!(target_os = "macos") {
            vec![Self::pbcopy()]
        } else if cfg!(target_os = "windows") {
            vec![Self::clip_exe()]
        } else {
            // clip.exe covers WSL.
            vec![Self::wl_copy(), Self::xclip(), Self::xsel(), Self::clip_exe()]
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl OutputSink for ClipboardCommand {
    fn name(&self) -> &str {
        &self.program
    }

    async fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DeliveryError::failed(&self.program, e.to_string()))?;

        let copy = async {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(payload.as_bytes()).await?;
                stdin.shutdown().await?;
                // Dropped here so the command sees EOF.
            }
            child.wait().await
        };

        let status = match timeout(self.timeout, copy).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => return Err(DeliveryError::failed(&self.program, e.to_string())),
            Err(_) => {
                return Err(DeliveryError::failed(
                    &self.program,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
        };

        if status.success() {
            Ok(())
        } else {
            Err(DeliveryError::failed(
                &self.program,
                format!("exited with {}", status),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_defaults_not_empty() {
        assert!(!ClipboardCommand::platform_defaults().is_empty());
    }

    #[tokio::test]
    async fn test_missing_program_fails() {
        let command = ClipboardCommand::new("albumlink-no-such-clipboard-tool", &[]);
        let err = command.deliver("x").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_reads_stdin() {
        // `cat` consumes stdin and exits 0, like a clipboard tool.
        let command = ClipboardCommand::new("cat", &[]);
        assert!(command.deliver("https://open.test/album/1").await.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_background_helper_does_not_block_delivery() {
        // Mimics xclip: read the payload, then leave a long-lived child behind.
        let command = ClipboardCommand::new("sh", &["-c", "cat >/dev/null; sleep 5 &"]);

        let started = std::time::Instant::now();
        assert!(command.deliver("https://open.test/album/1").await.is_ok());
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stuck_command_times_out() {
        let command = ClipboardCommand::new("sh", &["-c", "sleep 5"])
            .with_timeout(Duration::from_millis(100));

        let started = std::time::Instant::now();
        let err = command.deliver("x").await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_fails() {
        let command = ClipboardCommand::new("false", &[]);
        assert!(command.deliver("x").await.is_err());
    }
}
