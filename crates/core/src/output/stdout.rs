use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{DeliveryError, OutputSink};

/// Writes the payload to standard output, newline terminated.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

#[async_trait]
impl OutputSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        let mut stdout = tokio::io::stdout();
        let mut text = payload.to_string();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        stdout
            .write_all(text.as_bytes())
            .await
            .map_err(|e| DeliveryError::failed("stdout", e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| DeliveryError::failed("stdout", e.to_string()))
    }
}
