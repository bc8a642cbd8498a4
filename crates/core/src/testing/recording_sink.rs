//! Output sink that records payloads.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::output::{DeliveryError, OutputSink};

/// Clones share their recordings.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    name: String,
    fail: bool,
    delivered: Arc<RwLock<Vec<String>>>,
    attempts: Arc<RwLock<usize>>,
}

impl RecordingSink {
    /// A sink that accepts everything.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            delivered: Arc::new(RwLock::new(Vec::new())),
            attempts: Arc::new(RwLock::new(0)),
        }
    }

    /// A sink that rejects everything.
    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub async fn delivered(&self) -> Vec<String> {
        self.delivered.read().await.clone()
    }

    pub async fn attempts(&self) -> usize {
        *self.attempts.read().await
    }
}

#[async_trait]
impl OutputSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, payload: &str) -> Result<(), DeliveryError> {
        *self.attempts.write().await += 1;
        if self.fail {
            return Err(DeliveryError::failed(&self.name, "simulated failure"));
        }
        self.delivered.write().await.push(payload.to_string());
        Ok(())
    }
}
