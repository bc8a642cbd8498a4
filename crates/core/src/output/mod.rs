//! Delivering a selection to the user.
//!
//! Sinks are tried in order by a [`DeliveryChain`]; the first one that
//! succeeds wins. Delivery failures never fail a resolution, the caller just
//! falls back to printing.

mod clipboard;
mod listing;
mod stdout;

pub use clipboard::ClipboardCommand;
pub use listing::{render_listing, ListFormat, LISTING_HEADER};
pub use stdout::StdoutSink;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::selector::Selection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("{sink}: {message}")]
    Failed { sink: String, message: String },

    #[error("no output sink configured")]
    NoSinks,

    #[error("all output sinks failed: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    AllFailed(Vec<DeliveryError>),
}

impl DeliveryError {
    pub fn failed(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            sink: sink.into(),
            message: message.into(),
        }
    }
}

/// Somewhere a payload can be written.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    async fn deliver(&self, payload: &str) -> Result<(), DeliveryError>;
}

/// Text written for a selection: one URL per line.
pub fn selection_payload(selection: &Selection) -> String {
    selection.urls().join("\n")
}

/// Ordered fallback list of sinks.
#[derive(Default)]
pub struct DeliveryChain {
    sinks: Vec<Box<dyn OutputSink>>,
}

impl DeliveryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard commands appropriate for the current platform.
    pub fn clipboard() -> Self {
        let mut chain = Self::new();
        for command in ClipboardCommand::platform_defaults() {
            chain = chain.with_sink(command);
        }
        chain
    }

    pub fn with_sink(mut self, sink: impl OutputSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver `selection`; returns the name of the sink that took it.
    pub async fn deliver(&self, selection: &Selection) -> Result<String, DeliveryError> {
        self.deliver_text(&selection_payload(selection)).await
    }

    pub async fn deliver_text(&self, payload: &str) -> Result<String, DeliveryError> {
        if self.sinks.is_empty() {
            return Err(DeliveryError::NoSinks);
        }

        let mut failures = Vec::new();
        for sink in &self.sinks {
            match sink.deliver(payload).await {
                Ok(()) => {
                    debug!(sink = sink.name(), "Delivered selection");
                    return Ok(sink.name().to_string());
                }
                Err(e) => {
                    debug!(sink = sink.name(), error = %e, "Sink failed, trying next");
                    failures.push(e);
                }
            }
        }

        warn!(attempted = failures.len(), "Every output sink failed");
        Err(DeliveryError::AllFailed(failures))
    }
}
