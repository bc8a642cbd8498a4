//! Mock HTTP backend for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::http::{BackendError, HttpBackend, HttpRequest, HttpResponse};

type Outcome = Result<HttpResponse, BackendError>;

/// Produces a response from the request, or `None` to fall through.
type RequestHandler = Box<dyn Fn(&HttpRequest) -> Option<Outcome> + Send + Sync>;

/// Mock implementation of the HttpBackend trait.
///
/// Responses are chosen in this order:
/// 1. the request handler, if set and it returns `Some`
/// 2. the first route whose pattern is contained in the URL
/// 3. the next queued response
/// 4. the fallback
/// 5. `404 no mock response`
///
/// Every request is recorded before the configured delay is applied, so
/// requests abandoned by a timeout still count.
///
/// # Example
///
/// ```rust,ignore
/// use albumlink_core::testing::{MockHttpBackend, fixtures};
///
/// let backend = Arc::new(MockHttpBackend::new());
/// backend
///     .route("/api/token", Ok(HttpResponse::ok(fixtures::token_json("tok", 3600))))
///     .await;
/// backend.push_response(HttpResponse::new(503, "busy")).await;
///
/// // ... exercise the code under test ...
///
/// assert_eq!(backend.requests_matching("/search").await.len(), 2);
/// ```
pub struct MockHttpBackend {
    requests: Arc<RwLock<Vec<HttpRequest>>>,
    queue: Arc<RwLock<VecDeque<Outcome>>>,
    routes: Arc<RwLock<Vec<(String, Outcome)>>>,
    fallback: Arc<RwLock<Option<Outcome>>>,
    handler: Arc<RwLock<Option<RequestHandler>>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl std::fmt::Debug for MockHttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpBackend")
            .field("requests", &"<requests>")
            .field("queue", &"<queue>")
            .field("routes", &"<routes>")
            .field("fallback", &"<fallback>")
            .field("handler", &"<handler>")
            .field("delay", &"<delay>")
            .finish()
    }
}

impl Default for MockHttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHttpBackend {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            queue: Arc::new(RwLock::new(VecDeque::new())),
            routes: Arc::new(RwLock::new(Vec::new())),
            fallback: Arc::new(RwLock::new(None)),
            handler: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    /// Queue a response for the next unrouted request.
    pub async fn push_response(&self, response: HttpResponse) {
        self.queue.write().await.push_back(Ok(response));
    }

    /// Queue a failure for the next unrouted request.
    pub async fn push_error(&self, error: BackendError) {
        self.queue.write().await.push_back(Err(error));
    }

    /// Answer every request whose URL contains `pattern`.
    pub async fn route(&self, pattern: &str, outcome: Outcome) {
        self.routes.write().await.push((pattern.to_string(), outcome));
    }

    /// Answer used once the queue is empty.
    pub async fn set_fallback(&self, outcome: Outcome) {
        *self.fallback.write().await = Some(outcome);
    }

    /// Compute responses from the request itself.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&HttpRequest) -> Option<Outcome> + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Box::new(handler));
    }

    /// Delay every response.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    /// All recorded requests, oldest first.
    pub async fn requests(&self) -> Vec<HttpRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Recorded requests whose URL contains `pattern`.
    pub async fn requests_matching(&self, pattern: &str) -> Vec<HttpRequest> {
        self.requests
            .read()
            .await
            .iter()
            .filter(|r| r.url.contains(pattern))
            .cloned()
            .collect()
    }

    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }

    async fn outcome_for(&self, request: &HttpRequest) -> Outcome {
        if let Some(handler) = self.handler.read().await.as_ref() {
            if let Some(outcome) = handler(request) {
                return outcome;
            }
        }

        if let Some((_, outcome)) = self
            .routes
            .read()
            .await
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern.as_str()))
        {
            return outcome.clone();
        }

        if let Some(outcome) = self.queue.write().await.pop_front() {
            return outcome;
        }

        self.fallback
            .read()
            .await
            .clone()
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "no mock response")))
    }
}

#[async_trait]
impl HttpBackend for MockHttpBackend {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, BackendError> {
        self.requests.write().await.push(request.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.outcome_for(request).await
    }
}
