//! Retrying transport on top of an [`HttpBackend`].

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::config::HttpConfig;

use super::{
    is_transient_status, BackendError, HttpBackend, HttpRequest, HttpResponse, RetryPolicy,
    TransportError,
};

/// Wraps every outbound call with a timeout, retry count and backoff policy.
///
/// Each attempt gets its own timeout window. When an overall deadline is
/// configured, attempt timeouts are clamped to the time left and no retry is
/// scheduled past it.
#[derive(Clone)]
pub struct ResilientTransport {
    backend: Arc<dyn HttpBackend>,
    policy: RetryPolicy,
    default_timeout: Duration,
    overall_deadline: Option<Duration>,
}

impl ResilientTransport {
    pub fn new(backend: Arc<dyn HttpBackend>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            default_timeout: super::DEFAULT_TIMEOUT,
            overall_deadline: None,
        }
    }

    /// Build a transport from the `[http]` configuration section.
    pub fn from_config(backend: Arc<dyn HttpBackend>, config: &HttpConfig) -> Self {
        Self::new(backend, RetryPolicy::from(config))
            .with_default_timeout(config.timeout())
            .with_overall_deadline(config.overall_deadline_secs.map(Duration::from_secs))
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_overall_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.overall_deadline = deadline;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Per-attempt timeout applied to requests built by callers.
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Execute a request, retrying transient failures.
    ///
    /// Returns the first 2xx response. A non-retryable status is returned as
    /// [`TransportError::HttpStatus`] immediately; after the last attempt the
    /// last observed cause is returned.
    pub async fn call(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let deadline = self.overall_deadline.map(|d| Instant::now() + d);
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let mut attempt_timeout = request.timeout;
            if let Some(deadline) = deadline {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(TransportError::Timeout {
                        attempts: attempt - 1,
                    });
                }
                attempt_timeout = attempt_timeout.min(remaining);
            }

            debug!(
                url = %request.url,
                attempt,
                max_attempts,
                timeout_ms = attempt_timeout.as_millis() as u64,
                "Sending request"
            );

            let attempt_request = request.clone().timeout(attempt_timeout);
            let outcome = match timeout(attempt_timeout, self.backend.send(&attempt_request)).await
            {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout),
            };

            let (failure, retry_after) = match outcome {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if is_transient_status(response.status) => {
                    let retry_after = response.retry_after;
                    (
                        TransportError::HttpStatus {
                            status: response.status,
                            body: response.body_excerpt(500),
                            attempts: attempt,
                        },
                        retry_after,
                    )
                }
                Ok(response) => {
                    debug!(url = %request.url, status = response.status, "Permanent HTTP failure");
                    return Err(TransportError::HttpStatus {
                        status: response.status,
                        body: response.body_excerpt(500),
                        attempts: attempt,
                    });
                }
                Err(BackendError::InvalidRequest(message)) => {
                    return Err(TransportError::InvalidRequest(message))
                }
                Err(BackendError::Timeout) => (TransportError::Timeout { attempts: attempt }, None),
                Err(BackendError::Connect(message)) | Err(BackendError::Network(message)) => (
                    TransportError::Network {
                        message,
                        attempts: attempt,
                    },
                    None,
                ),
            };

            if attempt >= max_attempts {
                warn!(url = %request.url, attempts = attempt, error = %failure, "Giving up after retries");
                return Err(failure);
            }

            let delay = self.policy.delay_for(attempt, retry_after);
            if let Some(deadline) = deadline {
                if Instant::now() + delay >= deadline {
                    warn!(url = %request.url, attempts = attempt, error = %failure, "Deadline leaves no room for another retry");
                    return Err(failure);
                }
            }

            warn!(
                url = %request.url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Transient failure, retrying"
            );
            sleep(delay).await;
        }
    }

    /// Execute a request and decode its JSON body.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<T, TransportError> {
        let response = self.call(request).await?;
        serde_json::from_str(&response.body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHttpBackend;
    use serde::Deserialize;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            max_delay: Duration::from_millis(5),
        }
    }

    fn transport(backend: &Arc<MockHttpBackend>, max_retries: u32) -> ResilientTransport {
        ResilientTransport::new(backend.clone(), fast_policy(max_retries))
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let backend = Arc::new(MockHttpBackend::new());
        backend.push_response(HttpResponse::ok("{}")).await;

        let response = transport(&backend, 3)
            .call(HttpRequest::get("https://api.test/x"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(backend.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_retries_bounded_by_max_retries() {
        let backend = Arc::new(MockHttpBackend::new());
        backend
            .set_fallback(Err(BackendError::Connect("refused".into())))
            .await;

        let err = transport(&backend, 3)
            .call(HttpRequest::get("https://api.test/x"))
            .await
            .unwrap_err();

        assert_eq!(backend.request_count().await, 4);
        assert!(matches!(err, TransportError::Network { attempts: 4, .. }));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_status() {
        let backend = Arc::new(MockHttpBackend::new());
        backend
            .push_response(HttpResponse::new(503, "unavailable"))
            .await;
        backend.push_response(HttpResponse::new(429, "slow down")).await;
        backend.push_response(HttpResponse::ok("done")).await;

        let response = transport(&backend, 3)
            .call(HttpRequest::get("https://api.test/x"))
            .await
            .unwrap();

        assert_eq!(response.body, "done");
        assert_eq!(backend.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let backend = Arc::new(MockHttpBackend::new());
        backend.set_fallback(Ok(HttpResponse::new(404, "nope"))).await;

        let err = transport(&backend, 3)
            .call(HttpRequest::get("https://api.test/x"))
            .await
            .unwrap_err();

        assert_eq!(backend.request_count().await, 1);
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_exhausted_status_surfaces_last_cause() {
        let backend = Arc::new(MockHttpBackend::new());
        backend.push_response(HttpResponse::new(500, "first")).await;
        backend.push_response(HttpResponse::new(502, "last")).await;

        let err = transport(&backend, 1)
            .call(HttpRequest::get("https://api.test/x"))
            .await
            .unwrap_err();

        match err {
            TransportError::HttpStatus {
                status,
                body,
                attempts,
            } => {
                assert_eq!(status, 502);
                assert_eq!(body, "last");
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attempt_timeout_enforced() {
        let backend = Arc::new(MockHttpBackend::new());
        backend.set_delay(Duration::from_millis(200)).await;
        backend.set_fallback(Ok(HttpResponse::ok("late"))).await;

        let err = transport(&backend, 1)
            .call(HttpRequest::get("https://api.test/x").timeout(Duration::from_millis(20)))
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::Timeout { attempts: 2 });
        assert_eq!(backend.request_count().await, 2);
    }

    #[tokio::test]
    async fn test_overall_deadline_stops_retries() {
        let backend = Arc::new(MockHttpBackend::new());
        backend.set_fallback(Ok(HttpResponse::new(503, "down"))).await;

        let policy = RetryPolicy {
            max_retries: 10,
            initial_delay: Duration::from_millis(40),
            backoff_multiplier: 1.0,
            max_delay: Duration::from_millis(40),
        };
        let transport = ResilientTransport::new(backend.clone(), policy)
            .with_overall_deadline(Some(Duration::from_millis(100)));

        let err = transport
            .call(HttpRequest::get("https://api.test/x"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(backend.request_count().await < 11);
    }

    #[tokio::test]
    async fn test_invalid_request_not_retried() {
        let backend = Arc::new(MockHttpBackend::new());
        backend
            .set_fallback(Err(BackendError::InvalidRequest("bad url".into())))
            .await;

        let err = transport(&backend, 3)
            .call(HttpRequest::get("not a url"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::InvalidRequest(_)));
        assert_eq!(backend.request_count().await, 1);
    }

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: u32,
    }

    #[tokio::test]
    async fn test_call_json_decodes_and_reports_decode_errors() {
        let backend = Arc::new(MockHttpBackend::new());
        backend.push_response(HttpResponse::ok(r#"{"value": 7}"#)).await;
        backend.push_response(HttpResponse::ok("not json")).await;
        let transport = transport(&backend, 0);

        let payload: Payload = transport
            .call_json(HttpRequest::get("https://api.test/x"))
            .await
            .unwrap();
        assert_eq!(payload.value, 7);

        let err = transport
            .call_json::<Payload>(HttpRequest::get("https://api.test/x"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
