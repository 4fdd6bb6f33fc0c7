//! REST Submission Adapter
//!
//! Posts finished claims to the claims backend and translates HTTP
//! outcomes into `PortError` variants the coordinator can classify.
//!
//! # Error Mapping
//!
//! - 2xx -> `SubmissionReceipt` decoded from `{"referenceNo": "..."}`
//! - 400/422 -> `PortError::Validation`
//! - 401/403 -> `PortError::Unauthorized`
//! - 409 -> `PortError::Conflict`
//! - 429 -> `PortError::RateLimited`
//! - other 4xx -> `PortError::Rejected`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - timeouts -> `PortError::Timeout`
//! - connect failures -> `PortError::Connection`

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client, StatusCode};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use core_kernel::{
    PortError, DomainPort, OperationMetadata,
    HealthCheckable, HealthCheckResult, AdapterHealth,
    CircuitBreakerConfig,
};

use crate::ports::{ClaimSubmission, ClaimSubmissionPort, SubmissionReceipt};

const CORRELATION_HEADER: &str = "x-correlation-id";
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Configuration for the REST submission adapter
#[derive(Debug, Clone)]
pub struct RestSubmissionConfig {
    /// Base URL of the claims API (e.g., "https://claims.example.lk/api")
    pub base_url: String,

    /// Bearer token sent with every request
    pub bearer_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Circuit breaker configuration
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for RestSubmissionConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            bearer_token: None,
            timeout_secs: 30,
            circuit_breaker: Some(CircuitBreakerConfig {
                failure_threshold: 5,
                success_threshold: 1,
                reset_timeout_secs: 60,
            }),
        }
    }
}

/// Circuit breaker state for fault tolerance
#[derive(Debug)]
struct CircuitBreaker {
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    last_failure_time: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            last_failure_time: RwLock::new(None),
        }
    }

    async fn is_available(&self) -> bool {
        if !self.is_open.load(Ordering::Relaxed) {
            return true;
        }

        // Half-open once the reset timeout has elapsed
        let last_failure = self.last_failure_time.read().await;
        match *last_failure {
            Some(time) => time.elapsed() > Duration::from_secs(self.config.reset_timeout_secs),
            None => false,
        }
    }

    fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        let success = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if success >= self.config.success_threshold as u64 {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
        }
    }

    async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold as u64 {
            self.is_open.store(true, Ordering::Relaxed);
            *self.last_failure_time.write().await = Some(Instant::now());
        }
    }
}

/// Claims backend reached over HTTP
///
/// # Example
///
/// ```rust,ignore
/// let adapter = RestSubmissionAdapter::new(RestSubmissionConfig {
///     base_url: "https://claims.example.lk/api".to_string(),
///     bearer_token: Some(token),
///     ..Default::default()
/// })?;
/// let receipt = adapter.submit_claim(&submission, None).await?;
/// ```
#[derive(Debug)]
pub struct RestSubmissionAdapter {
    config: RestSubmissionConfig,
    client: Client,
    circuit_breaker: Option<Arc<CircuitBreaker>>,
}

impl RestSubmissionAdapter {
    /// Creates the adapter and its HTTP client
    ///
    /// # Errors
    ///
    /// `PortError::Internal` if the HTTP client cannot be built
    pub fn new(config: RestSubmissionConfig) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::Internal {
                message: "Failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        let circuit_breaker = config.circuit_breaker.clone()
            .map(|cb| Arc::new(CircuitBreaker::new(cb)));

        Ok(Self {
            config,
            client,
            circuit_breaker,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Full URL claims are posted to
    pub fn submission_url(&self) -> String {
        format!("{}/claims/intimations", self.config.base_url.trim_end_matches('/'))
    }

    /// Checks if the circuit breaker is open (blocking requests)
    pub async fn is_circuit_open(&self) -> bool {
        match self.circuit_breaker {
            Some(ref cb) => !cb.is_available().await,
            None => false,
        }
    }

    async fn post_claim(
        &self,
        submission: &ClaimSubmission,
        metadata: Option<&OperationMetadata>,
    ) -> Result<SubmissionReceipt, PortError> {
        let mut request = self.client.post(self.submission_url()).json(submission);
        if let Some(ref token) = self.config.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(correlation_id) = metadata.and_then(|m| m.correlation_id.as_deref()) {
            request = request.header(CORRELATION_HEADER, correlation_id);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if status.is_success() {
            return response.json::<SubmissionReceipt>().await.map_err(|e| PortError::Transformation {
                message: format!("Unexpected submission response: {}", e),
            });
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, retry_after, body))
    }

    fn transport_error(&self, err: reqwest::Error) -> PortError {
        if err.is_timeout() {
            PortError::Timeout {
                operation: "submit_claim".to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else if err.is_decode() {
            PortError::Transformation {
                message: err.to_string(),
            }
        } else {
            PortError::Connection {
                message: format!("Could not reach claims backend at {}", self.config.base_url),
                source: Some(Box::new(err)),
            }
        }
    }
}

/// Maps a non-success status to a port error
fn status_error(status: StatusCode, retry_after: Option<u64>, body: String) -> PortError {
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_string()
    } else {
        body
    };

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => PortError::validation(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized { message },
        StatusCode::CONFLICT => PortError::Conflict { message },
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        s if s.is_server_error() => PortError::ServiceUnavailable {
            service: format!("claims backend returned {}", s.as_u16()),
        },
        s => PortError::rejected(s.as_u16(), message),
    }
}

impl DomainPort for RestSubmissionAdapter {}

#[async_trait]
impl HealthCheckable for RestSubmissionAdapter {
    /// Calls `{base_url}/health` on the claims backend
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        if self.is_circuit_open().await {
            return HealthCheckResult {
                adapter_id: "rest-submission-adapter".to_string(),
                status: AdapterHealth::Degraded,
                latency_ms: 0,
                message: Some("Circuit breaker is open".to_string()),
                checked_at: Utc::now(),
            };
        }

        let url = format!("{}/health", self.config.base_url.trim_end_matches('/'));
        let (status, message) = match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => (AdapterHealth::Healthy, None),
            Ok(response) => (
                AdapterHealth::Degraded,
                Some(format!("Health endpoint returned {}", response.status())),
            ),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: "rest-submission-adapter".to_string(),
            status,
            latency_ms: start.elapsed().as_millis() as u64,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ClaimSubmissionPort for RestSubmissionAdapter {
    async fn submit_claim(
        &self,
        submission: &ClaimSubmission,
        metadata: Option<OperationMetadata>,
    ) -> Result<SubmissionReceipt, PortError> {
        if self.is_circuit_open().await {
            return Err(PortError::ServiceUnavailable {
                service: "Circuit breaker is open".to_string(),
            });
        }

        debug!(draft_id = %submission.draft_id, url = %self.submission_url(), "Posting claim");
        let result = self.post_claim(submission, metadata.as_ref()).await;

        if let Some(ref cb) = self.circuit_breaker {
            match result {
                Ok(_) => cb.record_success(),
                Err(ref e) if e.is_transient() => {
                    warn!(draft_id = %submission.draft_id, error = %e, "Transient failure from claims backend");
                    cb.record_failure().await;
                }
                Err(_) => {}
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, None, "bad".into()),
            PortError::Validation { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, None, String::new()),
            PortError::Unauthorized { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some(5), String::new()),
            PortError::RateLimited { retry_after_secs: 5 }
        ));
        assert!(status_error(StatusCode::BAD_GATEWAY, None, String::new()).is_transient());
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, None, String::new()),
            PortError::Rejected { status: 404, ref message } if message == "Not Found"
        ));
    }

    #[test]
    fn test_submission_url_ignores_trailing_slash() {
        let adapter = RestSubmissionAdapter::new(RestSubmissionConfig {
            base_url: "http://localhost:9000/api/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(adapter.submission_url(), "http://localhost:9000/api/claims/intimations");
    }

    #[tokio::test]
    async fn test_circuit_opens_after_threshold() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            reset_timeout_secs: 60,
        });

        breaker.record_failure().await;
        assert!(breaker.is_available().await);
        breaker.record_failure().await;
        assert!(!breaker.is_available().await);

        breaker.record_success();
        assert!(breaker.is_available().await);
    }
}
