//! Core LLM client trait, errors and a mock implementation

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{CompletionRequest, CompletionResponse};

/// Stateless LLM client - each call is independent (fresh context)
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model used when the request does not name one
    fn model(&self) -> &str;

    /// Whether the client is configured well enough to make calls
    fn is_ready(&self) -> bool;
}

/// Errors that can occur during LLM operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },
}

impl LlmError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            LlmError::InvalidResponse(_) => false,
            LlmError::JsonError(_) => false,
            LlmError::MissingApiKey { .. } => false,
        }
    }
}

/// Canned-response client for tests and dry runs.
///
/// Responses are served from a queue; once the queue is drained the last
/// response keeps being returned. Every request is recorded.
#[derive(Debug)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    /// Create a mock that answers with an empty string
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful text response
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(Ok(content.into()));
        self
    }

    /// Queue several successful responses in order
    pub fn with_responses(self, contents: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for content in contents {
            self.push(Ok(content.into()));
        }
        self
    }

    /// Queue an API failure
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    /// Requests seen so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of completed calls
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn push(&self, response: Result<String, String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    fn next_response(&self) -> Result<String, String> {
        let queued = self.responses.lock().ok().and_then(|mut q| q.pop_front());
        let mut last = match self.last.lock() {
            Ok(last) => last,
            Err(poisoned) => poisoned.into_inner(),
        };
        match queued {
            Some(response) => {
                *last = Some(response.clone());
                response
            }
            None => last.clone().unwrap_or_else(|| Ok(String::new())),
        }
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        match self.next_response() {
            Ok(content) => Ok(CompletionResponse::text(content)),
            Err(message) => Err(LlmError::ApiError { status: 500, message }),
        }
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_is_retryable() {
        assert!(
            LlmError::RateLimited {
                retry_after: Duration::from_secs(60)
            }
            .is_retryable()
        );

        assert!(
            LlmError::ApiError {
                status: 500,
                message: "Internal error".to_string()
            }
            .is_retryable()
        );

        assert!(
            !LlmError::ApiError {
                status: 400,
                message: "Bad request".to_string()
            }
            .is_retryable()
        );

        assert!(!LlmError::InvalidResponse("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_rate_limit_detection() {
        let err = LlmError::RateLimited {
            retry_after: Duration::from_secs(1),
        };
        assert!(err.is_rate_limit());
        assert!(!LlmError::InvalidResponse("x".into()).is_rate_limit());
    }

    #[tokio::test]
    async fn test_mock_serves_queue_then_repeats_last() {
        let mock = MockLlmClient::new().with_responses(["first", "second"]);

        let r1 = mock.complete(CompletionRequest::new("s")).await.unwrap();
        let r2 = mock.complete(CompletionRequest::new("s")).await.unwrap();
        let r3 = mock.complete(CompletionRequest::new("s")).await.unwrap();

        assert_eq!(r1.content, "first");
        assert_eq!(r2.content, "second");
        assert_eq!(r3.content, "second");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_error() {
        let mock = MockLlmClient::new().with_error("service unavailable");
        let err = mock.complete(CompletionRequest::new("s")).await.unwrap_err();
        assert!(matches!(err, LlmError::ApiError { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let mock = MockLlmClient::new().with_response("ok");
        mock.complete(CompletionRequest::new("system").with_user_message("hello"))
            .await
            .unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, "system");
        assert_eq!(requests[0].messages[0].content, "hello");
    }

    #[test]
    fn test_mock_identity() {
        let mock = MockLlmClient::default();
        assert!(mock.is_ready());
        assert_eq!(mock.model(), "mock-model");
    }
}
