/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::echo()` - Answers with the `<note>` block of the user message
 * - `MockProvider::indexed()` - Echoes with the request number prepended
 * - `MockProvider::fail_on(n)` - Fails on the n-th request only
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::correction::sentinel::SentinelTags;
use crate::errors::ProviderError;
use super::{Completion, CompletionRequest, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns the sentinel-wrapped part of the user message, tags included
    Echo,
    /// Returns the text between the sentinel tags without the tags
    EchoUnwrapped,
    /// Like `Echo`, with `[n]` prepended inside the tags (n is 1-based)
    Indexed,
    /// Fails on the given 1-based request number and echoes otherwise
    FailOn { request: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty text
    Empty,
}

/// Mock provider for testing correction behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Echo the wrapped segment back, tags included
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Echo the segment back without tags
    pub fn echo_unwrapped() -> Self {
        Self::new(MockBehavior::EchoUnwrapped)
    }

    /// Echo with a request index marker
    pub fn indexed() -> Self {
        Self::new(MockBehavior::Indexed)
    }

    /// Fail on the n-th request (1-based)
    pub fn fail_on(request: usize) -> Self {
        Self::new(MockBehavior::FailOn { request })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator, used instead of echoing
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the received requests
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// The `<note>…</note>` part of a user message, or the whole message
    fn wrapped_part(user: &str) -> &str {
        let tags = SentinelTags::default();
        match user.find(tags.open()) {
            Some(start) => &user[start..],
            None => user,
        }
    }

    fn echo_text(&self, request: &CompletionRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::wrapped_part(&request.user).to_string(),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let number = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().push(request.clone());

        let text = match self.behavior {
            MockBehavior::Echo => self.echo_text(&request),

            MockBehavior::EchoUnwrapped => {
                let echoed = self.echo_text(&request);
                SentinelTags::default().strip(&echoed).to_string()
            }

            MockBehavior::Indexed => {
                let tags = SentinelTags::default();
                let echoed = self.echo_text(&request);
                tags.wrap(&format!("[{}]{}", number, tags.strip(&echoed)))
            }

            MockBehavior::FailOn { request: failing } => {
                if number == failing {
                    return Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated failure (request #{})", number),
                    });
                }
                self.echo_text(&request)
            }

            MockBehavior::Failing => {
                return Err(ProviderError::ConnectionError("Simulated provider failure".to_string()));
            }

            MockBehavior::Empty => String::new(),
        };

        Ok(Completion {
            prompt_tokens: Some(request.user.chars().count() as u64),
            completion_tokens: Some(text.chars().count() as u64),
            text,
        })
    }

    async fn test_connection(&self, _model: &str) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated provider failure".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
