/*!
 * Sends one segment to the provider and unwraps the reply.
 */

use std::sync::Arc;
use std::time::Instant;
use log::{debug, error};

use crate::errors::CorrectionError;
use crate::providers::{Completion, CompletionRequest, Provider};
use super::sentinel::{SentinelTags, TaggedContent};

/// Placeholder replaced by the wrapped segment in the user template
pub const NOTE_PLACEHOLDER: &str = "{note}";

/// Default user message: "the text to refine is inside the xml tags:"
pub const DEFAULT_USER_TEMPLATE: &str = "待优化文本包含在xml标签中：{note}";

/// Model identifier and sampling parameters for one run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// Model name or endpoint id
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens per request
    pub max_tokens: u32,
}

impl ModelConfig {
    /// Model config with the default sampling parameters
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.8,
            max_tokens: 2048,
        }
    }
}

/// Dispatches segments to a provider, one request per segment
#[derive(Debug, Clone)]
pub struct CorrectionDispatcher {
    provider: Arc<dyn Provider>,
    system_instruction: String,
    model: ModelConfig,
    user_template: String,
    tags: SentinelTags,
}

impl CorrectionDispatcher {
    /// Create a dispatcher with the default user template and `<note>` tags
    pub fn new(provider: Arc<dyn Provider>, system_instruction: impl Into<String>, model: ModelConfig) -> Self {
        Self {
            provider,
            system_instruction: system_instruction.into(),
            model,
            user_template: DEFAULT_USER_TEMPLATE.to_string(),
            tags: SentinelTags::default(),
        }
    }

    /// Replace the user message template; `{note}` marks the wrapped segment
    pub fn with_user_template(mut self, template: impl Into<String>) -> Self {
        self.user_template = template.into();
        self
    }

    /// Model parameters used for every request
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// The user message sent for `text`
    pub fn user_message(&self, text: &str) -> String {
        let wrapped = self.tags.wrap(text);
        if self.user_template.contains(NOTE_PLACEHOLDER) {
            self.user_template.replace(NOTE_PLACEHOLDER, &wrapped)
        } else {
            format!("{}{}", self.user_template, wrapped)
        }
    }

    /// Correct one segment.
    ///
    /// `index` is the 1-based segment number used in errors and logs. The
    /// returned completion text has the sentinel wrapper removed when present.
    pub async fn dispatch(&self, index: usize, text: &str) -> Result<Completion, CorrectionError> {
        let request = CompletionRequest {
            model: self.model.model.clone(),
            system: self.system_instruction.clone(),
            user: self.user_message(text),
            temperature: self.model.temperature,
            max_tokens: self.model.max_tokens,
        };

        let start_time = Instant::now();
        let completion = self.provider.complete(request).await.map_err(|e| {
            error!("{} request for segment {} failed: {}", self.provider.name(), index, e);
            CorrectionError::from_provider(index, e)
        })?;
        debug!("Segment {} answered in {:?}", index, start_time.elapsed());

        if completion.text.trim().is_empty() {
            return Err(CorrectionError::MalformedResponse {
                segment: index,
                reason: "empty completion".to_string(),
            });
        }

        let text = match self.tags.parse(&completion.text) {
            TaggedContent::Matched(inner) => inner.to_string(),
            TaggedContent::Unmatched(_) => completion.text.clone(),
            TaggedContent::Malformed(_) => {
                debug!("Segment {} reply has only one sentinel tag, keeping it verbatim", index);
                completion.text.clone()
            }
        };

        Ok(Completion { text, ..completion })
    }
}
