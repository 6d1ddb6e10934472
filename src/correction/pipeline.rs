/*!
 * Chunked correction of a whole document.
 *
 * Short documents go out as one request. Longer ones are segmented, each
 * segment is dispatched in order, and the corrected pieces are joined with a
 * newline. The first failure aborts the run and nothing partial is returned.
 */

use std::sync::Arc;
use std::time::Instant;
use log::{debug, info};

use crate::errors::CorrectionError;
use crate::providers::Provider;
use super::dispatcher::{CorrectionDispatcher, ModelConfig};
use super::segmenter::{Segment, Segmenter, DEFAULT_TERMINATOR};
use super::usage::TokenUsageStats;

/// Separator placed between corrected segments
pub const SEGMENT_SEPARATOR: &str = "\n";

/// Progress of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    NotStarted,
    Segmenting,
    /// Dispatching segment `index` (1-based) of `total`
    Dispatching { index: usize, total: usize },
    Joined,
    Done,
}

/// Result of a successful run
#[derive(Debug, Clone)]
pub struct CorrectionOutcome {
    /// The corrected document
    pub text: String,
    /// Number of requests sent
    pub segments: usize,
    /// Segments cut without a terminator
    pub forced_splits: usize,
    /// Token usage reported by the provider
    pub usage: TokenUsageStats,
}

/// Splits, dispatches and reassembles documents
#[derive(Debug, Clone)]
pub struct CorrectionPipeline {
    dispatcher: CorrectionDispatcher,
    max_length: usize,
    terminator: char,
}

impl CorrectionPipeline {
    /// Create a pipeline around a dispatcher
    pub fn new(dispatcher: CorrectionDispatcher, max_length: usize) -> Self {
        Self {
            dispatcher,
            max_length,
            terminator: DEFAULT_TERMINATOR,
        }
    }

    /// Use a different sentence terminator for segmentation
    pub fn with_terminator(mut self, terminator: char) -> Self {
        self.terminator = terminator;
        self
    }

    /// Maximum segment length in characters
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Correct `document` and return the corrected text
    pub async fn correct(&self, document: &str) -> Result<String, CorrectionError> {
        self.correct_with_progress(document, |_| {}).await.map(|outcome| outcome.text)
    }

    /// Correct `document`, reporting every stage change to `progress`
    pub async fn correct_with_progress(
        &self,
        document: &str,
        progress: impl Fn(PipelineStage),
    ) -> Result<CorrectionOutcome, CorrectionError> {
        if self.max_length == 0 {
            return Err(CorrectionError::InvalidConfig("max_length must be greater than zero".to_string()));
        }

        let mut usage = TokenUsageStats::with_provider_info(
            self.dispatcher.provider_name().to_string(),
            self.dispatcher.model().model.clone(),
        );

        progress(PipelineStage::NotStarted);

        if document.is_empty() {
            progress(PipelineStage::Done);
            return Ok(CorrectionOutcome { text: String::new(), segments: 0, forced_splits: 0, usage });
        }

        let segments: Vec<Segment<'_>> = if document.chars().count() <= self.max_length {
            vec![Segment { index: 1, text: document, forced: false }]
        } else {
            progress(PipelineStage::Segmenting);
            Segmenter::new(document, self.max_length)
                .with_terminator(self.terminator)
                .collect()
        };

        let total = segments.len();
        let forced_splits = segments.iter().filter(|s| s.forced).count();
        if total > 1 {
            info!("Document split into {} segments ({} forced)", total, forced_splits);
        }

        let mut corrected = Vec::with_capacity(total);
        for segment in &segments {
            let stage = PipelineStage::Dispatching { index: segment.index, total };
            debug!("{:?}", stage);
            progress(stage);

            let start_time = Instant::now();
            let completion = self.dispatcher.dispatch(segment.index, segment.text).await?;
            usage.record(completion.prompt_tokens, completion.completion_tokens, start_time.elapsed());

            corrected.push(completion.text);
        }

        let text = corrected.join(SEGMENT_SEPARATOR);
        progress(PipelineStage::Joined);
        progress(PipelineStage::Done);

        Ok(CorrectionOutcome { text, segments: total, forced_splits, usage })
    }
}

/// Correct `document` with `provider` in one call
pub async fn correct(
    document: &str,
    system_instruction: &str,
    provider: Arc<dyn Provider>,
    model_config: ModelConfig,
    max_length: usize,
) -> Result<String, CorrectionError> {
    let dispatcher = CorrectionDispatcher::new(provider, system_instruction, model_config);
    CorrectionPipeline::new(dispatcher, max_length).correct(document).await
}
