/*!
 * Chunked text correction through a chat-completion provider.
 *
 * - `segmenter`: sentence-aware splitting of long documents
 * - `sentinel`: `<note>` wrapping and unwrapping
 * - `dispatcher`: one provider request per segment
 * - `pipeline`: ordered dispatch and reassembly
 * - `usage`: token accounting for a run
 */

// Re-export main types for easier usage
pub use self::dispatcher::{CorrectionDispatcher, ModelConfig, DEFAULT_USER_TEMPLATE};
pub use self::pipeline::{correct, CorrectionOutcome, CorrectionPipeline, PipelineStage};
pub use self::segmenter::{split_long_text, Segment, Segmenter, DEFAULT_TERMINATOR};
pub use self::sentinel::{SentinelTags, TaggedContent};
pub use self::usage::TokenUsageStats;

// Submodules
pub mod dispatcher;
pub mod pipeline;
pub mod segmenter;
pub mod sentinel;
pub mod usage;
