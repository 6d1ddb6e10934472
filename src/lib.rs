/*!
 * # notemend
 *
 * Corrects long Chinese Markdown notes with a chat-completion model.
 *
 * ## Features
 *
 * - Sentence-aware splitting of long documents at `。`
 * - One request per segment, with the text wrapped in `<note>` tags
 * - Ordered reassembly of the corrected segments
 * - Folder mode with `.md.bak` backups
 * - Note classification into a Markdown report
 * - Providers:
 *   - Volcengine ARK (Doubao)
 *   - OpenAI and LM Studio
 *   - Anthropic API
 *   - Ollama (local LLM)
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `correction`: Segmenter, sentinel tags, dispatcher and pipeline
 * - `notes`: Section and note splitting
 * - `classification`: Note classification and reporting
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod classification;
pub mod correction;
pub mod errors;
pub mod file_utils;
pub mod notes;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{BatchSummary, Controller, FileOutcome};
pub use correction::{correct, split_long_text, CorrectionPipeline, ModelConfig};
pub use errors::{CorrectionError, ProviderError};
