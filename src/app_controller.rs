use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{CompletionProvider, Config};
use crate::classification::NoteClassifier;
use crate::correction::{
    CorrectionDispatcher, CorrectionOutcome, CorrectionPipeline, PipelineStage, Segment, Segmenter,
    TokenUsageStats,
};
use crate::file_utils::FileManager;
use crate::notes::{split_notes, split_sections, SECTION_HEADING};
use crate::providers::anthropic::Anthropic;
use crate::providers::ollama::Ollama;
use crate::providers::openai::OpenAI;
use crate::providers::Provider;

// @module: Application controller for note correction and classification

/// Separator between corrected sections in heading mode
pub const SECTION_SEPARATOR: &str = "\n\n";

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Corrected text was written to `output`
    Written { output: PathBuf, segments: usize },
    /// Left untouched because an earlier result exists
    Skipped { reason: String },
}

/// Counts reported at the end of a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Number of files considered
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Folder processing completed: {} files, {} processed, {} skipped, {} errors",
            self.total(), self.processed, self.skipped, self.failed
        )
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Completion backend shared by every request
    provider: Arc<dyn Provider>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = Self::build_provider(&config)?;
        Ok(Self { config, provider })
    }

    /// Create a controller around an existing provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        Self { config, provider }
    }

    /// Instantiate the backend selected in the configuration
    pub fn build_provider(config: &Config) -> Result<Arc<dyn Provider>> {
        let service = &config.service;
        let api_key = service.get_api_key();
        let endpoint = service.get_endpoint();
        let timeout_secs = service.get_timeout_secs();

        let provider: Arc<dyn Provider> = match service.provider {
            CompletionProvider::Ark | CompletionProvider::OpenAI | CompletionProvider::LMStudio => {
                Arc::new(OpenAI::new(service.provider.display_name(), api_key, endpoint, timeout_secs))
            }
            CompletionProvider::Anthropic => Arc::new(Anthropic::new(api_key, endpoint, timeout_secs)),
            CompletionProvider::Ollama => Arc::new(Ollama::new(&endpoint, timeout_secs)),
        };

        Ok(provider)
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Correction pipeline configured from the `correction` section
    pub fn pipeline(&self) -> CorrectionPipeline {
        let correction = &self.config.correction;
        let dispatcher = CorrectionDispatcher::new(
            Arc::clone(&self.provider),
            correction.system_prompt.clone(),
            self.config.model_config(),
        )
        .with_user_template(correction.user_template.clone());

        CorrectionPipeline::new(dispatcher, correction.max_length).with_terminator(correction.terminator)
    }

    /// Check that the backend answers before a long run
    pub async fn test_connection(&self) -> Result<()> {
        let model = self.config.service.get_model();
        self.provider
            .test_connection(&model)
            .await
            .with_context(|| format!("{} is not reachable", self.provider.name()))
    }

    /// Correct a whole text, optionally section by section
    pub async fn correct_text(&self, text: &str, by_heading: bool) -> Result<CorrectionOutcome> {
        let pipeline = self.pipeline();

        if !by_heading {
            let progress_bar = Self::segment_progress_bar();
            let pb = progress_bar.clone();
            let outcome = pipeline
                .correct_with_progress(text, move |stage| {
                    if let PipelineStage::Dispatching { index, total } = stage {
                        pb.set_length(total as u64);
                        pb.set_position(index as u64 - 1);
                    }
                })
                .await;
            progress_bar.finish_and_clear();
            return Ok(outcome?);
        }

        let sections = split_sections(text, SECTION_HEADING);
        let progress_bar = Self::segment_progress_bar();
        progress_bar.set_length(sections.len() as u64);

        let mut corrected = Vec::with_capacity(sections.len());
        let mut usage = TokenUsageStats::with_provider_info(
            self.provider.name().to_string(),
            self.config.service.get_model(),
        );
        let mut segments = 0;
        let mut forced_splits = 0;

        for section in sections.iter().map(|s| s.trim_end_matches('\n')).filter(|s| !s.trim().is_empty()) {
            let outcome = match pipeline.correct_with_progress(section, |_| {}).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    progress_bar.finish_and_clear();
                    return Err(e.into());
                }
            };
            segments += outcome.segments;
            forced_splits += outcome.forced_splits;
            usage.merge(&outcome.usage);
            corrected.push(outcome.text);
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        Ok(CorrectionOutcome {
            text: corrected.join(SECTION_SEPARATOR),
            segments,
            forced_splits,
            usage,
        })
    }

    /// Correct one file and write the result to `output`, or `{stem}_modified.md` next to it
    pub async fn correct_file(
        &self,
        input_file: &Path,
        output: Option<PathBuf>,
        by_heading: bool,
        force_overwrite: bool,
    ) -> Result<FileOutcome> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = output.unwrap_or_else(|| FileManager::modified_output_path(input_file));
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, output already exists (use -f to force overwrite): {}", output_path.display());
            return Ok(FileOutcome::Skipped { reason: "output exists".to_string() });
        }

        let start_time = Instant::now();
        let content = FileManager::read_to_string(input_file)?;
        let outcome = self.correct_text(&content, by_heading).await?;

        FileManager::write_to_file(&output_path, &outcome.text)?;
        self.log_outcome(&outcome, start_time.elapsed());
        info!("Success: {}", output_path.display());

        Ok(FileOutcome::Written { output: output_path, segments: outcome.segments })
    }

    /// Correct a file in place, keeping the original as `.md.bak`
    async fn correct_in_place(&self, input_file: &Path) -> Result<FileOutcome> {
        let backup = FileManager::backup_path(input_file);
        if self.config.batch.skip_existing && backup.exists() {
            return Ok(FileOutcome::Skipped { reason: "backup exists".to_string() });
        }

        let content = FileManager::read_to_string(input_file)?;
        let outcome = self.correct_text(&content, false).await?;
        FileManager::replace_with_backup(input_file, &outcome.text)?;

        Ok(FileOutcome::Written { output: input_file.to_path_buf(), segments: outcome.segments })
    }

    /// Run the workflow in folder mode, processing every Markdown file below `input_dir`
    /// Files that already have a backup are skipped
    pub async fn run_folder(&self, input_dir: &Path) -> Result<BatchSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let files = FileManager::find_markdown_files(input_dir, &self.config.batch.exclude_marker)?;
        if files.is_empty() {
            warn!("No Markdown files found in directory: {:?}", input_dir);
            return Ok(BatchSummary::default());
        }

        let folder_pb = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = BatchSummary::default();

        for file in &files {
            let file_name = file.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.correct_in_place(file).await {
                Ok(FileOutcome::Written { .. }) => summary.processed += 1,
                Ok(FileOutcome::Skipped { reason }) => {
                    info!("Skipping {}: {}", file_name, reason);
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!("{} in {}", summary, Self::format_duration(start_time.elapsed()));

        Ok(summary)
    }

    /// Classify the notes in `input_file` and write an `organized_notes_*.md` report
    pub async fn classify_file(&self, input_file: &Path) -> Result<PathBuf> {
        let content = FileManager::read_to_string(input_file)?;
        let notes = split_notes(&content, &self.config.classification.note_delimiter);
        if notes.is_empty() {
            return Err(anyhow!("No notes found in {:?}", input_file));
        }
        info!("Found {} notes in {}", notes.len(), input_file.display());

        let classifier = NoteClassifier::new(
            Arc::clone(&self.provider),
            self.config.classification.system_prompt.clone(),
            self.config.model_config(),
        );

        let progress_bar = Self::segment_progress_bar();
        progress_bar.set_length(notes.len() as u64);
        let pb = progress_bar.clone();
        let report = classifier
            .classify_all(notes, move |done, _total| pb.set_position(done as u64))
            .await;
        progress_bar.finish_and_clear();
        let report = report?;

        for line in report.statistics_lines() {
            info!("{}", line);
        }

        let output_path = FileManager::organized_notes_path(input_file, chrono::Local::now());
        FileManager::write_to_file(&output_path, &report.render_markdown())?;
        info!("Success: {}", output_path.display());

        Ok(output_path)
    }

    /// Segment `text` without sending anything
    pub fn preview_split<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let correction = &self.config.correction;
        Segmenter::new(text, correction.max_length)
            .with_terminator(correction.terminator)
            .collect()
    }

    fn segment_progress_bar() -> ProgressBar {
        let progress_bar = ProgressBar::new(0);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    fn log_outcome(&self, outcome: &CorrectionOutcome, elapsed: Duration) {
        if outcome.forced_splits > 0 {
            warn!("{} segment(s) had no sentence terminator and were cut mid-sentence", outcome.forced_splits);
        }
        if outcome.usage.total_tokens > 0 {
            info!("🔢 {}", outcome.usage.summary());
        }
        info!("Correction completed in {}.", Self::format_duration(elapsed));
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
