/*!
 * Note classification.
 *
 * Each note is sent on its own request together with a system prompt that
 * lists the allowed categories; the model answers with the category name.
 * Results are grouped in the order categories first appear.
 */

use std::fmt::Write as _;
use std::sync::Arc;
use log::{debug, info};

use crate::correction::ModelConfig;
use crate::errors::CorrectionError;
use crate::providers::{CompletionRequest, Provider};

/// Fence placed around the note in the user message
pub const NOTE_FENCE: &str = "\n~~~\n";

/// One category and the notes assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBucket {
    /// Category name as returned by the model
    pub name: String,
    /// Notes in input order
    pub notes: Vec<String>,
}

/// Grouped classification results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationReport {
    /// Categories in first-seen order
    pub categories: Vec<CategoryBucket>,
    /// Number of classified notes
    pub total: usize,
}

impl ClassificationReport {
    /// Add a note under `category`
    pub fn push(&mut self, category: &str, note: String) {
        self.total += 1;
        match self.categories.iter_mut().find(|bucket| bucket.name == category) {
            Some(bucket) => bucket.notes.push(note),
            None => self.categories.push(CategoryBucket {
                name: category.to_string(),
                notes: vec![note],
            }),
        }
    }

    /// Share of notes in a bucket, in percent
    pub fn percentage(&self, bucket: &CategoryBucket) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            bucket.notes.len() as f64 / self.total as f64 * 100.0
        }
    }

    /// One line per category: `name: count 条 (pct%)`
    pub fn statistics_lines(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|bucket| format!("{}: {} 条 ({:.1}%)", bucket.name, bucket.notes.len(), self.percentage(bucket)))
            .collect()
    }

    /// Render the report as Markdown
    pub fn render_markdown(&self) -> String {
        let mut content = String::from("# 笔记分类整理\n\n");

        content.push_str("## 统计信息\n");
        let _ = writeln!(content, "- 总笔记数量：{}", self.total);
        for line in self.statistics_lines() {
            let _ = writeln!(content, "- {}", line);
        }
        content.push('\n');

        for bucket in &self.categories {
            let _ = writeln!(content, "## {}", bucket.name);
            for note in &bucket.notes {
                let _ = write!(content, "{}\n\n---\n\n", note);
            }
            content.push('\n');
        }

        content
    }
}

/// Classifies notes one request at a time
#[derive(Debug, Clone)]
pub struct NoteClassifier {
    provider: Arc<dyn Provider>,
    system_prompt: String,
    model: ModelConfig,
}

impl NoteClassifier {
    /// Create a classifier with the category rules in `system_prompt`
    pub fn new(provider: Arc<dyn Provider>, system_prompt: impl Into<String>, model: ModelConfig) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            model,
        }
    }

    /// The user message sent for `note`
    pub fn user_message(note: &str) -> String {
        format!("请判断以下文本的类别：{}{}{}", NOTE_FENCE, note, NOTE_FENCE)
    }

    /// Ask the model for the category of one note. `index` is 1-based.
    pub async fn classify(&self, index: usize, note: &str) -> Result<String, CorrectionError> {
        let request = CompletionRequest {
            model: self.model.model.clone(),
            system: self.system_prompt.clone(),
            user: Self::user_message(note),
            temperature: self.model.temperature,
            max_tokens: self.model.max_tokens,
        };

        let completion = self.provider.complete(request).await
            .map_err(|e| CorrectionError::from_provider(index, e))?;

        let category = completion.text.trim();
        if category.is_empty() {
            return Err(CorrectionError::MalformedResponse {
                segment: index,
                reason: "empty category".to_string(),
            });
        }

        debug!("Note {} classified as {}", index, category);
        Ok(category.to_string())
    }

    /// Classify every note in order and group the results
    pub async fn classify_all(
        &self,
        notes: Vec<String>,
        progress: impl Fn(usize, usize),
    ) -> Result<ClassificationReport, CorrectionError> {
        let total = notes.len();
        let mut report = ClassificationReport::default();

        for (i, note) in notes.into_iter().enumerate() {
            let category = self.classify(i + 1, &note).await?;
            report.push(&category, note);
            progress(i + 1, total);
        }

        info!("Classified {} notes into {} categories", report.total, report.categories.len());
        Ok(report)
    }
}
