use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::correction::{ModelConfig, DEFAULT_TERMINATOR, DEFAULT_USER_TEMPLATE};
use crate::notes::DEFAULT_NOTE_DELIMITER;

/// Application configuration, read from `conf.json`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Completion service config
    #[serde(default)]
    pub service: ServiceConfig,

    /// Text correction settings
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// Note classification settings
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Folder processing settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Completion provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionProvider {
    // @provider: Volcengine ARK (Doubao models, OpenAI-compatible)
    #[default]
    Ark,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl CompletionProvider {
    /// Every supported provider
    pub const ALL: [CompletionProvider; 5] = [
        Self::Ark,
        Self::OpenAI,
        Self::Anthropic,
        Self::Ollama,
        Self::LMStudio,
    ];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ark => "Volcengine ARK",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ark => "ark".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Environment variable consulted when no key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Ark => Some("ARK_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }

    // @returns: Whether requests fail without a key
    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

// Implement Display trait for CompletionProvider
impl std::fmt::Display for CompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for CompletionProvider
impl std::str::FromStr for CompletionProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ark" | "doubao" => Ok(Self::Ark),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name (ARK endpoint id for Doubao)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL or bare host
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: CompletionProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_secs: match provider_type {
                CompletionProvider::Ark => default_ark_timeout_secs(),
                _ => default_timeout_secs(),
            },
        }
    }
}

/// Completion service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: CompletionProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,
}

/// Settings of the chunked correction pipeline
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorrectionConfig {
    /// System instruction, identical for every segment of a run
    #[serde(default = "default_correction_prompt")]
    pub system_prompt: String,

    /// User message template; `{note}` is replaced by the wrapped segment
    #[serde(default = "default_user_template")]
    pub user_template: String,

    /// Maximum segment length in characters
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum output tokens per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sentence terminator used for segmentation
    #[serde(default = "default_terminator")]
    pub terminator: char,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_correction_prompt(),
            user_template: default_user_template(),
            max_length: default_max_length(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            terminator: default_terminator(),
        }
    }
}

/// Settings of note classification
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClassificationConfig {
    /// System prompt listing the allowed categories
    #[serde(default = "default_classification_prompt")]
    pub system_prompt: String,

    /// Separator between notes in the input file
    #[serde(default = "default_note_delimiter")]
    pub note_delimiter: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_classification_prompt(),
            note_delimiter: default_note_delimiter(),
        }
    }
}

/// Settings of folder processing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchConfig {
    /// Skip files whose backup already exists
    #[serde(default = "default_true")]
    pub skip_existing: bool,

    /// Files whose stem contains this marker are ignored
    #[serde(default = "default_exclude_marker")]
    pub exclude_marker: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            skip_existing: true,
            exclude_marker: default_exclude_marker(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_ark_timeout_secs() -> u64 {
    120
}

fn default_max_length() -> usize {
    1500
}

fn default_temperature() -> f32 {
    0.8
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_terminator() -> char {
    DEFAULT_TERMINATOR
}

fn default_user_template() -> String {
    DEFAULT_USER_TEMPLATE.to_string()
}

fn default_note_delimiter() -> String {
    DEFAULT_NOTE_DELIMITER.to_string()
}

fn default_exclude_marker() -> String {
    "_combined".to_string()
}

fn default_true() -> bool {
    true
}

fn default_model(provider: CompletionProvider) -> String {
    match provider {
        CompletionProvider::Ark => "doubao-pro-4k",
        CompletionProvider::OpenAI => "gpt-4o-mini",
        CompletionProvider::Anthropic => "claude-3-haiku-20240307",
        CompletionProvider::Ollama => "qwen2.5:7b",
        // Placeholder; users should set to the loaded model name in LM Studio
        CompletionProvider::LMStudio => "local-model",
    }
    .to_string()
}

fn default_endpoint(provider: CompletionProvider) -> String {
    match provider {
        // North China 2 (Beijing)
        CompletionProvider::Ark => "https://ark.cn-beijing.volces.com/api/v3",
        CompletionProvider::OpenAI => "https://api.openai.com/v1",
        CompletionProvider::Anthropic => "https://api.anthropic.com",
        CompletionProvider::Ollama => "http://localhost:11434",
        CompletionProvider::LMStudio => "http://localhost:1234/v1",
    }
    .to_string()
}

fn default_correction_prompt() -> String {
    "你是一名精通中文的语言专家，请对文本进行语法修正，适当修改词句，按照文章含义合理拆分段落，\
     让整体文章内容更流畅，词句更偏向书面写作风格，但所有修改要求贴合原意，不要做大的改动。\
     请保持markdown格式的图片链接不变。"
        .to_string()
}

fn default_classification_prompt() -> String {
    "你是一名笔记整理大师，学识广博，可以充分理解文本内容，并按要求分类整理；\n\
     可能的类别包括：Github项目、AI产品及服务、AI技术、技术趋势、案例故事及段子、书籍推荐、影视推荐、金句及名人名言、其他；\n\
     文本内容只能归入一个类别，如果出现符合多个类别的情况，则按类别先后顺序归入第一个匹配的类别；\n\
     如果文本信息不足，导致无法判别分类的情况，请归入\"其他\"类别；\n\
     仅使用指定的类别进行分类，不要创建新的类别；\n\
     请只输出类别，不要输出其他内容。"
        .to_string()
}

/// Expand a bare ARK host such as `ark.cn-beijing.volces.com` into its API base URL
pub fn resolve_ark_endpoint(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.trim_end_matches('/').to_string()
    } else {
        format!("https://{}/api/v3", endpoint.trim_matches('/'))
    }
}

impl Config {
    /// Load configuration from `path`, writing a default file when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();

        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let correction = &self.correction;

        if correction.max_length == 0 {
            return Err(anyhow!("correction.max_length must be greater than zero"));
        }

        if !(0.0..=2.0).contains(&correction.temperature) {
            return Err(anyhow!("correction.temperature must be between 0.0 and 2.0, got {}", correction.temperature));
        }

        if correction.max_tokens == 0 {
            return Err(anyhow!("correction.max_tokens must be greater than zero"));
        }

        if !correction.user_template.contains("{note}") {
            return Err(anyhow!("correction.user_template must contain the {{note}} placeholder"));
        }

        if self.classification.note_delimiter.is_empty() {
            return Err(anyhow!("classification.note_delimiter cannot be empty"));
        }

        let endpoint = self.service.get_endpoint();
        Url::parse(&endpoint)
            .with_context(|| format!("Invalid endpoint for {}: {}", self.service.provider.display_name(), endpoint))?;

        if self.service.provider.requires_api_key() && self.service.get_api_key().is_empty() {
            return Err(anyhow!(
                "API key is required for {} provider (set it in the config or {})",
                self.service.provider.display_name(),
                self.service.provider.api_key_env().unwrap_or_default()
            ));
        }

        Ok(())
    }

    /// Model and sampling parameters for requests
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model: self.service.get_model(),
            temperature: self.correction.temperature,
            max_tokens: self.correction.max_tokens,
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            service: ServiceConfig::default(),
            correction: CorrectionConfig::default(),
            classification: ClassificationConfig::default(),
            batch: BatchConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl ServiceConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &CompletionProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, inserted with defaults if absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        // Default fallback based on provider type
        default_model(self.provider)
    }

    /// Get the API key for the active provider, falling back to its environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env()
            .and_then(|name| std::env::var(name).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        let endpoint = self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| default_endpoint(self.provider));

        match self.provider {
            CompletionProvider::Ark => resolve_ark_endpoint(&endpoint),
            _ => endpoint,
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_provider_config() {
            Some(provider_config) if provider_config.timeout_secs > 0 => provider_config.timeout_secs,
            _ => default_timeout_secs(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: CompletionProvider::default(),
            available_providers: CompletionProvider::ALL
                .iter()
                .map(|provider| ProviderConfig::new(*provider))
                .collect(),
        }
    }
}
