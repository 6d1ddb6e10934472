// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use notemend::app_config::{CompletionProvider, Config, LogLevel};
use notemend::{Controller, FileOutcome};

/// CLI Wrapper for CompletionProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Ark,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliProvider> for CompletionProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Ark => CompletionProvider::Ark,
            CliProvider::OpenAI => CompletionProvider::OpenAI,
            CliProvider::Anthropic => CompletionProvider::Anthropic,
            CliProvider::Ollama => CompletionProvider::Ollama,
            CliProvider::LMStudio => CompletionProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Correct one Markdown file (use `-` to read stdin and write stdout)
    Correct {
        /// Input file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Correct each `## ` section separately
        #[arg(long)]
        by_heading: bool,

        /// Output file (default: {stem}_modified.md next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force overwrite of an existing output file
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Correct every Markdown file below a directory in place, keeping .md.bak backups
    Batch {
        /// Directory to process recursively
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },

    /// Classify the notes in a file and write an organized_notes report
    Classify {
        /// Notes file, with notes separated by the configured delimiter
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show how a file would be segmented, without sending anything
    Split {
        /// Input file (use `-` for stdin)
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Generate shell completions for notemend
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct GlobalOptions {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Completion provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliProvider>,

    /// Model name (ARK endpoint id for Doubao)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Maximum output tokens per request
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Maximum segment length in characters
    #[arg(long, global = true)]
    max_length: Option<usize>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// notemend - chunked correction of Chinese Markdown notes with LLMs
///
/// Long documents are split at sentence terminators, each segment is
/// corrected on its own request, and the results are joined in order.
#[derive(Parser, Debug)]
#[command(name = "notemend")]
#[command(version)]
#[command(about = "Chunked LLM correction of Markdown notes")]
#[command(long_about = "notemend corrects long Markdown notes with chat-completion models.

EXAMPLES:
    notemend correct notes.md                   # Writes notes_modified.md
    notemend correct --by-heading notes.md      # Correct each ## section separately
    cat notes.md | notemend correct -           # Read stdin, write stdout
    notemend batch ~/notes/                     # Correct a folder in place (.md.bak backups)
    notemend classify dump.md                   # Write organized_notes_<timestamp>.md
    notemend split --max-length 500 notes.md    # Preview segmentation offline
    notemend completions bash > notemend.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ark       - Volcengine ARK, Doubao models (requires ARK_API_KEY)
    openai    - OpenAI API (requires OPENAI_API_KEY)
    anthropic - Anthropic Claude API (requires ANTHROPIC_API_KEY)
    ollama    - Local Ollama server
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(log_level) = &cli.global.log_level {
        log::set_max_level(LogLevel::from(log_level.clone()).to_level_filter());
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "notemend", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.global)?;
    if cli.global.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    match cli.command {
        Commands::Correct { input, by_heading, output, force_overwrite } => {
            config.validate().context("Configuration validation failed")?;
            let controller = Controller::with_config(config)?;
            run_correct(&controller, &input, output, by_heading, force_overwrite).await
        }
        Commands::Batch { dir } => {
            config.validate().context("Configuration validation failed")?;
            let controller = Controller::with_config(config)?;
            controller.test_connection().await?;
            let summary = controller.run_folder(&dir).await?;
            println!("{}", summary);
            Ok(())
        }
        Commands::Classify { file } => {
            config.validate().context("Configuration validation failed")?;
            let controller = Controller::with_config(config)?;
            let output = controller.classify_file(&file).await?;
            println!("{}", output.display());
            Ok(())
        }
        Commands::Split { input } => {
            let controller = Controller::with_config(config)?;
            let text = read_input(&input)?;
            for segment in controller.preview_split(&text) {
                println!(
                    "[{}] {} chars{}",
                    segment.index,
                    segment.char_len(),
                    if segment.forced { " (forced)" } else { "" }
                );
            }
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load conf.json and apply command line overrides
fn load_config(options: &GlobalOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config)?;

    if let Some(provider) = &options.provider {
        config.service.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.service.active_provider_config_mut().model = model.clone();
    }

    if let Some(temperature) = options.temperature {
        config.correction.temperature = temperature;
    }

    if let Some(max_tokens) = options.max_tokens {
        config.correction.max_tokens = max_tokens;
    }

    if let Some(max_length) = options.max_length {
        config.correction.max_length = max_length;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(input: &Path) -> Result<String> {
    if is_stdio(input) {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        Ok(text)
    } else {
        notemend::file_utils::FileManager::read_to_string(input)
    }
}

async fn run_correct(
    controller: &Controller,
    input: &Path,
    output: Option<PathBuf>,
    by_heading: bool,
    force_overwrite: bool,
) -> Result<()> {
    if !is_stdio(input) {
        return match controller.correct_file(input, output, by_heading, force_overwrite).await? {
            FileOutcome::Written { output, segments } => {
                info!("{} segment(s) corrected", segments);
                println!("{}", output.display());
                Ok(())
            }
            FileOutcome::Skipped { .. } => Ok(()),
        };
    }

    let text = read_input(input)?;
    let outcome = controller.correct_text(&text, by_heading).await?;

    match output {
        Some(path) => {
            if path.exists() && !force_overwrite {
                return Err(anyhow!("Output file already exists: {:?}. Use -f to force overwrite.", path));
            }
            notemend::file_utils::FileManager::write_to_file(&path, &outcome.text)?;
            info!("Success: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(outcome.text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
