// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};

use subgen::app_config::{Config, LogLevel, TranslationProvider};
use subgen::app_controller::Controller;

/// Separators accepted between target languages: `fr,de`, `fr de`, `fr; de`
static LANGUAGE_LIST_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[,;\s]+").unwrap()
});

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "deepl")]
    DeepL,
    Anthropic,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::DeepL => TranslationProvider::DeepL,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
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
    /// Transcribe an audio file into a JSON transcript
    Transcribe(TranscribeArgs),

    /// Generate WebVTT subtitles, optionally translated into other languages
    #[command(alias = "subs")]
    Subtitles(SubtitlesArgs),

    /// Generate shell completions for subgen
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Input audio file (or directory for `subtitles`)
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory, defaults to the input file's directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Spoken language code (e.g., 'en', 'es'), detected when omitted
    #[arg(short, long)]
    source_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct TranscribeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Also write the cue list built with the configured style
    #[arg(long)]
    cues: bool,
}

#[derive(Args, Debug)]
struct SubtitlesArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Target languages, comma separated (e.g., 'fr,de,pt-BR')
    #[arg(short, long)]
    target_languages: Option<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for LLM translation
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum characters per subtitle line
    #[arg(long)]
    max_line_width: Option<usize>,

    /// Maximum lines per cue
    #[arg(long)]
    max_line_count: Option<usize>,

    /// Mark each word with its spoken time
    #[arg(long)]
    highlight_words: bool,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// subgen - subtitle generation from speech
#[derive(Parser, Debug)]
#[command(name = "subgen")]
#[command(version)]
#[command(about = "Speech to WebVTT subtitles, with parallel translation")]
#[command(long_about = "subgen transcribes audio with a Whisper-compatible server, lays the
transcript out as WebVTT cues and translates the track into any number of languages.

EXAMPLES:
    subgen transcribe talk.mp3                    # Write talk.transcript.json
    subgen transcribe --cues talk.mp3             # Also write talk.cues.json
    subgen subtitles talk.mp3                     # Write talk.<lang>.vtt
    subgen subtitles -t fr,de talk.mp3            # Add French and German tracks
    subgen subtitles --max-line-width 32 --highlight-words talk.mp3
    subgen subtitles -t es /recordings/           # Process a whole directory
    subgen completions bash > subgen.bash         # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
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
            let (emoji, colour) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace lets every record through; the effective level is set once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subgen", &mut std::io::stdout());
            Ok(())
        }
        Commands::Transcribe(args) => run_transcribe(args).await,
        Commands::Subtitles(args) => run_subtitles(args).await,
    }
}

async fn run_transcribe(args: TranscribeArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;
    // Transcripts never need a translation provider
    config.target_languages.clear();
    config.validate().context("Configuration validation failed")?;

    let input_path = args.common.input_path.clone();
    if !input_path.is_file() {
        return Err(anyhow!("Input file does not exist: {:?}", input_path));
    }

    let output_dir = output_dir_for(&args.common);
    let controller = Controller::with_config(config)?;
    controller.transcribe(input_path, output_dir, args.cues).await?;
    Ok(())
}

async fn run_subtitles(args: SubtitlesArgs) -> Result<()> {
    let mut config = load_config(&args.common)?;

    if let Some(languages) = &args.target_languages {
        config.target_languages = parse_language_list(languages);
    }

    if let Some(provider) = &args.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &args.model {
        let provider_str = config.translation.provider.to_lowercase_string();
        if let Some(provider_config) = config.translation.available_providers.iter_mut()
            .find(|p| p.provider_type == provider_str) {
            provider_config.model = model.clone();
        }
    }

    config.style = Controller::style_with_overrides(
        config.style,
        args.max_line_width,
        args.max_line_count,
        args.highlight_words,
    );

    config.validate().context("Configuration validation failed")?;

    let input_path = args.common.input_path.clone();
    let controller = Controller::with_config(config)?;
    controller.preflight().await?;

    if input_path.is_file() {
        let summary = controller.run(input_path, output_dir_for(&args.common), args.force_overwrite).await?;
        if !summary.failed.is_empty() {
            warn!(
                "{} of {} translations failed",
                summary.failed.len(),
                controller.config().target_languages.len()
            );
        }
    } else if input_path.is_dir() {
        controller.run_folder(input_path, args.force_overwrite).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}

/// Load or create the configuration and apply the shared CLI overrides
fn load_config(args: &CommonArgs) -> Result<Config> {
    if let Some(level) = &args.log_level {
        log::set_max_level(level_filter(&level.clone().into()));
    }

    if !Path::new(&args.config_path).exists() {
        warn!("Config file not found at '{}', creating default config.", args.config_path);
    }
    let mut config = Config::load_or_create(&args.config_path)?;

    if let Some(source_language) = &args.source_language {
        config.source_language = Some(source_language.clone());
    }

    match &args.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(level_filter(&config.log_level)),
    }

    info!("Using configuration from {}", args.config_path);
    Ok(config)
}

fn output_dir_for(args: &CommonArgs) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        args.input_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

fn parse_language_list(languages: &str) -> Vec<String> {
    LANGUAGE_LIST_SEPARATOR
        .split(languages.trim())
        .filter(|language| !language.is_empty())
        .map(str::to_string)
        .collect()
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}
