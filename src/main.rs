// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use storychunk::app_config::{self, Config, TokenizerKind};
use storychunk::Controller;

/// CLI Wrapper for TokenizerKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTokenizerKind {
    #[value(alias = "hf")]
    Huggingface,
    Word,
}

impl From<CliTokenizerKind> for TokenizerKind {
    fn from(cli_kind: CliTokenizerKind) -> Self {
        match cli_kind {
            CliTokenizerKind::Huggingface => TokenizerKind::HuggingFace,
            CliTokenizerKind::Word => TokenizerKind::Word,
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

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Chunk every plain-text book in a directory
    Books(ConvertArgs),

    /// Convert every script in a directory into screenplay chunks
    Scripts(ConvertArgs),

    /// Generate shell completions for storychunk
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Directory holding the input files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory the chunk files are written to
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Replace output left by a previous run
    #[arg(short, long)]
    force: bool,

    /// Token budget per chunk
    #[arg(short, long)]
    max_tokens: Option<usize>,

    /// Drop paragraphs longer than the budget instead of splitting them
    #[arg(short, long)]
    exclude: bool,

    /// Tokenizer to count tokens with
    #[arg(short, long, value_enum)]
    tokenizer: Option<CliTokenizerKind>,

    /// Path to a HuggingFace tokenizer.json
    #[arg(long, env = "STORYCHUNK_TOKENIZER")]
    tokenizer_path: Option<String>,

    /// Configuration file path
    #[arg(short, long, visible_alias = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// storychunk - token-bounded chunking for books and game scripts
#[derive(Parser, Debug)]
#[command(name = "storychunk")]
#[command(version)]
#[command(about = "Split books and game scripts into token-bounded chunks")]
#[command(long_about = "storychunk turns plain-text books and UTF-16 game scripts into chunk files that fit a model's context window.

EXAMPLES:
    storychunk books ./books ./chunks                    # Chunk every .txt book
    storychunk books -m 1024 -e ./books ./chunks         # Smaller budget, drop long paragraphs
    storychunk scripts --tokenizer-path model/tokenizer.json ./scenario ./out
    storychunk books -t word ./books ./chunks            # Count words, no model needed
    storychunk scripts -f ./scenario ./out               # Replace existing output
    storychunk completions bash > storychunk.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SCRIPT MAPS:
    Location and character names are collected in ksj_locations.json and
    ksj_names.json. Edit the values to change scene headings and speaker labels
    on the next run.")]
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

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "storychunk", &mut std::io::stdout());
            Ok(())
        }
        Commands::Books(args) => {
            let (controller, force) = prepare(&args)?;
            controller.run_books(&args.input_dir, &args.output_dir, force)?;
            Ok(())
        }
        Commands::Scripts(args) => {
            let (controller, force) = prepare(&args)?;
            controller.run_scripts(&args.input_dir, &args.output_dir, force)?;
            Ok(())
        }
    }
}

// Load the configuration, apply CLI overrides and build the controller
fn prepare(options: &ConvertArgs) -> Result<(Controller, bool)> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, options);

    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    debug!(
        "Using {} tokenizer with a budget of {} tokens",
        config.tokenizer.kind, config.chunking.max_tokens
    );
    info!("Converting {} into {}", options.input_dir.display(), options.output_dir.display());

    let controller = Controller::with_config(config)?;
    Ok((controller, options.force))
}

fn apply_overrides(config: &mut Config, options: &ConvertArgs) {
    if let Some(max_tokens) = options.max_tokens {
        config.chunking.max_tokens = max_tokens;
    }
    if options.exclude {
        config.chunking.exclude_if_too_long = true;
    }
    if let Some(kind) = &options.tokenizer {
        config.tokenizer.kind = kind.clone().into();
    }
    if let Some(path) = &options.tokenizer_path {
        config.tokenizer.path = path.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
