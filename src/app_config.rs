use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Token budget settings
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Tokenizer selection
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    /// Prose input settings
    #[serde(default)]
    pub books: BookConfig,

    /// Script input settings
    #[serde(default)]
    pub scripts: ScriptConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Token budget configuration shared by both pipelines
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Ceiling on tokens per chunk; should be the training length minus the prompt length
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Drop paragraphs longer than the budget instead of splitting them
    #[serde(default)]
    pub exclude_if_too_long: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            exclude_if_too_long: false,
        }
    }
}

/// Tokenizer implementation type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    // @tokenizer: HuggingFace tokenizer.json model
    #[default]
    #[serde(alias = "hf")]
    HuggingFace,
    // @tokenizer: Built-in model-free word tokenizer, counts words rather than subwords
    Word,
}

impl TokenizerKind {
    // @returns: Lowercase identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::HuggingFace => "huggingface".to_string(),
            Self::Word => "word".to_string(),
        }
    }
}

impl std::fmt::Display for TokenizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TokenizerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "word" => Ok(Self::Word),
            _ => Err(anyhow!("Invalid tokenizer type: {}", s)),
        }
    }
}

/// Tokenizer configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenizerConfig {
    // @field: Tokenizer type
    #[serde(default)]
    pub kind: TokenizerKind,

    // @field: Path to tokenizer.json, used by the huggingface kind
    #[serde(default = "default_tokenizer_path")]
    pub path: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            kind: TokenizerKind::default(),
            path: default_tokenizer_path(),
        }
    }
}

/// Prose input configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookConfig {
    /// Extension of book files in the input folder
    #[serde(default = "default_book_extension")]
    pub extension: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            extension: default_book_extension(),
        }
    }
}

/// Script input configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptConfig {
    /// Extension of script files in the input folder
    #[serde(default = "default_script_extension")]
    pub extension: String,

    /// Persisted location map
    #[serde(default = "default_locations_path")]
    pub locations_path: String,

    /// Persisted character name map
    #[serde(default = "default_names_path")]
    pub names_path: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            extension: default_script_extension(),
            locations_path: default_locations_path(),
            names_path: default_names_path(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
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
    /// Matching filter for the log facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_max_tokens() -> usize {
    1700
}

fn default_tokenizer_path() -> String {
    "tokenizer.json".to_string()
}

fn default_book_extension() -> String {
    "txt".to_string()
}

fn default_script_extension() -> String {
    "ks".to_string()
}

fn default_locations_path() -> String {
    "ksj_locations.json".to_string()
}

fn default_names_path() -> String {
    "ksj_names.json".to_string()
}

impl Config {
    /// Load a configuration file, writing a default one when it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        log::warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_tokens < 2 {
            return Err(anyhow!(
                "max_tokens must be at least 2, got {}",
                self.chunking.max_tokens
            ));
        }

        if self.tokenizer.kind == TokenizerKind::HuggingFace && self.tokenizer.path.trim().is_empty() {
            return Err(anyhow!("A tokenizer path is required for the huggingface tokenizer"));
        }

        if self.books.extension.trim().is_empty() || self.scripts.extension.trim().is_empty() {
            return Err(anyhow!("Input file extensions must not be empty"));
        }

        Ok(())
    }
}
