//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::recording::Duration;
use crate::domain::transcription::{Granularity, ResponseDetail, TranscribeOptions};

/// WitnessScribe - voice prayer-request capture and transcription
#[derive(Parser, Debug)]
#[command(name = "witness-scribe")]
#[command(version)]
#[command(about = "Record a prayer request, transcribe it, and extract structured requests")]
#[command(long_about = None)]
pub struct Cli {
    /// Skip prayer-request extraction after transcription
    #[arg(long)]
    pub no_extract: bool,

    /// Timestamp granularity for the transcription
    #[arg(short = 'g', long, value_name = "GRANULARITY")]
    pub granularity: Option<GranularityArg>,

    /// Response detail level for the transcription
    #[arg(long, value_name = "DETAIL")]
    pub detail: Option<DetailArg>,

    /// Transcription model identifier
    #[arg(long, value_name = "MODEL")]
    pub transcribe_model: Option<String>,

    /// Extraction model identifier
    #[arg(long, value_name = "MODEL")]
    pub extract_model: Option<String>,

    /// Max recording duration before capture auto-stops (e.g., 30s, 2m)
    #[arg(long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Transcribe an already-recorded audio file
    File {
        /// Path to the audio file (wav, mp4/m4a, mp3, ogg, webm, flac)
        path: PathBuf,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Granularity argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum GranularityArg {
    Word,
    None,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Word => Granularity::Word,
            GranularityArg::None => Granularity::None,
        }
    }
}

/// Detail argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DetailArg {
    Plain,
    Verbose,
}

impl From<DetailArg> for ResponseDetail {
    fn from(arg: DetailArg) -> Self {
        match arg {
            DetailArg::Plain => ResponseDetail::Plain,
            DetailArg::Verbose => ResponseDetail::Verbose,
        }
    }
}

/// Parsed capture options
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub options: TranscribeOptions,
    pub extract: bool,
    pub notify: bool,
    pub max_duration: Duration,
    pub transcribe_model: String,
    pub extract_model: String,
    pub api_base_url: Option<String>,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "api_base_url",
    "transcribe_model",
    "extract_model",
    "extract",
    "granularity",
    "detail",
    "notify",
    "max_duration",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
