//! Transcription request options

use std::fmt;
use std::str::FromStr;

use crate::domain::error::{InvalidDetailError, InvalidGranularityError};

/// Timestamp granularity requested from the transcription service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// Per-word timing and confidence
    #[default]
    Word,
    /// No timestamp detail
    None,
}

impl Granularity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::None => "none",
        }
    }
}

impl FromStr for Granularity {
    type Err = InvalidGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "word" => Ok(Self::Word),
            "none" => Ok(Self::None),
            _ => Err(InvalidGranularityError { input: s.to_string() }),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response detail level requested from the transcription service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseDetail {
    /// Full text only
    Plain,
    /// Segment and word metadata alongside the text
    #[default]
    Verbose,
}

impl ResponseDetail {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Verbose => "verbose",
        }
    }

    /// The `response_format` value sent on the wire
    pub const fn response_format(&self) -> &'static str {
        match self {
            Self::Plain => "json",
            Self::Verbose => "verbose_json",
        }
    }
}

impl FromStr for ResponseDetail {
    type Err = InvalidDetailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "verbose" => Ok(Self::Verbose),
            _ => Err(InvalidDetailError { input: s.to_string() }),
        }
    }
}

impl fmt::Display for ResponseDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for a single transcription call.
/// Word detail only arrives when verbose detail is paired with word
/// granularity; plain detail yields text only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TranscribeOptions {
    pub granularity: Granularity,
    pub detail: ResponseDetail,
}

impl TranscribeOptions {
    /// Options for per-word timing and confidence
    pub const fn verbose_words() -> Self {
        Self {
            granularity: Granularity::Word,
            detail: ResponseDetail::Verbose,
        }
    }

    /// Options for text-only transcription
    pub const fn plain() -> Self {
        Self {
            granularity: Granularity::None,
            detail: ResponseDetail::Plain,
        }
    }

    /// Whether the request should ask for word timestamps
    pub const fn wants_word_timestamps(&self) -> bool {
        matches!(self.granularity, Granularity::Word)
    }
}
