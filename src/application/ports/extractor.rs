//! Prayer-request extraction port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::extraction::PrayerExtraction;

/// Extraction errors.
///
/// Every variant is soft: the orchestrator logs it and substitutes an
/// empty extraction instead of failing the session.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("Extraction service returned HTTP {status}")]
    ApiError { status: u16 },

    #[error("Failed to parse extraction response: {0}")]
    MalformedResponse(String),

    #[error("Extraction request failed: {0}")]
    RequestFailed(String),
}

/// Port for structured prayer-request extraction
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Run the extraction instruction over a transcript.
    ///
    /// Adapters decode the service reply strictly; a reply whose
    /// content is not the expected JSON yields an EMPTY extraction,
    /// not an error.
    async fn extract(&self, transcript: &str) -> Result<PrayerExtraction, ExtractionError>;
}
