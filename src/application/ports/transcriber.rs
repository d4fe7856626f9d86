//! Transcription port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::transcription::{AudioData, TranscribeOptions, Transcript};

/// Transcription errors
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("Transcription service returned HTTP {status}")]
    UploadError { status: u16 },

    #[error("Failed to parse transcription response: {0}")]
    MalformedResponse(String),

    #[error("Transcription request failed: {0}")]
    RequestFailed(String),
}

/// Port for audio transcription.
///
/// One request per call over an already-finalized recording; no retry,
/// no streaming. The detail carried by the returned transcript follows
/// the requested options.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio artifact to text.
    ///
    /// # Arguments
    /// * `audio` - The finalized audio artifact to upload
    /// * `options` - Requested granularity and detail level
    ///
    /// # Returns
    /// The transcript or an error
    async fn transcribe(
        &self,
        audio: &AudioData,
        options: TranscribeOptions,
    ) -> Result<Transcript, TranscriptionError>;
}
