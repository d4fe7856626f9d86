//! Voice capture port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::transcription::AudioData;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone permission denied")]
    PermissionDenied,

    #[error("Audio device error: {0}")]
    DeviceError(String),
}

/// Outcome of a microphone permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// Port for microphone capture.
///
/// One recording may be active at a time. `stop` finalizes the active
/// recording into an uploadable audio artifact; stopping when nothing
/// is recording is a device error.
#[async_trait]
pub trait VoiceRecorder: Send + Sync {
    /// Ask the platform for microphone access.
    async fn request_permission(&self) -> Permission;

    /// Open the audio input and begin capturing.
    ///
    /// # Errors
    /// `PermissionDenied` when access was not granted,
    /// `DeviceError` when the input cannot be opened.
    async fn start(&self) -> Result<(), CaptureError>;

    /// Stop capturing and return the finalized audio artifact.
    ///
    /// # Errors
    /// `DeviceError` when no recording is active or the captured
    /// audio cannot be read.
    async fn stop(&self) -> Result<AudioData, CaptureError>;

    /// Check if currently recording
    fn is_recording(&self) -> bool;

    /// Get elapsed recording time in milliseconds
    fn elapsed_ms(&self) -> u64;
}
