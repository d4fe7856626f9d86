//! Load already-recorded audio files for the file pipeline

use std::path::Path;

use tokio::fs;

use crate::application::ports::CaptureError;
use crate::domain::transcription::{AudioData, AudioMimeType};

/// Read an audio file from disk into an uploadable artifact.
/// The MIME type is inferred from the file extension.
pub async fn load_audio_file(path: impl AsRef<Path>) -> Result<AudioData, CaptureError> {
    let path = path.as_ref();

    let mime_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(AudioMimeType::from_extension)
        .ok_or_else(|| {
            CaptureError::DeviceError(format!(
                "Unsupported audio file type: {}",
                path.display()
            ))
        })?;

    let data = fs::read(path)
        .await
        .map_err(|e| CaptureError::DeviceError(format!("Failed to read {}: {}", path.display(), e)))?;

    if data.is_empty() {
        return Err(CaptureError::DeviceError(format!(
            "Audio file is empty: {}",
            path.display()
        )));
    }

    Ok(AudioData::new(data, mime_type))
}
