//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like cpal and the OpenAI API.

pub mod config;
pub mod extraction;
pub mod notification;
pub mod recording;
pub mod transcription;

// Re-export adapters
pub use config::XdgConfigStore;
pub use extraction::OpenAiExtractor;
pub use notification::{create_notifier, NoOpNotifier, NotifyRustNotifier};
pub use recording::{load_audio_file, CpalRecorder};
pub use transcription::{OpenAiTranscriber, DEFAULT_API_BASE_URL};
