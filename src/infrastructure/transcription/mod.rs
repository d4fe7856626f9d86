//! Transcription adapters

mod openai;

pub use openai::{OpenAiTranscriber, DEFAULT_API_BASE_URL};
