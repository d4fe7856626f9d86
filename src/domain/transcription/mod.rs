//! Transcription domain module

mod audio_data;
mod options;
mod transcript;

pub use audio_data::{AudioData, AudioMimeType};
pub use options::{Granularity, ResponseDetail, TranscribeOptions};
pub use transcript::{
    ProblemWord, Segment, Transcript, WordTiming, PROBLEM_WORD_THRESHOLD,
};
