//! Recording adapters

mod cpal_recorder;
mod file;
mod wav_encoder;

pub use cpal_recorder::CpalRecorder;
pub use file::load_audio_file;
pub use wav_encoder::{encode_wav, TARGET_SAMPLE_RATE};
