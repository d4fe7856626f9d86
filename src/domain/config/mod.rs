//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, DEFAULT_EXTRACT_MODEL, DEFAULT_TRANSCRIBE_MODEL};
