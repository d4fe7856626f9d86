//! Extraction adapters

mod openai;

pub use openai::OpenAiExtractor;
