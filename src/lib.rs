//! WitnessScribe - voice prayer-request capture and transcription
//!
//! This crate records a spoken prayer request from the microphone,
//! uploads it to a speech-to-text API, flags low-confidence words for
//! pronunciation practice, and optionally extracts structured prayer
//! requests from the transcript via a text-generation API.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core business logic, value objects, entities, and errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, OpenAI API, etc.)
//! - **CLI**: Command-line interface and argument parsing

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
