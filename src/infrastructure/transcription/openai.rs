//! OpenAI Whisper transcriber adapter

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{Transcriber, TranscriptionError};
use crate::domain::transcription::{
    AudioData, Segment, TranscribeOptions, Transcript, WordTiming,
};

/// Transcription model to use
const DEFAULT_MODEL: &str = "whisper-1";

/// OpenAI API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";

// Response types for the transcriptions endpoint

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    segments: Option<Vec<SegmentBody>>,
}

#[derive(Debug, Deserialize)]
struct SegmentBody {
    text: String,
    words: Option<Vec<WordBody>>,
}

#[derive(Debug, Deserialize)]
struct WordBody {
    word: String,
    #[serde(default)]
    start: f32,
    #[serde(default)]
    end: f32,
    // Words reported without a confidence score are never flagged
    #[serde(default = "full_confidence")]
    confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

/// Whisper API transcriber
pub struct OpenAiTranscriber {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiTranscriber {
    /// Create a new transcriber with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the transcription model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the API URL
    fn api_url(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url)
    }

    /// Build the multipart upload form.
    /// Field names and values are the endpoint's wire contract.
    fn build_form(
        &self,
        audio: &AudioData,
        options: TranscribeOptions,
    ) -> Result<reqwest::multipart::Form, TranscriptionError> {
        let file_part = reqwest::multipart::Part::bytes(audio.data().to_vec())
            .file_name(audio.upload_filename())
            .mime_str(audio.mime_type().as_str())
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", options.detail.response_format());

        if options.wants_word_timestamps() {
            form = form.text("timestamp_granularities", "word");
        }

        Ok(form)
    }

    /// Convert the response body into the domain transcript
    fn into_transcript(response: TranscriptionResponse) -> Transcript {
        let segments = response
            .segments
            .unwrap_or_default()
            .into_iter()
            .map(|segment| Segment {
                text: segment.text,
                words: segment
                    .words
                    .unwrap_or_default()
                    .into_iter()
                    .map(|w| WordTiming {
                        word: w.word,
                        start: w.start,
                        end: w.end,
                        confidence: w.confidence,
                    })
                    .collect(),
            })
            .collect();

        Transcript {
            text: response.text,
            segments,
        }
    }
}

#[async_trait]
impl Transcriber for OpenAiTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioData,
        options: TranscribeOptions,
    ) -> Result<Transcript, TranscriptionError> {
        let url = self.api_url();
        let form = self.build_form(audio, options)?;

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::debug!("transcription endpoint returned {status}: {body}");
            return Err(TranscriptionError::UploadError {
                status: status.as_u16(),
            });
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::MalformedResponse(e.to_string()))?;

        Ok(Self::into_transcript(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_targets_transcriptions_endpoint() {
        let transcriber = OpenAiTranscriber::new("test-key");
        assert_eq!(
            transcriber.api_url(),
            "https://api.openai.com/v1/audio/transcriptions"
        );
    }

    #[test]
    fn custom_base_url() {
        let transcriber = OpenAiTranscriber::new("key").with_base_url("http://localhost:9000/v1");
        assert_eq!(
            transcriber.api_url(),
            "http://localhost:9000/v1/audio/transcriptions"
        );
    }

    #[test]
    fn into_transcript_maps_segments_and_words() {
        let response = TranscriptionResponse {
            text: "Pray for Alice".to_string(),
            segments: Some(vec![SegmentBody {
                text: "Pray for Alice".to_string(),
                words: Some(vec![WordBody {
                    word: "Alice".to_string(),
                    start: 0.8,
                    end: 1.2,
                    confidence: 0.6,
                }]),
            }]),
        };

        let transcript = OpenAiTranscriber::into_transcript(response);
        assert_eq!(transcript.text, "Pray for Alice");
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(transcript.segments[0].words[0].word, "Alice");
        assert_eq!(transcript.segments[0].words[0].confidence, 0.6);
    }

    #[test]
    fn into_transcript_without_segments() {
        let response = TranscriptionResponse {
            text: "plain text".to_string(),
            segments: None,
        };

        let transcript = OpenAiTranscriber::into_transcript(response);
        assert_eq!(transcript.text, "plain text");
        assert!(transcript.segments.is_empty());
    }

    #[test]
    fn missing_confidence_defaults_to_full() {
        let body: TranscriptionResponse = serde_json::from_str(
            r#"{
                "text": "hello",
                "segments": [{"text": "hello", "words": [{"word": "hello", "start": 0.0, "end": 0.4}]}]
            }"#,
        )
        .unwrap();

        let transcript = OpenAiTranscriber::into_transcript(body);
        assert_eq!(transcript.segments[0].words[0].confidence, 1.0);
        assert!(transcript.problem_words().is_empty());
    }
}
