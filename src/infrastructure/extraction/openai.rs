//! OpenAI chat-completions extractor adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{ExtractionError, Extractor};
use crate::domain::extraction::{ExtractionPrompt, PrayerExtraction};

use super::super::transcription::DEFAULT_API_BASE_URL;

/// Extraction model to use
const DEFAULT_MODEL: &str = "gpt-4";

// Request types for the chat completions endpoint

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

// Response types for the chat completions endpoint

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// Chat-completions prayer-request extractor.
///
/// The model is instructed to answer with a JSON document; the reply's
/// `choices[0].message.content` is decoded as that document. A reply
/// that is missing or not valid JSON yields an empty extraction rather
/// than an error.
pub struct OpenAiExtractor {
    api_key: String,
    model: String,
    base_url: String,
    prompt: ExtractionPrompt,
    client: reqwest::Client,
}

impl OpenAiExtractor {
    /// Create a new extractor with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            prompt: ExtractionPrompt::prayer_requests(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the extraction model
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
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the request body
    fn build_request(&self, transcript: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.prompt.content().to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: transcript.to_string(),
                },
            ],
        }
    }

    /// Strict decode of the nested JSON content string. Failures are
    /// soft: logged, then mapped to the empty extraction.
    fn decode_content(content: Option<&str>) -> PrayerExtraction {
        let Some(content) = content else {
            log::warn!("extraction reply carried no content, returning empty result");
            return PrayerExtraction::empty();
        };

        match serde_json::from_str(content) {
            Ok(extraction) => extraction,
            Err(e) => {
                log::warn!("could not parse extraction reply as JSON ({e}), returning empty result");
                PrayerExtraction::empty()
            }
        }
    }
}

#[async_trait]
impl Extractor for OpenAiExtractor {
    async fn extract(&self, transcript: &str) -> Result<PrayerExtraction, ExtractionError> {
        let url = self.api_url();
        let body = self.build_request(transcript);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::ApiError {
                status: status.as_u16(),
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref());

        Ok(Self::decode_content(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_targets_chat_completions() {
        let extractor = OpenAiExtractor::new("test-key");
        assert_eq!(
            extractor.api_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn build_request_has_system_then_user_message() {
        let extractor = OpenAiExtractor::new("key");
        let request = extractor.build_request("Please pray for my family");

        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert!(request.messages[0].content.contains("prayer requests"));
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(request.messages[1].content, "Please pray for my family");
    }

    #[test]
    fn decode_valid_content() {
        let content = r#"{"prayer_requests": [{"request": "Healing", "need": "health"}]}"#;
        let extraction = OpenAiExtractor::decode_content(Some(content));
        assert_eq!(extraction.prayer_requests.len(), 1);
        assert_eq!(extraction.prayer_requests[0].request, "Healing");
    }

    #[test]
    fn decode_invalid_content_is_empty() {
        let extraction = OpenAiExtractor::decode_content(Some("I could not find any requests"));
        assert!(extraction.is_empty());
    }

    #[test]
    fn decode_missing_content_is_empty() {
        let extraction = OpenAiExtractor::decode_content(None);
        assert!(extraction.is_empty());
    }

    #[test]
    fn custom_model() {
        let extractor = OpenAiExtractor::new("key").with_model("gpt-4o-mini");
        let request = extractor.build_request("text");
        assert_eq!(request.model, "gpt-4o-mini");
    }
}
