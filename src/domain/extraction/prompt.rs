//! Extraction prompt value object

/// Fixed system instruction sent with every extraction call. The reply
/// content must be the JSON document this instruction demands; changing
/// the wording changes the wire contract with the model.
const EXTRACTION_INSTRUCTION: &str = r#"You are a helpful assistant that extracts prayer requests from transcribed text.
Your task is to:
1. Identify all explicit prayer requests mentioned in the text.
2. For each request, determine what the person needs prayer about (e.g., healing, guidance, strength).
3. Return the results in JSON format:
{
  "prayer_requests": [
    {
      "request": "...",
      "need": "...",
      "details": "..."
    }
  ]
}
If no explicit prayer requests are found, return: {"prayer_requests": []}"#;

/// Value object wrapping the extraction system instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPrompt {
    content: String,
}

impl ExtractionPrompt {
    /// The standard prayer-request extraction instruction
    pub fn prayer_requests() -> Self {
        Self {
            content: EXTRACTION_INSTRUCTION.to_string(),
        }
    }

    /// Get the instruction content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl Default for ExtractionPrompt {
    fn default() -> Self {
        Self::prayer_requests()
    }
}
