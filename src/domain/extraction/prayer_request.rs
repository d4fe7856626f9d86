//! Extracted prayer-request records

use serde::{Deserialize, Serialize};

/// One prayer request extracted from a transcript.
/// Flat string-keyed record; `need` and `details` may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerRequest {
    pub request: String,
    #[serde(default)]
    pub need: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// The structured result of running the extraction instruction over a
/// transcript. An empty request list is the well-formed "nothing found"
/// result as well as the soft-fail fallback.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PrayerExtraction {
    #[serde(default)]
    pub prayer_requests: Vec<PrayerRequest>,
}

impl PrayerExtraction {
    /// The empty extraction
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.prayer_requests.is_empty()
    }
}
