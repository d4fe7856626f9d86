//! Transcript value objects and the problem-word policy

/// Confidence below which a transcribed word is flagged for
/// pronunciation practice. Fixed policy constant, not configurable.
pub const PROBLEM_WORD_THRESHOLD: f32 = 0.85;

/// A single transcribed word with provider-reported timing and confidence
#[derive(Debug, Clone, PartialEq)]
pub struct WordTiming {
    pub word: String,
    /// Offset from the start of the recording, in seconds
    pub start: f32,
    pub end: f32,
    /// Provider confidence in [0, 1]. Words the provider reports without
    /// a confidence score carry 1.0 and are never flagged.
    pub confidence: f32,
}

/// A contiguous span of transcribed speech
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segment {
    pub text: String,
    pub words: Vec<WordTiming>,
}

/// A word flagged for pronunciation review, annotated with the
/// sentence it appeared in. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemWord {
    pub word: String,
    pub start: f32,
    pub end: f32,
    pub confidence: f32,
    pub context_sentence: String,
}

/// Result of one transcription call: the full text plus optional
/// segment/word detail when verbose output was requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Create a plain transcript with no segment detail
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            segments: Vec::new(),
        }
    }

    /// Collect every word whose confidence falls below the problem-word
    /// threshold, in transcript order, each annotated with its segment
    /// text as the context sentence. A word at exactly the threshold is
    /// not flagged.
    pub fn problem_words(&self) -> Vec<ProblemWord> {
        let mut flagged = Vec::new();

        for segment in &self.segments {
            for word in &segment.words {
                if word.confidence < PROBLEM_WORD_THRESHOLD {
                    flagged.push(ProblemWord {
                        word: word.word.clone(),
                        start: word.start,
                        end: word.end,
                        confidence: word.confidence,
                        context_sentence: segment.text.clone(),
                    });
                }
            }
        }

        flagged
    }

    /// Whether this transcript carries word-level detail
    pub fn has_word_detail(&self) -> bool {
        self.segments.iter().any(|s| !s.words.is_empty())
    }
}
