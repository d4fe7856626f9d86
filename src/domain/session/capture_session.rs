//! Capture session state machine

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::extraction::PrayerExtraction;
use crate::domain::transcription::{ProblemWord, Transcript};

/// Identifier tagging one record-transcribe-extract cycle. Results from
/// network calls carry the id of the session that issued them; results
/// whose id no longer matches the active session are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capture session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Recording,
    Uploading,
    Extracting,
    Complete,
    Failed,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Uploading => "uploading",
            Self::Extracting => "extracting",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

/// Read-only view of a session for the presentation layer
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub transcript: Transcript,
    pub problem_words: Vec<ProblemWord>,
    pub extraction: Option<PrayerExtraction>,
}

/// Capture session entity.
///
/// Owns the results of one record-transcribe-extract cycle and the
/// finite-state status that gates each stage. At most one session is
/// active at a time; starting a new recording resets all prior results
/// and issues a fresh session id.
///
/// State machine:
///   any state  -> RECORDING   (start, clears results)
///   RECORDING  -> UPLOADING   (begin_upload)
///   RECORDING  -> IDLE        (cancel_recording, e.g. failed device start)
///   UPLOADING  -> EXTRACTING  (begin_extraction)
///   UPLOADING  -> COMPLETE    (complete, extraction not configured)
///   EXTRACTING -> COMPLETE    (complete, success or soft-fail)
///   RECORDING | UPLOADING -> FAILED (fail)
///   FAILED     -> IDLE        (acknowledge_failure)
#[derive(Debug)]
pub struct CaptureSession {
    id: SessionId,
    state: SessionState,
    transcript: Transcript,
    problem_words: Vec<ProblemWord>,
    extraction: Option<PrayerExtraction>,
}

impl CaptureSession {
    /// Create a new session in idle state with no results
    pub fn new() -> Self {
        Self {
            id: SessionId::generate(),
            state: SessionState::Idle,
            transcript: Transcript::default(),
            problem_words: Vec::new(),
            extraction: None,
        }
    }

    /// Get the active session id
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Whether the given id still names the active session
    pub fn is_current(&self, id: SessionId) -> bool {
        self.id == id
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// Whether a network stage is in flight
    pub fn is_processing(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uploading | SessionState::Extracting
        )
    }

    /// Start a new recording cycle. Allowed from any state: a start
    /// while a prior cycle is uploading or extracting supersedes it,
    /// and the stale cycle's results are discarded on arrival because
    /// they carry the old id. Clears all prior results and returns the
    /// fresh session id.
    pub fn start(&mut self) -> SessionId {
        self.id = SessionId::generate();
        self.state = SessionState::Recording;
        self.transcript = Transcript::default();
        self.problem_words.clear();
        self.extraction = None;
        self.id
    }

    /// Transition from RECORDING to UPLOADING
    pub fn begin_upload(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Recording {
            return Err(self.invalid("begin upload"));
        }
        self.state = SessionState::Uploading;
        Ok(())
    }

    /// Transition from UPLOADING to EXTRACTING
    pub fn begin_extraction(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Uploading {
            return Err(self.invalid("begin extraction"));
        }
        self.state = SessionState::Extracting;
        Ok(())
    }

    /// Transition from UPLOADING or EXTRACTING to COMPLETE
    pub fn complete(&mut self) -> Result<(), InvalidStateTransition> {
        if !self.is_processing() {
            return Err(self.invalid("complete"));
        }
        self.state = SessionState::Complete;
        Ok(())
    }

    /// Transition from RECORDING or UPLOADING to FAILED. Extraction
    /// never fails a session: its errors are soft and end in COMPLETE.
    pub fn fail(&mut self) -> Result<(), InvalidStateTransition> {
        if !matches!(
            self.state,
            SessionState::Recording | SessionState::Uploading
        ) {
            return Err(self.invalid("fail"));
        }
        self.state = SessionState::Failed;
        Ok(())
    }

    /// Transition from RECORDING back to IDLE without uploading
    /// (capture device failed to start or deliver audio)
    pub fn cancel_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Recording {
            return Err(self.invalid("cancel recording"));
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Transition from FAILED back to IDLE once the user has seen the alert
    pub fn acknowledge_failure(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Failed {
            return Err(self.invalid("acknowledge failure"));
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Store the transcript and derive the problem-word list from it
    pub fn set_transcript(&mut self, transcript: Transcript) {
        self.problem_words = transcript.problem_words();
        self.transcript = transcript;
    }

    /// Store the extraction result
    pub fn set_extraction(&mut self, extraction: PrayerExtraction) {
        self.extraction = Some(extraction);
    }

    /// Immutable snapshot for the presentation layer
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            transcript: self.transcript.clone(),
            problem_words: self.problem_words.clone(),
            extraction: self.extraction.clone(),
        }
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transcription::{Segment, WordTiming};

    fn transcript_with_low_confidence() -> Transcript {
        Transcript {
            text: "Pray for Alice".to_string(),
            segments: vec![Segment {
                text: "Pray for Alice".to_string(),
                words: vec![
                    WordTiming {
                        word: "Pray".to_string(),
                        start: 0.0,
                        end: 0.4,
                        confidence: 0.9,
                    },
                    WordTiming {
                        word: "Alice".to_string(),
                        start: 0.8,
                        end: 1.2,
                        confidence: 0.6,
                    },
                ],
            }],
        }
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = CaptureSession::new();
        assert!(session.is_idle());
        let snapshot = session.snapshot();
        assert!(snapshot.transcript.text.is_empty());
        assert!(snapshot.problem_words.is_empty());
        assert!(snapshot.extraction.is_none());
    }

    #[test]
    fn start_enters_recording_with_fresh_id() {
        let mut session = CaptureSession::new();
        let before = session.id();
        let id = session.start();
        assert!(session.is_recording());
        assert_ne!(id, before);
        assert!(session.is_current(id));
    }

    #[test]
    fn full_cycle_with_extraction() {
        let mut session = CaptureSession::new();
        session.start();
        session.begin_upload().unwrap();
        session.set_transcript(transcript_with_low_confidence());
        session.begin_extraction().unwrap();
        session.set_extraction(PrayerExtraction::empty());
        session.complete().unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Complete);
        assert_eq!(snapshot.transcript.text, "Pray for Alice");
        assert_eq!(snapshot.problem_words.len(), 1);
        assert_eq!(snapshot.problem_words[0].word, "Alice");
        assert!(snapshot.extraction.is_some());
    }

    #[test]
    fn full_cycle_without_extraction() {
        let mut session = CaptureSession::new();
        session.start();
        session.begin_upload().unwrap();
        session.set_transcript(Transcript::plain("hello"));
        session.complete().unwrap();
        assert_eq!(session.state(), SessionState::Complete);
        assert!(session.snapshot().extraction.is_none());
    }

    #[test]
    fn restart_clears_prior_results() {
        let mut session = CaptureSession::new();
        session.start();
        session.begin_upload().unwrap();
        session.set_transcript(transcript_with_low_confidence());
        session.set_extraction(PrayerExtraction::empty());

        // New recording while the prior cycle is still uploading
        session.start();
        assert!(session.is_recording());
        let snapshot = session.snapshot();
        assert!(snapshot.transcript.text.is_empty());
        assert!(snapshot.problem_words.is_empty());
        assert!(snapshot.extraction.is_none());
    }

    #[test]
    fn restart_invalidates_prior_id() {
        let mut session = CaptureSession::new();
        let first = session.start();
        let second = session.start();
        assert!(!session.is_current(first));
        assert!(session.is_current(second));
    }

    #[test]
    fn begin_upload_requires_recording() {
        let mut session = CaptureSession::new();
        let err = session.begin_upload().unwrap_err();
        assert_eq!(err.current_state, SessionState::Idle);
        assert!(err.action.contains("begin upload"));
    }

    #[test]
    fn begin_upload_twice_fails() {
        let mut session = CaptureSession::new();
        session.start();
        session.begin_upload().unwrap();
        assert!(session.begin_upload().is_err());
    }

    #[test]
    fn fail_from_uploading() {
        let mut session = CaptureSession::new();
        session.start();
        session.begin_upload().unwrap();
        session.fail().unwrap();
        assert_eq!(session.state(), SessionState::Failed);
    }

    #[test]
    fn fail_from_extracting_is_invalid() {
        let mut session = CaptureSession::new();
        session.start();
        session.begin_upload().unwrap();
        session.begin_extraction().unwrap();
        assert!(session.fail().is_err());
    }

    #[test]
    fn extracting_completes_even_after_soft_fail() {
        let mut session = CaptureSession::new();
        session.start();
        session.begin_upload().unwrap();
        session.begin_extraction().unwrap();
        session.set_extraction(PrayerExtraction::empty());
        session.complete().unwrap();
        assert_eq!(session.state(), SessionState::Complete);
    }

    #[test]
    fn acknowledge_failure_returns_to_idle() {
        let mut session = CaptureSession::new();
        session.start();
        session.fail().unwrap();
        session.acknowledge_failure().unwrap();
        assert!(session.is_idle());
    }

    #[test]
    fn acknowledge_failure_requires_failed() {
        let mut session = CaptureSession::new();
        assert!(session.acknowledge_failure().is_err());
    }

    #[test]
    fn cancel_recording_returns_to_idle() {
        let mut session = CaptureSession::new();
        session.start();
        session.cancel_recording().unwrap();
        assert!(session.is_idle());
    }

    #[test]
    fn complete_requires_processing() {
        let mut session = CaptureSession::new();
        session.start();
        assert!(session.complete().is_err());
    }

    #[test]
    fn is_processing_covers_network_stages() {
        let mut session = CaptureSession::new();
        session.start();
        assert!(!session.is_processing());
        session.begin_upload().unwrap();
        assert!(session.is_processing());
        session.begin_extraction().unwrap();
        assert!(session.is_processing());
        session.complete().unwrap();
        assert!(!session.is_processing());
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Uploading.to_string(), "uploading");
        assert_eq!(SessionState::Extracting.to_string(), "extracting");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: SessionState::Complete,
            action: "begin upload".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("begin upload"));
        assert!(msg.contains("complete"));
    }
}
