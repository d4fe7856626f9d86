//! Witness capture use case
//!
//! Sequences microphone capture, transcription upload, and optional
//! prayer-request extraction over one capture session. Stages run
//! strictly in order; each network call is tagged with the session id
//! it belongs to, and a result arriving for a superseded session is
//! discarded instead of applied.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::extraction::PrayerExtraction;
use crate::domain::session::{CaptureSession, InvalidStateTransition, SessionId, SessionSnapshot, SessionState};
use crate::domain::transcription::{AudioData, TranscribeOptions};

use super::ports::{
    CaptureError, Extractor, NotificationIcon, Notifier, Permission, Transcriber,
    TranscriptionError, VoiceRecorder,
};

/// Errors from the capture use case
#[derive(Debug, Error)]
pub enum CaptureWorkflowError {
    #[error("Recording failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Invalid state transition: {0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Missing API key. Set OPENAI_API_KEY or configure via 'witness-scribe config set api_key <key>'")]
    MissingApiKey,
}

/// Configuration for the capture use case
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Transcription granularity and detail level
    pub options: TranscribeOptions,
    /// Whether to run prayer-request extraction after transcription
    pub extract: bool,
    /// Whether to show desktop notifications
    pub notify: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            options: TranscribeOptions::default(),
            extract: true,
            notify: false,
        }
    }
}

/// Capture-transcribe-extract use case
pub struct WitnessCaptureUseCase<R, T, E, N>
where
    R: VoiceRecorder,
    T: Transcriber,
    E: Extractor,
    N: Notifier,
{
    recorder: R,
    transcriber: T,
    extractor: E,
    notifier: N,
    session: Arc<Mutex<CaptureSession>>,
    config: CaptureConfig,
}

impl<R, T, E, N> WitnessCaptureUseCase<R, T, E, N>
where
    R: VoiceRecorder,
    T: Transcriber,
    E: Extractor,
    N: Notifier,
{
    /// Create a new use case instance
    pub fn new(recorder: R, transcriber: T, extractor: E, notifier: N, config: CaptureConfig) -> Self {
        Self {
            recorder,
            transcriber,
            extractor,
            notifier,
            session: Arc::new(Mutex::new(CaptureSession::new())),
            config,
        }
    }

    /// Get current session state
    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Immutable snapshot of the active session
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Get elapsed recording time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.recorder.elapsed_ms()
    }

    /// Start a new recording cycle. Clears any prior session's results
    /// before the microphone opens; a failed start alerts the user and
    /// returns the session to idle.
    pub async fn start(&self) -> Result<SessionId, CaptureWorkflowError> {
        let id = {
            let mut session = self.session.lock().await;
            session.start()
        };
        log::debug!("session {id}: recording");

        if self.recorder.request_permission().await == Permission::Denied {
            self.abandon_recording(id).await;
            self.alert("Microphone permission needed").await;
            return Err(CaptureError::PermissionDenied.into());
        }

        if let Err(e) = self.recorder.start().await {
            self.abandon_recording(id).await;
            self.alert("Failed to start recording").await;
            return Err(e.into());
        }

        if self.config.notify {
            let _ = self
                .notifier
                .notify("WitnessScribe", "Recording...", NotificationIcon::Recording)
                .await;
        }

        Ok(id)
    }

    /// Stop the active recording and run it through transcription and
    /// (when configured) extraction. A second stop without an
    /// intervening start is a no-op: the current snapshot is returned
    /// and nothing is uploaded.
    pub async fn stop_and_process(&self) -> Result<SessionSnapshot, CaptureWorkflowError> {
        let id = {
            let session = self.session.lock().await;
            if !session.is_recording() {
                log::debug!("stop ignored: no active recording");
                return Ok(session.snapshot());
            }
            session.id()
        };

        let audio = match self.recorder.stop().await {
            Ok(audio) => audio,
            Err(e) => {
                let mut session = self.session.lock().await;
                if session.is_current(id) && session.is_recording() {
                    session.fail()?;
                }
                self.alert("Failed to stop recording").await;
                return Err(e.into());
            }
        };

        {
            let mut session = self.session.lock().await;
            if !session.is_current(id) {
                log::debug!("session {id}: superseded before upload, audio discarded");
                return Ok(session.snapshot());
            }
            session.begin_upload()?;
        }

        self.process(id, audio).await
    }

    /// Run an already-finalized audio artifact through the pipeline
    /// (file mode). Uses a fresh session like a recorded capture.
    pub async fn process_audio(&self, audio: AudioData) -> Result<SessionSnapshot, CaptureWorkflowError> {
        let id = {
            let mut session = self.session.lock().await;
            let id = session.start();
            session.begin_upload()?;
            id
        };

        self.process(id, audio).await
    }

    /// Acknowledge a failure alert, returning the session to idle
    pub async fn acknowledge_failure(&self) -> Result<(), CaptureWorkflowError> {
        let mut session = self.session.lock().await;
        session.acknowledge_failure()?;
        Ok(())
    }

    /// Upload the audio, then extract. Every mutation re-checks that
    /// `id` still names the active session so a superseded cycle's
    /// results are dropped on the floor.
    async fn process(&self, id: SessionId, audio: AudioData) -> Result<SessionSnapshot, CaptureWorkflowError> {
        log::debug!(
            "session {id}: uploading {} of audio",
            audio.human_readable_size()
        );

        if self.config.notify {
            let _ = self
                .notifier
                .notify("WitnessScribe", "Transcribing...", NotificationIcon::Processing)
                .await;
        }

        let transcript = match self.transcriber.transcribe(&audio, self.config.options).await {
            Ok(transcript) => transcript,
            Err(e) => {
                {
                    let mut session = self.session.lock().await;
                    if session.is_current(id) {
                        session.fail()?;
                    } else {
                        log::debug!("session {id}: superseded, upload error discarded");
                        return Ok(session.snapshot());
                    }
                }
                self.alert("Failed to transcribe audio").await;
                return Err(e.into());
            }
        };

        let text = transcript.text.clone();
        {
            let mut session = self.session.lock().await;
            if !session.is_current(id) {
                log::debug!("session {id}: superseded, transcript discarded");
                return Ok(session.snapshot());
            }
            session.set_transcript(transcript);
            if self.config.extract {
                session.begin_extraction()?;
            } else {
                session.complete()?;
            }
        }

        if self.config.extract {
            // Extraction failures are soft: log and fall back to an
            // empty result, the session still completes.
            let extraction = match self.extractor.extract(&text).await {
                Ok(extraction) => extraction,
                Err(e) => {
                    log::warn!("session {id}: extraction failed, continuing without: {e}");
                    PrayerExtraction::empty()
                }
            };

            let mut session = self.session.lock().await;
            if !session.is_current(id) {
                log::debug!("session {id}: superseded, extraction discarded");
                return Ok(session.snapshot());
            }
            session.set_extraction(extraction);
            session.complete()?;
        }

        if self.config.notify {
            let _ = self
                .notifier
                .notify("WitnessScribe", "Transcription complete!", NotificationIcon::Success)
                .await;
        }

        let session = self.session.lock().await;
        Ok(session.snapshot())
    }

    /// Roll a failed start back to idle if the cycle is still ours
    async fn abandon_recording(&self, id: SessionId) {
        let mut session = self.session.lock().await;
        if session.is_current(id) && session.is_recording() {
            let _ = session.cancel_recording();
        }
    }

    /// Generic user-visible failure alert; no structured error codes
    async fn alert(&self, message: &str) {
        if self.config.notify {
            let _ = self
                .notifier
                .notify("WitnessScribe", message, NotificationIcon::Error)
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NotificationError;
    use crate::domain::extraction::PrayerRequest;
    use crate::domain::transcription::{AudioMimeType, Segment, Transcript, WordTiming};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockRecorder {
        recording: AtomicBool,
        deny_permission: bool,
        fail_start: bool,
        fail_stop: bool,
    }

    #[async_trait]
    impl VoiceRecorder for MockRecorder {
        async fn request_permission(&self) -> Permission {
            if self.deny_permission {
                Permission::Denied
            } else {
                Permission::Granted
            }
        }

        async fn start(&self) -> Result<(), CaptureError> {
            if self.fail_start {
                return Err(CaptureError::DeviceError("no input".into()));
            }
            self.recording.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn stop(&self) -> Result<AudioData, CaptureError> {
            if self.fail_stop {
                return Err(CaptureError::DeviceError("stream died".into()));
            }
            self.recording.store(false, Ordering::SeqCst);
            Ok(AudioData::new(vec![0u8; 64], AudioMimeType::Wav))
        }

        fn is_recording(&self) -> bool {
            self.recording.load(Ordering::SeqCst)
        }

        fn elapsed_ms(&self) -> u64 {
            0
        }
    }

    struct MockTranscriber {
        result: Result<Transcript, TranscriptionError>,
        calls: AtomicUsize,
    }

    impl MockTranscriber {
        fn ok(transcript: Transcript) -> Self {
            Self {
                result: Ok(transcript),
                calls: AtomicUsize::new(0),
            }
        }

        fn err(error: TranscriptionError) -> Self {
            Self {
                result: Err(error),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transcriber for MockTranscriber {
        async fn transcribe(
            &self,
            _audio: &AudioData,
            _options: TranscribeOptions,
        ) -> Result<Transcript, TranscriptionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct MockExtractor {
        result: Result<PrayerExtraction, ExtractionError>,
        calls: AtomicUsize,
    }

    use crate::application::ports::ExtractionError;

    impl MockExtractor {
        fn ok(extraction: PrayerExtraction) -> Self {
            Self {
                result: Ok(extraction),
                calls: AtomicUsize::new(0),
            }
        }

        fn err() -> Self {
            Self {
                result: Err(ExtractionError::MalformedResponse("not json".into())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Extractor for MockExtractor {
        async fn extract(&self, _transcript: &str) -> Result<PrayerExtraction, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct MockNotifier;

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn notify(
            &self,
            _title: &str,
            _message: &str,
            _icon: NotificationIcon,
        ) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    fn sample_transcript() -> Transcript {
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

    fn sample_extraction() -> PrayerExtraction {
        PrayerExtraction {
            prayer_requests: vec![PrayerRequest {
                request: "Pray for Alice".to_string(),
                need: Some("healing".to_string()),
                details: None,
            }],
        }
    }

    #[tokio::test]
    async fn full_cycle_with_extraction() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        use_case.start().await.unwrap();
        assert_eq!(use_case.state().await, SessionState::Recording);

        let snapshot = use_case.stop_and_process().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Complete);
        assert_eq!(snapshot.transcript.text, "Pray for Alice");
        assert_eq!(snapshot.problem_words.len(), 1);
        assert_eq!(snapshot.problem_words[0].word, "Alice");
        assert_eq!(
            snapshot.extraction.unwrap().prayer_requests[0].request,
            "Pray for Alice"
        );
    }

    #[tokio::test]
    async fn extraction_disabled_skips_extractor() {
        let extractor = MockExtractor::ok(sample_extraction());
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::ok(sample_transcript()),
            extractor,
            MockNotifier,
            CaptureConfig {
                extract: false,
                ..Default::default()
            },
        );

        use_case.start().await.unwrap();
        let snapshot = use_case.stop_and_process().await.unwrap();

        assert_eq!(snapshot.state, SessionState::Complete);
        assert!(snapshot.extraction.is_none());
        assert_eq!(use_case.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extraction_error_soft_fails_to_complete() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::err(),
            MockNotifier,
            CaptureConfig::default(),
        );

        use_case.start().await.unwrap();
        let snapshot = use_case.stop_and_process().await.unwrap();

        // Soft-fail: session completes with an empty extraction
        assert_eq!(snapshot.state, SessionState::Complete);
        assert_eq!(snapshot.extraction, Some(PrayerExtraction::empty()));
    }

    #[tokio::test]
    async fn upload_error_fails_session_and_skips_extraction() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::err(TranscriptionError::UploadError { status: 401 }),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        use_case.start().await.unwrap();
        let err = use_case.stop_and_process().await.unwrap_err();

        assert!(matches!(
            err,
            CaptureWorkflowError::Transcription(TranscriptionError::UploadError { status: 401 })
        ));
        assert_eq!(use_case.state().await, SessionState::Failed);
        assert_eq!(use_case.extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn acknowledge_failure_resets_to_idle() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::err(TranscriptionError::UploadError { status: 500 }),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        use_case.start().await.unwrap();
        let _ = use_case.stop_and_process().await;
        assert_eq!(use_case.state().await, SessionState::Failed);

        use_case.acknowledge_failure().await.unwrap();
        assert_eq!(use_case.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn stop_without_start_is_noop() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        let snapshot = use_case.stop_and_process().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(use_case.transcriber.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_stop_is_noop() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        use_case.start().await.unwrap();
        use_case.stop_and_process().await.unwrap();
        assert_eq!(use_case.transcriber.calls.load(Ordering::SeqCst), 1);

        // No duplicate upload
        let snapshot = use_case.stop_and_process().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Complete);
        assert_eq!(use_case.transcriber.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn permission_denied_returns_to_idle() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder {
                deny_permission: true,
                ..Default::default()
            },
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        let err = use_case.start().await.unwrap_err();
        assert!(matches!(
            err,
            CaptureWorkflowError::Capture(CaptureError::PermissionDenied)
        ));
        assert_eq!(use_case.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn failed_start_returns_to_idle() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder {
                fail_start: true,
                ..Default::default()
            },
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        assert!(use_case.start().await.is_err());
        assert_eq!(use_case.state().await, SessionState::Idle);
    }

    #[tokio::test]
    async fn failed_stop_fails_session() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder {
                fail_stop: true,
                ..Default::default()
            },
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        use_case.start().await.unwrap();
        assert!(use_case.stop_and_process().await.is_err());
        assert_eq!(use_case.state().await, SessionState::Failed);
    }

    #[tokio::test]
    async fn restart_clears_prior_results() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        use_case.start().await.unwrap();
        use_case.stop_and_process().await.unwrap();
        assert!(!use_case.snapshot().await.transcript.text.is_empty());

        use_case.start().await.unwrap();
        let snapshot = use_case.snapshot().await;
        assert_eq!(snapshot.state, SessionState::Recording);
        assert!(snapshot.transcript.text.is_empty());
        assert!(snapshot.problem_words.is_empty());
        assert!(snapshot.extraction.is_none());
    }

    #[tokio::test]
    async fn process_audio_runs_file_pipeline() {
        let use_case = WitnessCaptureUseCase::new(
            MockRecorder::default(),
            MockTranscriber::ok(sample_transcript()),
            MockExtractor::ok(sample_extraction()),
            MockNotifier,
            CaptureConfig::default(),
        );

        let audio = AudioData::new(vec![0u8; 16], AudioMimeType::Mp4);
        let snapshot = use_case.process_audio(audio).await.unwrap();

        assert_eq!(snapshot.state, SessionState::Complete);
        assert_eq!(snapshot.transcript.text, "Pray for Alice");
    }
}
