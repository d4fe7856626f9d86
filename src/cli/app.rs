//! Main app runners for capture and file modes

use std::env;
use std::path::Path;
use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::interval;

use crate::application::ports::{ConfigStore, Notifier};
use crate::application::{CaptureConfig, WitnessCaptureUseCase};
use crate::domain::config::AppConfig;
use crate::domain::session::SessionSnapshot;
use crate::infrastructure::{
    create_notifier, load_audio_file, CpalRecorder, OpenAiExtractor, OpenAiTranscriber,
    XdgConfigStore,
};

use super::args::CaptureOptions;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

type UseCase =
    WitnessCaptureUseCase<CpalRecorder, OpenAiTranscriber, OpenAiExtractor, Box<dyn Notifier>>;

/// Wire the adapters into the capture use case
fn build_use_case(api_key: String, options: &CaptureOptions) -> UseCase {
    let mut transcriber =
        OpenAiTranscriber::new(api_key.clone()).with_model(options.transcribe_model.clone());
    let mut extractor = OpenAiExtractor::new(api_key).with_model(options.extract_model.clone());

    if let Some(base_url) = options.api_base_url.as_deref() {
        transcriber = transcriber.with_base_url(base_url);
        extractor = extractor.with_base_url(base_url);
    }

    WitnessCaptureUseCase::new(
        CpalRecorder::new(),
        transcriber,
        extractor,
        create_notifier(options.notify),
        CaptureConfig {
            options: options.options,
            extract: options.extract,
            notify: options.notify,
        },
    )
}

/// Run the interactive capture: record until Enter (or the max
/// duration), then upload and report.
pub async fn run_capture(options: CaptureOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let api_key = match get_api_key().await {
        Ok(key) => key,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let use_case = build_use_case(api_key, &options);

    if let Err(e) = use_case.start().await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let max_ms = options.max_duration.as_millis();
    let initial = presenter.format_elapsed(0, max_ms);
    presenter.start_spinner(&initial);

    // Record until the user presses Enter or the safety cap is hit
    {
        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();
        let read = reader.read_line(&mut line);
        tokio::pin!(read);

        let mut ticker = interval(std::time::Duration::from_millis(500));
        loop {
            tokio::select! {
                _ = &mut read => break,
                _ = ticker.tick() => {
                    let elapsed = use_case.elapsed_ms();
                    if elapsed >= max_ms {
                        presenter.update_spinner("Max duration reached, stopping...");
                        break;
                    }
                    presenter.update_spinner(&presenter.format_elapsed(elapsed, max_ms));
                }
            }
        }
    }

    presenter.update_spinner("Transcribing...");

    match use_case.stop_and_process().await {
        Ok(snapshot) => {
            presenter.spinner_success("Transcription complete");
            render_results(&presenter, &options, &snapshot);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail("Transcription failed");
            presenter.error(&e.to_string());
            let _ = use_case.acknowledge_failure().await;
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the pipeline over an already-recorded audio file
pub async fn run_file(options: CaptureOptions, path: &Path) -> ExitCode {
    let mut presenter = Presenter::new();

    let api_key = match get_api_key().await {
        Ok(key) => key,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let audio = match load_audio_file(path).await {
        Ok(audio) => audio,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };
    presenter.info(&format!(
        "Uploading {} ({})",
        path.display(),
        audio.human_readable_size()
    ));

    let use_case = build_use_case(api_key, &options);

    presenter.start_spinner("Transcribing...");
    match use_case.process_audio(audio).await {
        Ok(snapshot) => {
            presenter.spinner_success("Transcription complete");
            render_results(&presenter, &options, &snapshot);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.spinner_fail("Transcription failed");
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Print transcript, pronunciation report, and extracted requests
fn render_results(presenter: &Presenter, options: &CaptureOptions, snapshot: &SessionSnapshot) {
    presenter.transcript(&snapshot.transcript.text);

    if options.options.wants_word_timestamps() {
        presenter.problem_word_report(&snapshot.problem_words);
    }

    if let Some(extraction) = snapshot.extraction.as_ref() {
        presenter.prayer_requests(extraction);
    }
}

/// Get API key from environment or config file
pub async fn get_api_key() -> Result<String, String> {
    // Check environment first
    if let Ok(key) = env::var("OPENAI_API_KEY") {
        if !key.is_empty() {
            return Ok(key);
        }
    }

    // Check config file
    let store = XdgConfigStore::new();
    let config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    config.api_key.ok_or_else(|| {
        "Missing API key. Set OPENAI_API_KEY environment variable or run 'witness-scribe config set api_key <key>'".to_string()
    })
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Build env config
    let env_config = AppConfig {
        api_key: env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
