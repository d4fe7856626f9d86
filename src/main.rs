//! WitnessScribe CLI entry point

use std::process::ExitCode;

use clap::Parser;

use witness_scribe::cli::{
    app::{load_merged_config, run_capture, run_file, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    CaptureOptions,
};
use witness_scribe::domain::config::AppConfig;
use witness_scribe::domain::recording::Duration;
use witness_scribe::domain::transcription::{Granularity, ResponseDetail, TranscribeOptions};
use witness_scribe::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle the config subcommand before any capture wiring
    let command = match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            return ExitCode::SUCCESS;
        }
        other => other,
    };

    // Build CLI config from args
    let cli_config = AppConfig {
        api_key: None, // API key comes from env/file only
        api_base_url: None,
        transcribe_model: cli.transcribe_model.clone(),
        extract_model: cli.extract_model.clone(),
        extract: if cli.no_extract { Some(false) } else { None },
        granularity: cli.granularity.map(|g| Granularity::from(g).to_string()),
        detail: cli.detail.map(|d| ResponseDetail::from(d).to_string()),
        notify: if cli.notify { Some(true) } else { None },
        max_duration: cli.max_duration.clone(),
    };

    // Merge config
    let config = load_merged_config(cli_config).await;

    // Parse max duration
    let max_duration = match config.max_duration.as_ref() {
        Some(s) => match s.parse::<Duration>() {
            Ok(d) => d,
            Err(e) => {
                presenter.error(&format!("Invalid max-duration: {}", e));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => Duration::default_max_capture(),
    };

    let options = CaptureOptions {
        options: TranscribeOptions {
            granularity: config.granularity_or_default(),
            detail: config.detail_or_default(),
        },
        extract: config.extract_or_default(),
        notify: config.notify_or_default(),
        max_duration,
        transcribe_model: config.transcribe_model_or_default().to_string(),
        extract_model: config.extract_model_or_default().to_string(),
        api_base_url: config.api_base_url.clone(),
    };

    match command {
        Some(Commands::File { path }) => run_file(options, &path).await,
        _ => run_capture(options).await,
    }
}
