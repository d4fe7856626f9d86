//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::extraction::PrayerExtraction;
use crate::domain::transcription::ProblemWord;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print the transcript section
    pub fn transcript(&self, text: &str) {
        println!();
        println!("{}", "Your Prayer Request:".bold());
        println!("{}", text);
    }

    /// Print the pronunciation analysis report
    pub fn problem_word_report(&self, words: &[ProblemWord]) {
        println!();
        println!("{}", "Pronunciation Analysis Report".bold());
        println!("Total Problem Words Found: {}", words.len());

        if words.is_empty() {
            println!(
                "{}",
                "Great! No pronunciation problems detected. Your speech was clear and confident."
                    .green()
            );
            return;
        }

        for (index, word) in words.iter().enumerate() {
            println!();
            println!(
                "{}",
                format!("{}. WORD: {}", index + 1, word.word.to_uppercase()).red()
            );
            println!("  • Confidence: {:.2}/1.00", word.confidence);
            println!("  • Position: {:.2}-{:.2} seconds", word.start, word.end);
            println!("  • Context: \"{}\"", word.context_sentence);
            println!("  • Practice: Listen and repeat 5 times at this timestamp");
        }
    }

    /// Print the extracted prayer requests section
    pub fn prayer_requests(&self, extraction: &PrayerExtraction) {
        println!();
        println!("{}", "Extracted Prayer Requests:".bold());

        if extraction.is_empty() {
            println!("(none found)");
            return;
        }

        for request in &extraction.prayer_requests {
            match request.need.as_deref() {
                Some(need) => println!("- {} ({})", request.request, need),
                None => println!("- {}", request.request),
            }
            if let Some(details) = request.details.as_deref() {
                println!("  {}", details);
            }
        }
    }

    /// Format elapsed recording time for the spinner
    pub fn format_elapsed(&self, elapsed_ms: u64, max_ms: u64) -> String {
        format!("Recording... {}s / {}s (press Enter to stop)", elapsed_ms / 1000, max_ms / 1000)
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
