//! Terminal rendering for churnctl
//!
//! The in-flight spinner stands in for the disabled submit button. It is
//! suppressed when:
//! - `--quiet` flag is passed
//! - `CHURNCTL_QUIET=1` environment variable is set
//! - stderr is not a TTY (piped output)

use std::io::IsTerminal;
use std::sync::OnceLock;
use std::time::Duration;

use churnctl_core::{Screen, ViewSink};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};

/// Global quiet mode state
static QUIET_MODE: OnceLock<bool> = OnceLock::new();

/// Initialize quiet mode from flags and environment
pub fn init_quiet_mode(quiet_flag: bool) {
    let is_quiet = quiet_flag
        || std::env::var("CHURNCTL_QUIET").map(|v| v == "1").unwrap_or(false)
        || !std::io::stderr().is_terminal();

    QUIET_MODE.set(is_quiet).ok();
}

/// Check if we're in quiet mode
pub fn is_quiet() -> bool {
    *QUIET_MODE.get().unwrap_or(&false)
}

/// Create a spinner that respects quiet mode
pub fn spinner(msg: impl Into<String>) -> Option<ProgressBar> {
    if is_quiet() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    pb.set_message(msg.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable panels
    #[default]
    Text,
    /// The rendered screen as JSON
    Json,
}

/// Shows a spinner while a submission is in flight and prints the settled
/// panels. Results go to stdout, errors to stderr.
pub struct TerminalView {
    format: OutputFormat,
    spinner: Option<ProgressBar>,
}

impl TerminalView {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            spinner: None,
        }
    }
}

impl ViewSink for TerminalView {
    fn render(&mut self, screen: &Screen) {
        if screen.submit.disabled {
            self.spinner = spinner(screen.submit.label.clone());
            return;
        }
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }

        let (stdout, stderr) = settled_lines(self.format, screen);
        for line in stdout {
            println!("{}", line);
        }
        for line in stderr {
            eprintln!("{}", line);
        }
    }
}

/// What a settled screen prints, split into stdout and stderr lines
fn settled_lines(format: OutputFormat, screen: &Screen) -> (Vec<String>, Vec<String>) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(screen) {
            Ok(json) => stdout.push(json),
            Err(err) => stderr.push(format!("✗ failed to serialize screen: {}", err)),
        },
        OutputFormat::Text => {
            if let Some(result) = &screen.result {
                stdout.push(result.prediction_text.clone());
                if !result.probability_text.is_empty() {
                    stdout.push(result.probability_text.clone());
                }
            }
            if let Some(error) = &screen.error {
                stderr.push(format!("✗ {}", error.message));
            }
        }
    }
    (stdout, stderr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use churnctl_core::{render, Prediction, View, ViewState};
    use serde_json::Value;

    fn settled(state: ViewState) -> Screen {
        render(&View {
            state,
            ..View::default()
        })
    }

    #[test]
    fn test_quiet_flag_suppresses_spinner() {
        init_quiet_mode(true);
        assert!(is_quiet());
        assert!(spinner("Predicting...").is_none());
    }

    #[test]
    fn test_output_format_parses() {
        assert_eq!(OutputFormat::from_str("json", true).unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_text_result_goes_to_stdout() {
        let screen = settled(ViewState::ShowingResult {
            prediction: Prediction::from(1),
            probability: Some(0.82),
        });
        let (stdout, stderr) = settled_lines(OutputFormat::Text, &screen);
        assert_eq!(
            stdout,
            vec![
                "Customer is likely to churn.".to_string(),
                "Estimated churn probability: 82.0%".to_string(),
            ]
        );
        assert!(stderr.is_empty());
    }

    #[test]
    fn test_text_error_goes_to_stderr() {
        let screen = settled(ViewState::ShowingError("invalid tenure".into()));
        let (stdout, stderr) = settled_lines(OutputFormat::Text, &screen);
        assert!(stdout.is_empty());
        assert_eq!(stderr, vec!["✗ invalid tenure".to_string()]);
    }

    #[test]
    fn test_json_screen() {
        let screen = settled(ViewState::ShowingResult {
            prediction: Prediction::from(0),
            probability: None,
        });
        let (stdout, stderr) = settled_lines(OutputFormat::Json, &screen);
        assert!(stderr.is_empty());

        let json: Value = serde_json::from_str(&stdout[0]).unwrap();
        assert_eq!(json["submit"]["disabled"], false);
        assert_eq!(json["submit"]["label"], "Predict Churn");
        assert_eq!(json["result"]["prediction_text"], "Customer is unlikely to churn.");
        assert_eq!(json["result"]["probability_text"], "");
        assert!(json["error"].is_null());
    }
}
