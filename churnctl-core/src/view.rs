//! Declarative view state for the prediction form.
//!
//! The whole visible surface (submit button, result panel, error panel) is a
//! pure function of [`View`]; nothing toggles panels directly.

use serde::Serialize;
use serde_json::Value;

pub const CHURN_MESSAGE: &str = "Customer is likely to churn.";
pub const NO_CHURN_MESSAGE: &str = "Customer is unlikely to churn.";
pub const SUBMIT_LABEL: &str = "Predict Churn";
pub const SUBMITTING_LABEL: &str = "Predicting...";

/// First prediction value returned by the service, kept as received
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Prediction(Value);

impl Prediction {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Only a numeric value exactly equal to 1 means churn
    pub fn is_churn(&self) -> bool {
        self.0.as_f64() == Some(1.0)
    }

    pub fn message(&self) -> &'static str {
        if self.is_churn() {
            CHURN_MESSAGE
        } else {
            NO_CHURN_MESSAGE
        }
    }
}

impl From<i64> for Prediction {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Submitting,
    ShowingResult {
        prediction: Prediction,
        probability: Option<f64>,
    },
    ShowingError(String),
}

impl ViewState {
    /// True once a submission has produced an outcome
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::ShowingResult { .. } | Self::ShowingError(_))
    }
}

/// Submit button affordance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    pub disabled: bool,
    pub label: String,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            disabled: false,
            label: SUBMIT_LABEL.to_string(),
        }
    }
}

impl SubmitControl {
    pub fn engage(&mut self) {
        self.disabled = true;
        self.label = SUBMITTING_LABEL.to_string();
    }

    pub fn release(&mut self) {
        self.disabled = false;
        self.label = SUBMIT_LABEL.to_string();
    }
}

/// Everything the form displays
#[derive(Debug, Clone, PartialEq, Default)]
pub struct View {
    pub state: ViewState,
    pub control: SubmitControl,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPanel {
    pub prediction_text: String,
    pub probability_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPanel {
    pub message: String,
}

/// Rendered output. A `None` panel is hidden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub submit: SubmitControl,
    pub result: Option<ResultPanel>,
    pub error: Option<ErrorPanel>,
}

impl Screen {
    pub fn result_visible(&self) -> bool {
        self.result.is_some()
    }

    pub fn error_visible(&self) -> bool {
        self.error.is_some()
    }
}

/// Map a view to what is visible
pub fn render(view: &View) -> Screen {
    let (result, error) = match &view.state {
        ViewState::Idle | ViewState::Submitting => (None, None),
        ViewState::ShowingResult {
            prediction,
            probability,
        } => (Some(result_panel(prediction, *probability)), None),
        ViewState::ShowingError(message) => (
            None,
            Some(ErrorPanel {
                message: message.clone(),
            }),
        ),
    };

    Screen {
        submit: view.control.clone(),
        result,
        error,
    }
}

pub fn result_panel(prediction: &Prediction, probability: Option<f64>) -> ResultPanel {
    ResultPanel {
        prediction_text: prediction.message().to_string(),
        probability_text: probability
            .and_then(format_probability)
            .map(|pct| format!("Estimated churn probability: {}", pct))
            .unwrap_or_default(),
    }
}

/// Render a probability as a percentage with one decimal digit
/// (`0.4567` -> `"45.7%"`). Non-finite input renders nothing.
pub fn format_probability(probability: f64) -> Option<String> {
    if !probability.is_finite() {
        return None;
    }
    Some(format!("{}%", to_fixed_1(probability * 100.0)))
}

/// One-decimal fixed notation with exact ties resolved away from zero.
/// `{:.1}` alone resolves ties to even.
fn to_fixed_1(value: f64) -> String {
    // the only binary fractions that land exactly on a tie end in .25 or .75
    let frac = value.abs().fract();
    let adjusted = if frac == 0.25 || frac == 0.75 {
        value + 0.05_f64.copysign(value)
    } else {
        value
    };
    let text = format!("{:.1}", adjusted);
    if text == "-0.0" && value == 0.0 {
        "0.0".to_string()
    } else {
        text
    }
}
