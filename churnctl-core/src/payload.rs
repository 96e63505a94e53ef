//! Wire payloads for `POST /predict` and interpretation of whatever comes back.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::form::FormInput;
use crate::view::{Prediction, ViewState};

/// Message shown when a successful response carries no usable prediction
pub const NO_PREDICTION_MESSAGE: &str = "No prediction value returned from API.";

/// Request body: a batch of records
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    pub data: Vec<FormInput>,
}

impl PredictionRequest {
    /// Wrap one record as a single-element batch
    pub fn single(input: FormInput) -> Self {
        Self { data: vec![input] }
    }

    pub fn batch(inputs: Vec<FormInput>) -> Self {
        Self { data: inputs }
    }
}

/// Whether a status code counts as success (2xx)
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// A response body parsed as JSON, or nothing when it does not parse.
///
/// Parsing never fails the submission; an unparsable body is simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBody(Option<Value>);

impl ResponseBody {
    pub fn parse(bytes: &[u8]) -> Self {
        // decoded as UTF-8 text first: a leading BOM is dropped and invalid
        // sequences become U+FFFD
        let text = String::from_utf8_lossy(bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        match serde_json::from_str(text) {
            Ok(value) => Self(Some(value)),
            Err(err) => {
                debug!(error = %err, "response body is not JSON");
                Self(None)
            }
        }
    }

    pub fn json(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    /// The `error` field, when present and truthy
    pub fn error_message(&self) -> Option<String> {
        let error = self.json()?.get("error")?;
        match error {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(display_text(other)),
        }
    }

    /// `predictions`, when it is an array
    pub fn predictions(&self) -> Option<&Vec<Value>> {
        self.json()?.get("predictions")?.as_array()
    }

    /// `churn_probability`, when it is an array
    pub fn probabilities(&self) -> Option<&Vec<Value>> {
        self.json()?.get("churn_probability")?.as_array()
    }

    /// `predictions[0]`, treating a missing or null element as absent
    pub fn first_prediction(&self) -> Option<Prediction> {
        match self.predictions()?.first()? {
            Value::Null => None,
            value => Some(Prediction::new(value.clone())),
        }
    }

    /// `churn_probability[0]`, when it is a number
    pub fn first_probability(&self) -> Option<f64> {
        self.probabilities()?.first()?.as_f64()
    }
}

/// Text a JSON value shows when assigned as display text: arrays join their
/// elements with commas (null elements empty), objects are opaque.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_text)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Message for a failed (non-2xx) response
pub fn failure_message(status: u16, body: &ResponseBody) -> String {
    body.error_message()
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

/// Map a settled HTTP exchange to the view state it produces
pub fn interpret_response(status: u16, body: &[u8]) -> ViewState {
    let body = ResponseBody::parse(body);

    if !is_success(status) {
        return ViewState::ShowingError(failure_message(status, &body));
    }

    match body.first_prediction() {
        Some(prediction) => ViewState::ShowingResult {
            prediction,
            probability: body.first_probability(),
        },
        None => ViewState::ShowingError(NO_PREDICTION_MESSAGE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormFields;

    #[test]
    fn test_request_wraps_single_record() {
        let request = PredictionRequest::single(FormInput::from_fields(&FormFields::new()));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["data"].as_array().unwrap().len(), 1);
    }

    /// Churn flag and probability of a result state
    fn shown(state: ViewState) -> (bool, Option<f64>) {
        match state {
            ViewState::ShowingResult {
                prediction,
                probability,
            } => (prediction.is_churn(), probability),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_success_with_probability() {
        let state = interpret_response(200, br#"{"predictions":[1],"churn_probability":[0.82]}"#);
        assert_eq!(shown(state), (true, Some(0.82)));
    }

    #[test]
    fn test_leading_bom_is_ignored() {
        let state = interpret_response(200, b"\xEF\xBB\xBF{\"predictions\":[1]}");
        assert_eq!(shown(state), (true, None));
    }

    #[test]
    fn test_zero_prediction_is_a_value() {
        let state = interpret_response(200, br#"{"predictions":[0]}"#);
        assert_eq!(shown(state), (false, None));
    }

    #[test]
    fn test_probability_not_an_array() {
        let state = interpret_response(200, br#"{"predictions":[1],"churn_probability":0.5}"#);
        assert_eq!(shown(state), (true, None));

        let body = br#"{"predictions":[1],"churn_probability":["high"]}"#;
        assert_eq!(shown(interpret_response(200, body)), (true, None));
    }

    #[test]
    fn test_missing_prediction() {
        let bodies: [&[u8]; 8] = [
            br#"{"predictions":[]}"#,
            br#"{"predictions":[null]}"#,
            br#"{"predictions":1}"#,
            br#"{}"#,
            br#"[1]"#,
            b"not json",
            b"",
            b"\xEF\xBB\xBF",
        ];
        for body in bodies {
            assert_eq!(
                interpret_response(200, body),
                ViewState::ShowingError(NO_PREDICTION_MESSAGE.to_string())
            );
        }
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            interpret_response(400, br#"{"error":"invalid tenure"}"#),
            ViewState::ShowingError("invalid tenure".to_string())
        );
        assert_eq!(
            interpret_response(500, b"<html>oops</html>"),
            ViewState::ShowingError("Request failed with status 500".to_string())
        );
        assert_eq!(
            interpret_response(404, br#"{"error":""}"#),
            ViewState::ShowingError("Request failed with status 404".to_string())
        );
        // invalid UTF-8 is replaced, not fatal to the message
        assert_eq!(
            interpret_response(400, b"{\"error\":\"caf\xE9 down\"}"),
            ViewState::ShowingError("caf\u{fffd} down".to_string())
        );
        // a failure status wins even when the body looks like a success
        assert_eq!(
            interpret_response(503, br#"{"predictions":[1]}"#),
            ViewState::ShowingError("Request failed with status 503".to_string())
        );
    }

    #[test]
    fn test_non_string_error_field() {
        let body = ResponseBody::parse(br#"{"error":{"field":"tenure"}}"#);
        assert_eq!(body.error_message(), Some("[object Object]".to_string()));

        let body = ResponseBody::parse(br#"{"error":["tenure","Contract"]}"#);
        assert_eq!(body.error_message(), Some("tenure,Contract".to_string()));

        let body = ResponseBody::parse(br#"{"error":[1,null,[true,"x"]]}"#);
        assert_eq!(body.error_message(), Some("1,,true,x".to_string()));

        let body = ResponseBody::parse(br#"{"error":0}"#);
        assert_eq!(body.error_message(), None);

        let body = ResponseBody::parse(br#"{"error":42}"#);
        assert_eq!(body.error_message(), Some("42".to_string()));
    }

    #[test]
    fn test_status_range() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(199));
        assert!(!is_success(301));
        assert!(!is_success(500));
    }
}
