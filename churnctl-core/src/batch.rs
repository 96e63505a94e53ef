//! Multi-record predictions. The service accepts any number of records per
//! request and answers with parallel `predictions` / `churn_probability`
//! arrays.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ChurnError;
use crate::form::FormInput;
use crate::payload::{
    failure_message, is_success, PredictionRequest, ResponseBody, NO_PREDICTION_MESSAGE,
};
use crate::transport::PredictionTransport;
use crate::view::{result_panel, ErrorPanel, Prediction, ResultPanel};

/// Outcome for one record of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub index: usize,
    pub prediction: Option<Prediction>,
    pub probability: Option<f64>,
}

impl Verdict {
    /// The result panel for this record, or the missing-prediction message
    pub fn panel(&self) -> Result<ResultPanel, ErrorPanel> {
        match &self.prediction {
            Some(prediction) => Ok(result_panel(prediction, self.probability)),
            None => Err(ErrorPanel {
                message: NO_PREDICTION_MESSAGE.to_string(),
            }),
        }
    }
}

/// Predict many records in one request.
///
/// Failures map to the same messages a single submission shows.
pub async fn predict_batch<T>(
    transport: &T,
    path: &str,
    inputs: Vec<FormInput>,
) -> Result<Vec<Verdict>, ErrorPanel>
where
    T: PredictionTransport + ?Sized,
{
    let unexpected = |err: ChurnError| ErrorPanel {
        message: format!("Unexpected error: {}", err),
    };

    let expected = inputs.len();
    let body = serde_json::to_vec(&PredictionRequest::batch(inputs))
        .map_err(|err| unexpected(ChurnError::json("batch request", err)))?;
    debug!(records = expected, "posting batch prediction request");
    let response = transport.post_json(path, body).await.map_err(unexpected)?;

    let body = ResponseBody::parse(&response.body);
    if !is_success(response.status) {
        return Err(ErrorPanel {
            message: failure_message(response.status, &body),
        });
    }

    let predictions = match body.predictions() {
        Some(predictions) if !predictions.is_empty() => predictions,
        _ => {
            return Err(ErrorPanel {
                message: NO_PREDICTION_MESSAGE.to_string(),
            })
        }
    };
    if predictions.len() != expected {
        warn!(
            expected,
            received = predictions.len(),
            "prediction count does not match record count"
        );
    }

    let probabilities = body.probabilities();
    Ok(predictions
        .iter()
        .enumerate()
        .map(|(index, value)| Verdict {
            index,
            prediction: match value {
                Value::Null => None,
                value => Some(Prediction::new(value.clone())),
            },
            probability: probabilities
                .and_then(|probs| probs.get(index))
                .and_then(Value::as_f64),
        })
        .collect())
}
