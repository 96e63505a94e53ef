//! The form controller: one submission turns the current field values into a
//! prediction request and settles the view into a result or an error.

use tracing::{debug, info, warn};

use crate::error::{ChurnError, Result};
use crate::form::{FormFields, FormInput};
use crate::payload::{interpret_response, PredictionRequest};
use crate::transport::{PredictionTransport, RawResponse};
use crate::view::{render, Screen, View, ViewState};

/// Default path of the prediction endpoint
pub const PREDICT_PATH: &str = "/predict";

/// Receives every screen the controller produces
pub trait ViewSink {
    fn render(&mut self, screen: &Screen);
}

impl ViewSink for () {
    fn render(&mut self, _screen: &Screen) {}
}

impl<F> ViewSink for F
where
    F: FnMut(&Screen),
{
    fn render(&mut self, screen: &Screen) {
        self(screen)
    }
}

/// Drives the view through submissions.
///
/// `on_submit` takes `&mut self`, so a second submission cannot start while
/// one is in flight.
pub struct FormController<T, S = ()> {
    transport: T,
    sink: S,
    predict_path: String,
    view: View,
}

impl<T: PredictionTransport> FormController<T> {
    pub fn new(transport: T) -> Self {
        Self::with_sink(transport, ())
    }
}

impl<T: PredictionTransport, S: ViewSink> FormController<T, S> {
    pub fn with_sink(transport: T, sink: S) -> Self {
        Self {
            transport,
            sink,
            predict_path: PREDICT_PATH.to_string(),
            view: View::default(),
        }
    }

    pub fn predict_path(mut self, path: impl Into<String>) -> Self {
        self.predict_path = path.into();
        self
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn screen(&self) -> Screen {
        render(&self.view)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handle one form submission and return the settled screen.
    ///
    /// The submit control is disabled for the duration and restored on every
    /// exit path; dropping the returned future mid-request also restores the
    /// previous panel.
    pub async fn on_submit(&mut self, fields: &FormFields) -> Screen {
        let submission = InFlight::begin(&mut self.view);
        self.sink.render(&render(submission.view()));

        let state = submit_fields(&self.transport, &self.predict_path, fields).await;
        match &state {
            ViewState::ShowingResult { prediction, .. } => {
                info!(churn = prediction.is_churn(), "prediction received")
            }
            ViewState::ShowingError(message) => info!(%message, "prediction failed"),
            _ => {}
        }
        submission.settle(state);

        let screen = render(&self.view);
        self.sink.render(&screen);
        screen
    }
}

/// Build the request from `fields`, send it, and interpret the outcome
pub async fn submit_fields<T>(transport: &T, path: &str, fields: &FormFields) -> ViewState
where
    T: PredictionTransport + ?Sized,
{
    match exchange(transport, path, fields).await {
        Ok(response) => interpret_response(response.status, &response.body),
        Err(err) => {
            warn!(error = %err, "prediction request did not complete");
            ViewState::ShowingError(format!("Unexpected error: {}", err))
        }
    }
}

async fn exchange<T>(transport: &T, path: &str, fields: &FormFields) -> Result<RawResponse>
where
    T: PredictionTransport + ?Sized,
{
    let unknown = fields.unknown_names();
    if !unknown.is_empty() {
        warn!(fields = ?unknown, "ignoring fields that are not part of the form");
    }

    let request = PredictionRequest::single(FormInput::from_fields(fields));
    let body = serde_json::to_vec(&request).map_err(|err| ChurnError::json("request", err))?;
    debug!(path, "posting prediction request");
    transport.post_json(path, body).await
}

/// Scope of one in-flight submission. Dropping it releases the submit
/// control; dropping it unsettled also restores the state it replaced.
struct InFlight<'a> {
    view: &'a mut View,
    previous: Option<ViewState>,
}

impl<'a> InFlight<'a> {
    fn begin(view: &'a mut View) -> Self {
        let previous = std::mem::replace(&mut view.state, ViewState::Submitting);
        view.control.engage();
        Self {
            view,
            previous: Some(previous),
        }
    }

    fn view(&self) -> &View {
        self.view
    }

    fn settle(mut self, state: ViewState) {
        self.view.state = state;
        self.previous = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            debug!("submission abandoned before settling");
            self.view.state = previous;
        }
        self.view.control.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{SUBMITTING_LABEL, SUBMIT_LABEL};

    #[test]
    fn test_in_flight_settles() {
        let mut view = View::default();
        let submission = InFlight::begin(&mut view);
        assert!(submission.view().control.disabled);
        assert_eq!(submission.view().control.label, SUBMITTING_LABEL);
        assert_eq!(submission.view().state, ViewState::Submitting);
        submission.settle(ViewState::ShowingError("boom".into()));

        assert!(!view.control.disabled);
        assert_eq!(view.control.label, SUBMIT_LABEL);
        assert_eq!(view.state, ViewState::ShowingError("boom".into()));
    }

    #[test]
    fn test_in_flight_dropped_restores() {
        let mut view = View {
            state: ViewState::ShowingError("earlier".into()),
            ..View::default()
        };
        {
            let _submission = InFlight::begin(&mut view);
        }
        assert!(!view.control.disabled);
        assert_eq!(view.state, ViewState::ShowingError("earlier".into()));
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        let mut sink = |screen: &Screen| seen.push(screen.submit.disabled);
        sink.render(&render(&View::default()));
        assert_eq!(seen, vec![false]);
    }
}
