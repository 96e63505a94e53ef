pub mod batch;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod payload;
pub mod transport;
pub mod view;

pub use batch::{predict_batch, Verdict};
pub use config::{ChurnConfig, EndpointConfig};
pub use controller::{submit_fields, FormController, ViewSink, PREDICT_PATH};
pub use error::{ChurnError, Result};
pub use form::{FieldKind, FieldSpec, FormFields, FormInput, NumericValue, FIELDS};
pub use payload::{interpret_response, PredictionRequest, ResponseBody};
pub use transport::{HealthStatus, HttpTransport, PredictionTransport, RawResponse};
pub use view::{
    render, ErrorPanel, Prediction, ResultPanel, Screen, SubmitControl, View, ViewState,
};
