//! `churnctl predict` - submit one customer record

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use churnctl_core::{EndpointConfig, FormController, FormFields, HttpTransport};
use clap::Parser;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ui::{OutputFormat, TerminalView};

#[derive(Parser, Debug)]
pub struct PredictArgs {
    /// Form field assignment, repeatable (e.g. -F tenure=12 -F "Contract=One year")
    #[arg(short = 'F', long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// JSON object of field values to start from ("-" reads stdin)
    #[arg(long = "from", value_name = "PATH")]
    pub from: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Submit the form once. Returns whether a prediction was shown.
pub async fn run_predict(args: PredictArgs, endpoint: &EndpointConfig) -> Result<bool> {
    let fields = collect_fields(&args)?;
    if fields.is_empty() {
        warn!("no form fields given; every field will be sent empty");
    }

    let transport = HttpTransport::new(endpoint.base_url.clone(), endpoint.timeout())?;
    let mut controller = FormController::with_sink(transport, TerminalView::new(args.format))
        .predict_path(endpoint.predict_path.clone());

    let screen = controller.on_submit(&fields).await;
    Ok(screen.result_visible())
}

/// Merge `--from` values with `-F` assignments (assignments win)
fn collect_fields(args: &PredictArgs) -> Result<FormFields> {
    let mut fields = match &args.from {
        Some(path) => {
            let content = read_input(path)?;
            let object: Map<String, Value> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON object", path.display()))?;
            FormFields::from_json_object(&object)?
        }
        None => FormFields::new(),
    };

    for assignment in &args.fields {
        fields.apply_assignment(assignment)?;
    }
    debug!(count = fields.len(), "collected form fields");
    Ok(fields)
}

/// Read a file, or stdin when the path is `-`
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        if buf.trim().is_empty() {
            return Err(anyhow!("No input on stdin"));
        }
        return Ok(buf);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}
