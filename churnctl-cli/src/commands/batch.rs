//! `churnctl batch` - predict many customer records in one request

use std::path::PathBuf;

use anyhow::{Context, Result};
use churnctl_core::{predict_batch, EndpointConfig, FormFields, FormInput, HttpTransport};
use clap::Parser;
use serde_json::Value;
use tracing::info;

use super::predict::read_input;
use crate::ui::{self, OutputFormat};

#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// JSON array of records, each an object of field values ("-" reads stdin)
    #[arg(long = "from", value_name = "PATH")]
    pub from: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Returns whether every record received a prediction
pub async fn run_batch(args: BatchArgs, endpoint: &EndpointConfig) -> Result<bool> {
    let content = read_input(&args.from)?;
    let records: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of objects", args.from.display()))?;

    let inputs = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            FormFields::from_json_object(record)
                .map(|fields| FormInput::from_fields(&fields))
                .with_context(|| format!("record #{}", index + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    info!(records = inputs.len(), "submitting batch");

    let transport = HttpTransport::new(endpoint.base_url.clone(), endpoint.timeout())?;
    let pb = ui::spinner(format!("Predicting {} records...", inputs.len()));
    let outcome = predict_batch(&transport, &endpoint.predict_path, inputs).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let verdicts = match outcome {
        Ok(verdicts) => verdicts,
        Err(panel) => {
            eprintln!("✗ {}", panel.message);
            return Ok(false);
        }
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&verdicts)?),
        OutputFormat::Text => {
            for verdict in &verdicts {
                match verdict.panel() {
                    Ok(panel) if panel.probability_text.is_empty() => {
                        println!("#{}  {}", verdict.index + 1, panel.prediction_text)
                    }
                    Ok(panel) => println!(
                        "#{}  {}  {}",
                        verdict.index + 1,
                        panel.prediction_text,
                        panel.probability_text
                    ),
                    Err(panel) => println!("#{}  {}", verdict.index + 1, panel.message),
                }
            }
        }
    }

    Ok(verdicts.iter().all(|v| v.prediction.is_some()))
}
