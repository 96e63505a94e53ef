//! Interactive form - prompts for every field of the churn form
//!
//! Categorical fields are picked from the options the form offers; numeric
//! fields are typed in and sent as entered (the service validates them).
//! Answers from the previous submission are offered as defaults, so repeated
//! predictions only need the fields that changed.
//!
//! ```text
//! $ churnctl form
//!
//! Customer churn prediction
//!
//! ? Gender: Female
//! ? Senior citizen (0/1): 0
//! ? Tenure (months): 12
//! ...
//! ```

use anyhow::{Context, Result};
use churnctl_core::{FieldKind, FieldSpec, FormFields, FIELDS};
use inquire::{Confirm, Select, Text};
use std::io::IsTerminal;

/// Interactive prompts need a terminal on both ends
pub fn can_use_wizard() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Prompt for every catalog field
pub fn prompt_fields(previous: Option<&FormFields>) -> Result<FormFields> {
    let mut fields = FormFields::new();
    for spec in FIELDS {
        let prior = previous.and_then(|p| p.get(spec.name));
        let value = prompt_field(spec, prior)?;
        fields.set(spec.name, value);
    }
    Ok(fields)
}

fn prompt_field(spec: &FieldSpec, prior: Option<&str>) -> Result<String> {
    match spec.kind {
        FieldKind::Categorical(options) => {
            let start = prior
                .and_then(|p| options.iter().position(|o| *o == p))
                .unwrap_or(0);
            let choice = Select::new(&format!("{}:", spec.label), options.to_vec())
                .with_starting_cursor(start)
                .prompt()
                .with_context(|| format!("Failed to read {}", spec.name))?;
            Ok(choice.to_string())
        }
        FieldKind::Integer | FieldKind::Float => {
            let label = format!("{}:", spec.label);
            let mut prompt = Text::new(&label).with_help_message(numeric_help(spec.kind));
            if let Some(prior) = prior {
                prompt = prompt.with_default(prior);
            }
            prompt
                .prompt()
                .with_context(|| format!("Failed to read {}", spec.name))
        }
    }
}

fn numeric_help(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Integer => "Whole number; blank counts as 0",
        _ => "Amount, e.g. 29.85",
    }
}

/// Ask whether to run another prediction
pub fn confirm_again() -> Result<bool> {
    Confirm::new("Predict another customer?")
        .with_default(true)
        .prompt()
        .context("Failed to read confirmation")
}
