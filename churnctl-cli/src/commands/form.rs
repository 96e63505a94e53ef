//! `churnctl form` - interactive form with repeatable submissions

use anyhow::{bail, Result};
use churnctl_core::{
    EndpointConfig, FormController, FormFields, HttpTransport, PredictionTransport, ViewSink,
};
use clap::Parser;

use crate::ui::{OutputFormat, TerminalView};
use crate::wizard;

#[derive(Parser, Debug)]
pub struct FormArgs {
    /// Submit once and exit instead of offering another prediction
    #[arg(long)]
    pub once: bool,
}

/// Run the form until the user stops. Returns whether the last submission
/// showed a prediction.
pub async fn run_form(args: FormArgs, endpoint: &EndpointConfig) -> Result<bool> {
    if !wizard::can_use_wizard() {
        bail!(
            "`churnctl form` needs an interactive terminal; \
             use `churnctl predict -F NAME=VALUE` instead"
        );
    }

    let transport = HttpTransport::new(endpoint.base_url.clone(), endpoint.timeout())?;
    let view = TerminalView::new(OutputFormat::Text);
    let mut controller = FormController::with_sink(transport, view)
        .predict_path(endpoint.predict_path.clone());

    println!("\nCustomer churn prediction\n");
    submit_rounds(
        &mut controller,
        args.once,
        wizard::prompt_fields,
        wizard::confirm_again,
    )
    .await
}

/// Prompt, submit, and repeat while `again` says so
async fn submit_rounds<T, S>(
    controller: &mut FormController<T, S>,
    once: bool,
    mut prompt: impl FnMut(Option<&FormFields>) -> Result<FormFields>,
    mut again: impl FnMut() -> Result<bool>,
) -> Result<bool>
where
    T: PredictionTransport,
    S: ViewSink,
{
    let mut previous = None;
    loop {
        let fields = prompt(previous.as_ref())?;
        let screen = controller.on_submit(&fields).await;
        previous = Some(fields);

        if once || !again()? {
            return Ok(screen.result_visible());
        }
        println!();
    }
}
