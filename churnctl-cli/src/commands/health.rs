//! `churnctl health` - check that the prediction service is up

use anyhow::{Context, Result};
use churnctl_core::{EndpointConfig, HttpTransport};

pub async fn run_health(endpoint: &EndpointConfig) -> Result<()> {
    let transport = HttpTransport::new(endpoint.base_url.clone(), endpoint.timeout())?;
    let base_url = transport.base_url();
    let health = transport
        .health(&endpoint.health_path)
        .await
        .with_context(|| format!("Prediction service at {} is unreachable", base_url))?;

    println!("✓ {} ({})", base_url, health.status);
    Ok(())
}
