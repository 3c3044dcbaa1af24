use std::path::Path;

use metrics::{RegistersMetrics, prometheus::Registry};
use services::{BatchConfirmer, RunReport, Submitter, types::SubmissionRequest};
use simulated::SimulatedNetwork;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    errors::{Error, Result, WithContext},
};

pub fn setup_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_level(true)
        .with_line_number(true)
        .json()
        .init();
}

pub fn create_network(config: &Config) -> Result<SimulatedNetwork> {
    let network = SimulatedNetwork::new(config.simulation.network_config())?;
    Ok(network)
}

pub fn create_services(
    config: &Config,
    network: SimulatedNetwork,
    registry: &Registry,
) -> (
    Submitter<SimulatedNetwork>,
    BatchConfirmer<SimulatedNetwork>,
) {
    let submitter = Submitter::new(network.clone(), SubmissionRequest::from(&config.request));
    submitter.register_metrics(registry);

    let confirmer = BatchConfirmer::new(network, config.app.confirmer_config());
    confirmer.register_metrics(registry);

    (submitter, confirmer)
}

pub fn log_summary(report: &RunReport) {
    info!("{}", "-".repeat(80));
    info!(
        "Submitted {} of {} operations",
        report.submitted(),
        report.submissions.len()
    );
    info!(
        "Confirmed {} of {}, {} failed or timed out",
        report.progress.succeeded, report.progress.total, report.progress.failed
    );
    info!("{}", "-".repeat(80));
}

pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .map_err(Error::from)
        .with_context(|| format!("writing run report to {}", path.display()))?;

    info!("Run report written to {}", path.display());
    Ok(())
}

pub fn write_metrics(path: &Path, registry: &Registry) -> Result<()> {
    let text = metrics::encode_text(registry)?;
    std::fs::write(path, text)
        .map_err(Error::from)
        .with_context(|| format!("writing metrics to {}", path.display()))?;

    info!("Metrics written to {}", path.display());
    Ok(())
}
