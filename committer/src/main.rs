#![deny(unused_crate_dependencies)]
mod config;
mod errors;
mod setup;

use errors::{Error, Result};
use metrics::prometheus::Registry;
use setup::{
    create_network, create_services, log_summary, setup_logger, write_metrics, write_report,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger();

    if let Err(e) = run().await {
        error!("stx-committer failed: {e}");
        return Err(e);
    }

    info!("Done");
    Ok(())
}

async fn run() -> Result<()> {
    let config = config::parse()?;

    let metrics_registry = Registry::default();

    let network = create_network(&config)?;
    let (submitter, confirmer) = create_services(&config, network, &metrics_registry);

    let report = tokio::select! {
        report = services::submit_and_confirm(&submitter, &confirmer, config.app.count) => report,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning the run");
            return Err(Error::Other("interrupted".to_string()));
        }
    };

    log_summary(&report);

    if let Some(path) = &config.app.report_path {
        write_report(path, &report)?;
    }

    if let Some(path) = &config.app.metrics_path {
        write_metrics(path, &metrics_registry)?;
    }

    Ok(())
}
