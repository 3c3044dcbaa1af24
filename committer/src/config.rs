use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use serde::Deserialize;
use services::{BatchConfirmerConfig, types::SubmissionRequest};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: App,
    pub request: Request,
    #[serde(default)]
    pub simulation: Simulation,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.app.count == 0 {
            return Err(Error::Configuration(
                "app.count must be greater than 0".to_string(),
            ));
        }

        if self.app.per_item_timeout_ms == 0 {
            return Err(Error::Configuration(
                "app.per_item_timeout_ms must be greater than 0".to_string(),
            ));
        }

        self.simulation
            .network_config()
            .validate()
            .map_err(|e| Error::Configuration(format!("simulation: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    /// How many operations to submit
    pub count: usize,
    /// How many handles are confirmed concurrently
    #[serde(default = "default_batch_size")]
    pub batch_size: NonZeroUsize,
    /// How long a single confirmation may take before it counts as failed
    #[serde(default = "default_per_item_timeout_ms")]
    pub per_item_timeout_ms: u64,
    /// Where to write the JSON run report, if anywhere
    pub report_path: Option<PathBuf>,
    /// Where to write the collected metrics, if anywhere
    pub metrics_path: Option<PathBuf>,
}

impl App {
    pub fn confirmer_config(&self) -> BatchConfirmerConfig {
        BatchConfirmerConfig {
            batch_size: self.batch_size,
            per_item_timeout: Duration::from_millis(self.per_item_timeout_ms),
        }
    }
}

fn default_batch_size() -> NonZeroUsize {
    BatchConfirmerConfig::default().batch_size
}

fn default_per_item_timeout_ms() -> u64 {
    3000
}

/// Template every submission is built from.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub destination: String,
    #[serde(default = "default_value")]
    pub value: u64,
    #[serde(default = "default_data")]
    pub data: String,
    pub chain_id: u64,
}

fn default_value() -> u64 {
    1
}

fn default_data() -> String {
    "0x".to_string()
}

impl From<&Request> for SubmissionRequest {
    fn from(request: &Request) -> Self {
        Self {
            destination: request.destination.clone(),
            value: u128::from(request.value),
            data: request.data.clone(),
            chain_id: request.chain_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub submit_failure_rate: f64,
    pub confirm_failure_rate: f64,
    #[serde(deserialize_with = "human_readable_duration")]
    pub min_confirm_latency: Duration,
    #[serde(deserialize_with = "human_readable_duration")]
    pub max_confirm_latency: Duration,
    pub seed: Option<u64>,
}

impl Default for Simulation {
    fn default() -> Self {
        let defaults = simulated::Config::default();
        Self {
            submit_failure_rate: defaults.submit_failure_rate,
            confirm_failure_rate: defaults.confirm_failure_rate,
            min_confirm_latency: defaults.min_confirm_latency,
            max_confirm_latency: defaults.max_confirm_latency,
            seed: defaults.seed,
        }
    }
}

impl Simulation {
    pub fn network_config(&self) -> simulated::Config {
        simulated::Config {
            submit_failure_rate: self.submit_failure_rate,
            confirm_failure_rate: self.confirm_failure_rate,
            min_confirm_latency: self.min_confirm_latency,
            max_confirm_latency: self.max_confirm_latency,
            seed: self.seed,
        }
    }
}

fn human_readable_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let duration_str: String = Deserialize::deserialize(deserializer)?;
    humantime::parse_duration(&duration_str).map_err(|e| {
        let msg = format!("Failed to parse duration '{duration_str}': {e};");
        serde::de::Error::custom(msg)
    })
}

#[derive(Parser)]
#[command(name = "stx-committer", version, about, propagate_version = true)]
struct Cli {
    #[arg(value_name = "FILE", help = "Path to the configuration file")]
    config_path: Option<PathBuf>,
}

pub fn parse() -> Result<Config> {
    let cli = Cli::parse();

    load(cli.config_path.as_deref(), environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("STX")
        .separator("__")
        .try_parsing(true)
}

fn load(config_path: Option<&Path>, env: config::Environment) -> Result<Config> {
    let mut builder = config::Config::builder();
    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path));
    }

    let config: Config = builder.add_source(env).build()?.try_deserialize()?;
    config.validate()?;

    Ok(config)
}
