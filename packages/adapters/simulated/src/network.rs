use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use rand::{Rng, SeedableRng, rngs::StdRng};
use services::{
    Error, Result,
    types::{Handle, Receipt, SubmissionRequest},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Probability in `[0, 1]` that a submission is rejected.
    pub submit_failure_rate: f64,
    /// Probability in `[0, 1]` that an accepted operation fails to confirm.
    pub confirm_failure_rate: f64,
    pub min_confirm_latency: Duration,
    pub max_confirm_latency: Duration,
    /// Fixes the outcome of every random draw, for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            submit_failure_rate: 0.0,
            confirm_failure_rate: 0.0,
            min_confirm_latency: Duration::from_millis(100),
            max_confirm_latency: Duration::from_millis(1000),
            seed: None,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidConfig {
    #[error("{name} must be within [0, 1], got {value}")]
    Rate { name: &'static str, value: f64 },
    #[error("min_confirm_latency ({min:?}) exceeds max_confirm_latency ({max:?})")]
    Latency { min: Duration, max: Duration },
}

impl Config {
    pub fn validate(&self) -> std::result::Result<(), InvalidConfig> {
        for (name, value) in [
            ("submit_failure_rate", self.submit_failure_rate),
            ("confirm_failure_rate", self.confirm_failure_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(InvalidConfig::Rate { name, value });
            }
        }

        if self.min_confirm_latency > self.max_confirm_latency {
            return Err(InvalidConfig::Latency {
                min: self.min_confirm_latency,
                max: self.max_confirm_latency,
            });
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct SimulatedNetwork {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    rng: Mutex<StdRng>,
    submitted: Mutex<HashMap<Handle, SubmissionRequest>>,
}

impl SimulatedNetwork {
    pub fn new(config: Config) -> std::result::Result<Self, InvalidConfig> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                rng: Mutex::new(rng),
                submitted: Mutex::default(),
            }),
        })
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self
            .inner
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    fn lookup(&self, handle: &Handle) -> Option<SubmissionRequest> {
        self.inner
            .submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle)
            .cloned()
    }
}

impl services::submitter::port::Api for SimulatedNetwork {
    async fn submit(&self, request: SubmissionRequest) -> Result<Handle> {
        if request.chain_id == 0 {
            return Err(Error::Submission("chain id 0 is not supported".to_string()));
        }

        let (rejected, hash) = self.with_rng(|rng| {
            let rejected = rng.gen_bool(self.inner.config.submit_failure_rate);
            (rejected, rng.r#gen::<[u8; 32]>())
        });

        if rejected {
            return Err(Error::Network(
                "endpoint rejected the submission".to_string(),
            ));
        }

        let handle = Handle::new(format!("0x{}", hex::encode(hash)));
        debug!("accepted submission {handle} for chain {}", request.chain_id);

        self.inner
            .submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle.clone(), request);

        Ok(handle)
    }
}

impl services::batch_confirmer::port::Api for SimulatedNetwork {
    async fn confirm(&self, handle: Handle) -> Result<Receipt> {
        let Some(request) = self.lookup(&handle) else {
            return Err(Error::Confirmation(format!("unknown handle {handle}")));
        };

        let config = self.inner.config;
        let (latency, reverted) = self.with_rng(|rng| {
            (
                rng.gen_range(config.min_confirm_latency..=config.max_confirm_latency),
                rng.gen_bool(config.confirm_failure_rate),
            )
        });

        tokio::time::sleep(latency).await;

        if reverted {
            return Err(Error::Confirmation(format!("{handle} was reverted")));
        }

        Ok(Receipt::new(serde_json::json!({
            "hash": handle,
            "chainId": request.chain_id,
            "destination": request.destination,
            "status": "MINED_SUCCESS",
            "latencyMs": u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        })))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use services::{batch_confirmer::port::Api as _, submitter::port::Api as _};

    use super::*;

    fn given_request() -> SubmissionRequest {
        SubmissionRequest {
            destination: "0x0000000000000000000000000000000000000001".to_string(),
            value: 1,
            data: "0x".to_string(),
            chain_id: 84532,
        }
    }

    fn given_network(config: Config) -> SimulatedNetwork {
        SimulatedNetwork::new(Config {
            seed: Some(7),
            ..config
        })
        .unwrap()
    }

    #[tokio::test]
    async fn hands_out_distinct_handles() {
        // given
        let network = given_network(Config::default());

        // when
        let mut handles = HashSet::new();
        for _ in 0..20 {
            handles.insert(network.submit(given_request()).await.unwrap());
        }

        // then
        assert_eq!(handles.len(), 20);
    }

    #[tokio::test]
    async fn rejects_everything_at_full_failure_rate() {
        // given
        let network = given_network(Config {
            submit_failure_rate: 1.0,
            ..Config::default()
        });

        // when
        let result = network.submit(given_request()).await;

        // then
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn rejects_unsupported_chain() {
        let network = given_network(Config::default());
        let request = SubmissionRequest {
            chain_id: 0,
            ..given_request()
        };

        let result = network.submit(request).await;

        assert!(matches!(result, Err(Error::Submission(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn confirms_after_the_configured_latency() {
        // given
        let network = given_network(Config {
            min_confirm_latency: Duration::from_millis(400),
            max_confirm_latency: Duration::from_millis(400),
            ..Config::default()
        });
        let handle = network.submit(given_request()).await.unwrap();
        let start = tokio::time::Instant::now();

        // when
        let receipt = network.confirm(handle.clone()).await.unwrap();

        // then
        assert_eq!(start.elapsed(), Duration::from_millis(400));
        assert_eq!(receipt.payload()["hash"], handle.as_str());
        assert_eq!(receipt.payload()["chainId"], 84532);
    }

    #[tokio::test(start_paused = true)]
    async fn latency_keeps_sub_millisecond_precision() {
        // given
        let network = given_network(Config {
            min_confirm_latency: Duration::from_micros(2500),
            max_confirm_latency: Duration::from_micros(2500),
            ..Config::default()
        });
        let handle = network.submit(given_request()).await.unwrap();
        let start = tokio::time::Instant::now();

        // when
        let receipt = network.confirm(handle).await.unwrap();

        // then
        assert!(start.elapsed() >= Duration::from_micros(2500));
        assert_eq!(receipt.payload()["latencyMs"], 2);
    }

    #[tokio::test(start_paused = true)]
    async fn reverts_at_full_confirm_failure_rate() {
        let network = given_network(Config {
            confirm_failure_rate: 1.0,
            ..Config::default()
        });
        let handle = network.submit(given_request()).await.unwrap();

        let result = network.confirm(handle).await;

        assert!(matches!(result, Err(Error::Confirmation(_))));
    }

    #[tokio::test]
    async fn unknown_handle_cannot_be_confirmed() {
        let network = given_network(Config::default());

        let result = network.confirm(Handle::new("0xdeadbeef")).await;

        assert_eq!(
            result,
            Err(Error::Confirmation("unknown handle 0xdeadbeef".to_string()))
        );
    }

    #[test]
    fn invalid_configs_are_refused() {
        let bad_rate = Config {
            confirm_failure_rate: 1.5,
            ..Config::default()
        };
        let bad_latency = Config {
            min_confirm_latency: Duration::from_secs(2),
            max_confirm_latency: Duration::from_secs(1),
            ..Config::default()
        };

        assert_eq!(
            bad_rate.validate(),
            Err(InvalidConfig::Rate {
                name: "confirm_failure_rate",
                value: 1.5
            })
        );
        assert!(matches!(
            bad_latency.validate(),
            Err(InvalidConfig::Latency { .. })
        ));
        assert!(SimulatedNetwork::new(bad_rate).is_err());
    }
}
