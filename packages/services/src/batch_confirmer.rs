use std::{num::NonZeroUsize, time::Duration};

pub mod service {
    use std::sync::Arc;

    use metrics::{
        RegistersMetrics,
        prometheus::{Histogram, HistogramOpts, IntCounter, Opts, core::Collector},
    };
    use tokio::{task::JoinSet, time::Instant};
    use tracing::{error, info};

    use super::Config;
    use crate::{
        Error, Result,
        types::{
            BatchReport, ConfirmationFailure, ConfirmationOutcome, Handle, Progress, batch_count,
            batches,
        },
    };

    /// Everything produced while confirming a list of handles.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ConfirmationRun {
        /// Batch order is kept, and so is the order inside each batch.
        pub outcomes: Vec<ConfirmationOutcome>,
        /// One entry per batch that aggregated cleanly.
        pub reports: Vec<BatchReport>,
        pub progress: Progress,
    }

    pub struct BatchConfirmer<Api> {
        api: Arc<Api>,
        config: Config,
        metrics: Metrics,
    }

    impl<Api> BatchConfirmer<Api> {
        pub fn new(api: Api, config: Config) -> Self {
            Self {
                api: Arc::new(api),
                config,
                metrics: Metrics::default(),
            }
        }
    }

    impl<Api> BatchConfirmer<Api>
    where
        Api: super::port::Api + Send + Sync + 'static,
    {
        pub async fn confirm_all(&self, handles: Vec<Handle>) -> ConfirmationRun {
            let num_batches = batch_count(handles.len(), self.config.batch_size);
            let mut progress = Progress::new(handles.len());
            let mut outcomes = Vec::with_capacity(handles.len());
            let mut reports = Vec::with_capacity(num_batches);

            for (index, batch) in batches(&handles, self.config.batch_size).enumerate() {
                info!(
                    "Awaiting batch results {} of {num_batches}: transactions {} to {}",
                    index + 1,
                    progress.processed + 1,
                    progress.processed + batch.len()
                );

                let start = Instant::now();
                let mut batch_outcomes = Vec::with_capacity(batch.len());
                let aggregated = self.confirm_batch(batch, &mut batch_outcomes).await;
                let elapsed = start.elapsed();

                match aggregated {
                    Ok(()) => {
                        let report = BatchReport::new(index, elapsed, &batch_outcomes);
                        info!(
                            "Batch {} completed in {:.3} seconds: {} succeeded, {} failed",
                            index + 1,
                            elapsed.as_secs_f64(),
                            report.succeeded,
                            report.failed
                        );
                        self.metrics.batch_duration.observe(elapsed.as_secs_f64());
                        reports.push(report);
                    }
                    Err(e) => {
                        error!("Batch {} failed: {e}. Continuing with next batch", index + 1);
                    }
                }

                self.record_metrics(&batch_outcomes);
                progress.record_batch(&batch_outcomes);
                outcomes.extend(batch_outcomes);

                info!(
                    "Total progress: {}/{} transactions",
                    progress.processed, progress.total
                );
            }

            ConfirmationRun {
                outcomes,
                reports,
                progress,
            }
        }

        /// Confirms every handle of `batch` concurrently, each racing its own timer.
        ///
        /// `outcomes` receives exactly one entry per batch position, in batch order,
        /// even when the batch as a whole fails to aggregate.
        async fn confirm_batch(
            &self,
            batch: &[Handle],
            outcomes: &mut Vec<ConfirmationOutcome>,
        ) -> Result<()> {
            let mut tasks = JoinSet::new();
            for (slot, handle) in batch.iter().enumerate() {
                let api = Arc::clone(&self.api);
                let handle = handle.clone();
                let timeout = self.config.per_item_timeout;
                tasks.spawn(async move {
                    (slot, confirm_or_time_out(api.as_ref(), handle, timeout).await)
                });
            }

            let mut settled: Vec<Option<ConfirmationOutcome>> = vec![None; batch.len()];
            let mut failure = None;
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((slot, outcome)) => settled[slot] = Some(outcome),
                    Err(e) => failure = Some(Error::from(e)),
                }
            }

            outcomes.extend(
                settled
                    .into_iter()
                    .zip(batch)
                    .map(|(outcome, handle)| outcome.unwrap_or_else(|| lost(handle))),
            );

            failure.map_or(Ok(()), Err)
        }

        fn record_metrics(&self, outcomes: &[ConfirmationOutcome]) {
            for outcome in outcomes {
                if outcome.is_success() {
                    self.metrics.confirmed_txs.inc();
                } else {
                    self.metrics.unconfirmed_txs.inc();
                }
            }
        }
    }

    async fn confirm_or_time_out<Api>(
        api: &Api,
        handle: Handle,
        timeout: std::time::Duration,
    ) -> ConfirmationOutcome
    where
        Api: super::port::Api,
    {
        tokio::select! {
            result = api.confirm(handle.clone()) => match result {
                Ok(receipt) => ConfirmationOutcome::succeeded(handle, receipt),
                Err(e) => {
                    ConfirmationOutcome::failed(handle, ConfirmationFailure::Rejected(e.to_string()))
                }
            },
            () = tokio::time::sleep(timeout) => {
                ConfirmationOutcome::failed(handle, ConfirmationFailure::TimedOut)
            }
        }
    }

    // A task that never reported back still owes its handle an outcome.
    fn lost(handle: &Handle) -> ConfirmationOutcome {
        ConfirmationOutcome::failed(
            handle.clone(),
            ConfirmationFailure::Lost("confirmation task did not complete".to_string()),
        )
    }

    #[derive(Clone)]
    struct Metrics {
        confirmed_txs: IntCounter,
        unconfirmed_txs: IntCounter,
        batch_duration: Histogram,
    }

    impl<Api> RegistersMetrics for BatchConfirmer<Api> {
        fn metrics(&self) -> Vec<Box<dyn Collector>> {
            vec![
                Box::new(self.metrics.confirmed_txs.clone()),
                Box::new(self.metrics.unconfirmed_txs.clone()),
                Box::new(self.metrics.batch_duration.clone()),
            ]
        }
    }

    impl Default for Metrics {
        fn default() -> Self {
            let confirmed_txs = IntCounter::with_opts(Opts::new(
                "confirmed_txs",
                "Number of operations confirmed within their timeout.",
            ))
            .expect("confirmed_txs metric to be correctly configured");

            let unconfirmed_txs = IntCounter::with_opts(Opts::new(
                "unconfirmed_txs",
                "Number of operations that failed or timed out while being confirmed.",
            ))
            .expect("unconfirmed_txs metric to be correctly configured");

            let batch_duration = Histogram::with_opts(
                HistogramOpts::new(
                    "confirmation_batch_duration_seconds",
                    "Time it took for every confirmation in a batch to settle.",
                )
                .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 10.0, 30.0]),
            )
            .expect("confirmation_batch_duration_seconds metric to be correctly configured");

            Self {
                confirmed_txs,
                unconfirmed_txs,
                batch_duration,
            }
        }
    }
}

pub mod port {
    use crate::{
        Result,
        types::{Handle, Receipt},
    };

    #[allow(async_fn_in_trait)]
    #[trait_variant::make(Send)]
    #[cfg_attr(feature = "test-helpers", mockall::automock)]
    pub trait Api {
        /// Resolves once the operation behind `handle` reached a terminal state.
        async fn confirm(&self, handle: Handle) -> Result<Receipt>;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub batch_size: NonZeroUsize,
    pub per_item_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(10).expect("10 is not zero"),
            per_item_timeout: Duration::from_millis(3000),
        }
    }
}
