pub mod service {
    use metrics::{
        RegistersMetrics,
        prometheus::{IntCounter, Opts, core::Collector},
    };
    use tracing::{error, info};

    use crate::types::{SubmissionOutcome, SubmissionRequest};

    /// Submits operations one after another. A failed submission is recorded and
    /// never stops the ones after it.
    pub struct Submitter<Api> {
        api: Api,
        request: SubmissionRequest,
        metrics: Metrics,
    }

    impl<Api> Submitter<Api> {
        pub fn new(api: Api, request: SubmissionRequest) -> Self {
            Self {
                api,
                request,
                metrics: Metrics::default(),
            }
        }
    }

    impl<Api> Submitter<Api>
    where
        Api: super::port::Api,
    {
        /// Makes exactly `count` attempts. The returned outcomes are in attempt order.
        pub async fn submit_all(&self, count: usize) -> Vec<SubmissionOutcome> {
            let mut outcomes = Vec::with_capacity(count);

            for index in 0..count {
                let outcome = match self.api.submit(self.request.clone()).await {
                    Ok(handle) => {
                        info!("Submitted {} of {count}. Handle: {handle}", index + 1);
                        self.metrics.submitted_txs.inc();
                        SubmissionOutcome::submitted(index, handle)
                    }
                    Err(e) => {
                        error!("Submission {} of {count} failed: {e}", index + 1);
                        self.metrics.failed_submissions.inc();
                        SubmissionOutcome::failed(index, e.to_string())
                    }
                };

                outcomes.push(outcome);
            }

            outcomes
        }
    }

    #[derive(Clone)]
    struct Metrics {
        submitted_txs: IntCounter,
        failed_submissions: IntCounter,
    }

    impl<Api> RegistersMetrics for Submitter<Api> {
        fn metrics(&self) -> Vec<Box<dyn Collector>> {
            vec![
                Box::new(self.metrics.submitted_txs.clone()),
                Box::new(self.metrics.failed_submissions.clone()),
            ]
        }
    }

    impl Default for Metrics {
        fn default() -> Self {
            let submitted_txs = IntCounter::with_opts(Opts::new(
                "submitted_txs",
                "Number of operations the remote side accepted.",
            ))
            .expect("submitted_txs metric to be correctly configured");

            let failed_submissions = IntCounter::with_opts(Opts::new(
                "failed_submissions",
                "Number of submission attempts that failed.",
            ))
            .expect("failed_submissions metric to be correctly configured");

            Self {
                submitted_txs,
                failed_submissions,
            }
        }
    }
}

pub mod port {
    use crate::{
        Result,
        types::{Handle, SubmissionRequest},
    };

    #[allow(async_fn_in_trait)]
    #[trait_variant::make(Send)]
    #[cfg_attr(feature = "test-helpers", mockall::automock)]
    pub trait Api {
        async fn submit(&self, request: SubmissionRequest) -> Result<Handle>;
    }
}
