#![deny(unused_crate_dependencies)]

use std::{num::NonZeroUsize, time::Duration};

use services::{
    BatchConfirmer, BatchConfirmerConfig, Submitter,
    types::{Handle, SubmissionRequest},
};

pub fn handles(amount: usize) -> Vec<Handle> {
    (0..amount).map(|i| Handle::new(format!("h{i}"))).collect()
}

pub fn given_request() -> SubmissionRequest {
    SubmissionRequest {
        destination: "0x0000000000000000000000000000000000000001".to_string(),
        value: 1,
        data: "0x".to_string(),
        chain_id: 84532,
    }
}

pub fn confirmer_config(batch_size: usize, per_item_timeout: Duration) -> BatchConfirmerConfig {
    BatchConfirmerConfig {
        batch_size: NonZeroUsize::new(batch_size).expect("batch size must be greater than 0"),
        per_item_timeout,
    }
}

pub mod mocks {
    pub mod submitter {
        use mockall::Sequence;
        use services::{
            Error,
            submitter::port::MockApi,
            types::Handle,
        };

        pub enum Attempt {
            Accepted(&'static str),
            Rejected(&'static str),
        }

        /// Answers submissions strictly in the given order.
        pub fn answers(attempts: impl IntoIterator<Item = Attempt>) -> MockApi {
            let mut sequence = Sequence::new();
            let mut api = MockApi::new();

            for attempt in attempts {
                let result = match attempt {
                    Attempt::Accepted(handle) => Ok(Handle::new(handle)),
                    Attempt::Rejected(msg) => Err(Error::Submission(msg.to_string())),
                };

                api.expect_submit()
                    .once()
                    .in_sequence(&mut sequence)
                    .return_once(move |_| Box::pin(async move { result }));
            }

            api
        }

        pub fn always_fails() -> MockApi {
            let mut api = MockApi::new();
            api.expect_submit().returning(|_| {
                Box::pin(async { Err(Error::Network("connection refused".to_string())) })
            });
            api
        }

        /// Accepts every submission, handing out `h0`, `h1`, ... in order.
        pub fn always_accepts() -> MockApi {
            let mut api = MockApi::new();
            let mut next = 0usize;
            api.expect_submit().returning(move |_| {
                let handle = Handle::new(format!("h{next}"));
                next += 1;
                Box::pin(async move { Ok(handle) })
            });
            api
        }
    }

    pub mod confirmer {
        use std::{future::Future, pin::Pin, time::Duration};

        use mockall::predicate::eq;
        use services::{
            Error,
            batch_confirmer::port::MockApi,
            types::{Handle, Receipt},
        };

        type Confirmation = Pin<Box<dyn Future<Output = services::Result<Receipt>> + Send>>;

        #[derive(Debug, Clone)]
        pub enum Behaviour {
            ConfirmsAfter(Duration),
            RejectsAfter(Duration),
            Panics,
        }

        pub fn receipt_for(handle: &Handle) -> Receipt {
            Receipt::new(serde_json::json!({ "hash": handle.as_str(), "status": "MINED_SUCCESS" }))
        }

        pub fn behaving(
            expectations: impl IntoIterator<Item = (Handle, Behaviour)>,
        ) -> MockApi {
            let mut api = MockApi::new();

            for (handle, behaviour) in expectations {
                let receipt = receipt_for(&handle);
                api.expect_confirm()
                    .with(eq(handle.clone()))
                    .once()
                    .return_once(move |_| {
                        let confirmation: Confirmation = match behaviour {
                            Behaviour::ConfirmsAfter(delay) => Box::pin(async move {
                                tokio::time::sleep(delay).await;
                                Ok(receipt)
                            }),
                            Behaviour::RejectsAfter(delay) => Box::pin(async move {
                                tokio::time::sleep(delay).await;
                                Err(Error::Confirmation(format!("{handle} not found")))
                            }),
                            Behaviour::Panics => Box::pin(async move {
                                panic!("confirmation of {handle} blew up")
                            }),
                        };
                        confirmation
                    });
            }

            api
        }

        /// Confirms any handle after `delay`.
        pub fn confirms_everything_after(delay: Duration) -> MockApi {
            let mut api = MockApi::new();
            api.expect_confirm().returning(move |handle| {
                let receipt = receipt_for(&handle);
                Box::pin(async move {
                    tokio::time::sleep(delay).await;
                    Ok(receipt)
                })
            });
            api
        }
    }

    pub mod network {
        use delegate::delegate;
        use services::types::{Handle, Receipt, SubmissionRequest};

        /// Both ports behind one value, the way a real remote endpoint would offer them.
        pub struct FullNetworkMock {
            pub submitter_api: services::submitter::port::MockApi,
            pub confirmer_api: services::batch_confirmer::port::MockApi,
        }

        impl Default for FullNetworkMock {
            fn default() -> Self {
                Self::new()
            }
        }

        impl FullNetworkMock {
            pub fn new() -> Self {
                Self {
                    submitter_api: services::submitter::port::MockApi::new(),
                    confirmer_api: services::batch_confirmer::port::MockApi::new(),
                }
            }
        }

        impl services::submitter::port::Api for FullNetworkMock {
            delegate! {
                to self.submitter_api {
                    async fn submit(&self, request: SubmissionRequest) -> services::Result<Handle>;
                }
            }
        }

        impl services::batch_confirmer::port::Api for FullNetworkMock {
            delegate! {
                to self.confirmer_api {
                    async fn confirm(&self, handle: Handle) -> services::Result<Receipt>;
                }
            }
        }
    }
}

/// Builds both services against the given ports, with the request from [`given_request`].
pub fn given_services<S, C>(
    submitter_api: S,
    confirmer_api: C,
    config: BatchConfirmerConfig,
) -> (Submitter<S>, BatchConfirmer<C>) {
    (
        Submitter::new(submitter_api, given_request()),
        BatchConfirmer::new(confirmer_api, config),
    )
}
