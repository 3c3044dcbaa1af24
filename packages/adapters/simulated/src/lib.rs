//! An in-process stand-in for the remote submission endpoint.
//!
//! Submissions are accepted or rejected at random according to [`Config`], and
//! every accepted operation settles after a random latency. Useful for dry runs
//! and for exercising the batching logic without a live network.

mod network;

pub use network::{Config, InvalidConfig, SimulatedNetwork};
