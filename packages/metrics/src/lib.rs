pub use prometheus::{self, core::Collector, Registry};

pub trait RegistersMetrics {
    fn register_metrics(&self, registry: &Registry) {
        self.metrics().into_iter().for_each(|metric| {
            registry
                .register(metric)
                .expect("app to have correctly named metrics");
        });
    }

    fn metrics(&self) -> Vec<Box<dyn Collector>>;
}

/// Renders every metric in `registry` using the Prometheus text exposition format.
pub fn encode_text(registry: &Registry) -> prometheus::Result<String> {
    use prometheus::Encoder;

    let mut buffer = vec![];
    prometheus::TextEncoder::new().encode(&registry.gather(), &mut buffer)?;

    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
